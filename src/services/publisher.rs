// src/services/publisher.rs
use log::{error, info, warn};
use reqwest::Client;
use std::collections::BTreeMap;
use std::path::Path;

use crate::config::{WebhookConfig, WebhookPolicy};
use crate::error::PublishError;
use crate::models::DailyObservation;
use super::store;

/// Append `observation` and keep one row per date, the latest write winning.
/// The result is sorted by date.
pub fn append_observation(
    existing: Vec<DailyObservation>,
    observation: DailyObservation,
) -> Vec<DailyObservation> {
    let mut by_date: BTreeMap<_, DailyObservation> = BTreeMap::new();
    for row in existing.into_iter().chain(std::iter::once(observation)) {
        if let Some(replaced) = by_date.insert(row.date, row) {
            info!("Replacing earlier observation for {}", replaced.date);
        }
    }
    by_date.into_values().collect()
}

/// Merge today's row into the published series file.
pub fn publish_series(path: &Path, observation: DailyObservation) -> Result<Vec<DailyObservation>, PublishError> {
    let existing = store::read_observations(path)?;
    let before = existing.len();
    let series = append_observation(existing, observation);
    store::write_observations(path, &series)?;
    info!(
        "Published series {} now has {} rows (was {})",
        path.display(),
        series.len(),
        before
    );
    Ok(series)
}

/// GET the webhook with every observation field as a query parameter.
/// The response status is logged, not checked.
pub async fn notify_webhook(
    client: &Client,
    webhook: &WebhookConfig,
    observation: &DailyObservation,
) -> Result<(), PublishError> {
    let url = match &webhook.url {
        Some(url) => url,
        None => {
            info!("No WEBHOOK_URL configured, skipping notification");
            return Ok(());
        }
    };

    match client.get(url).query(&observation.query_pairs()).send().await {
        Ok(resp) => {
            if resp.status().is_success() {
                info!("Webhook accepted observation for {}", observation.date);
            } else {
                warn!("Webhook answered {} for {}", resp.status(), observation.date);
            }
            Ok(())
        }
        Err(e) => match webhook.policy {
            WebhookPolicy::Fail => Err(PublishError::Webhook(e)),
            WebhookPolicy::Log => {
                error!("Webhook delivery failed, continuing: {}", e);
                Ok(())
            }
        },
    }
}

/// Persist the series, then notify the webhook.
pub async fn publish(
    client: &Client,
    published_path: &Path,
    webhook: &WebhookConfig,
    observation: &DailyObservation,
) -> Result<(), PublishError> {
    publish_series(published_path, observation.clone())?;
    notify_webhook(client, webhook, observation).await
}
