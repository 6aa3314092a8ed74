// src/pipeline.rs
use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use log::info;

use crate::config::Config;
use crate::error::FrothError;
use crate::models::DailyObservation;
use crate::services::collector::Collector;
use crate::services::{history, http, publisher};

/// Calendar date in the market timezone.
pub fn market_today(tz: Tz) -> NaiveDate {
    Utc::now().with_timezone(&tz).date_naive()
}

/// One full run: history (cached), today's proxies and score, publish.
pub async fn run_once(config: &Config) -> Result<DailyObservation, FrothError> {
    run_for_date(config, market_today(config.market_timezone)).await
}

pub async fn run_for_date(config: &Config, today: NaiveDate) -> Result<DailyObservation, FrothError> {
    info!("Starting froth run for {}", today);
    let client = http::build_client(config)?;

    let history = history::ensure_history(&client, config, today).await?;
    let observation = Collector::new(&client, config)
        .collect_today(today, &history)
        .await?;

    let estimated = observation.estimated_metrics();
    if !estimated.is_empty() {
        info!("Estimated (non-live) metrics today: {}", estimated.join(", "));
    }

    publisher::publish(
        &client,
        &config.published_series_path,
        &config.webhook,
        &observation,
    )
    .await?;
    Ok(observation)
}
