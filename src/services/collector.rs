// src/services/collector.rs
use chrono::NaiveDate;
use log::{info, warn};
use reqwest::Client;

use crate::config::Config;
use crate::error::{ProxySourceError, SourceErrorKind};
use crate::models::{DailyObservation, HistoryRow, Metric};
use super::calculations::{score, ScoreInputs, SecondaryRatio};
use super::insider;
use super::multpl;
use super::placeholders::{MetricProvider, Placeholders};
use super::trends;

/// Gathers today's inputs in a fixed order. Every live source except the
/// insider screener is fatal: the first failure aborts collection.
pub struct Collector<'a> {
    client: &'a Client,
    config: &'a Config,
    placeholders: Placeholders,
}

impl<'a> Collector<'a> {
    pub fn new(client: &'a Client, config: &'a Config) -> Self {
        Collector {
            client,
            config,
            placeholders: Placeholders::from_config(&config.placeholders),
        }
    }

    /// Swap in different providers, e.g. a live source for one of them.
    pub fn with_placeholders(mut self, placeholders: Placeholders) -> Self {
        self.placeholders = placeholders;
        self
    }

    async fn ratio(&self, metric: Metric, slug: &str) -> Result<f64, ProxySourceError> {
        multpl::fetch_latest_ratio(self.client, &self.config.sources.multpl_base, slug)
            .await
            .map_err(|e| ProxySourceError::new(metric, e))
    }

    async fn provided(
        &self,
        provider: &dyn MetricProvider,
        estimated: &mut Vec<Metric>,
    ) -> Result<f64, ProxySourceError> {
        let value = provider.current().await?;
        if provider.is_placeholder() {
            info!("{} = {} (placeholder)", provider.metric(), value);
            estimated.push(provider.metric());
        }
        Ok(value)
    }

    pub async fn collect_today(
        &self,
        today: NaiveDate,
        history: &[HistoryRow],
    ) -> Result<DailyObservation, ProxySourceError> {
        let mut estimated = Vec::new();

        let cape = self.ratio(Metric::Cape, multpl::CAPE_SLUG).await?;
        let price_earnings = self.ratio(Metric::PriceEarnings, multpl::PE_SLUG).await?;
        let price_sales = self.ratio(Metric::PriceSales, multpl::PS_SLUG).await?;
        // No live NVDA feed; the index price/sales ratio stands in.
        let nvda_price_sales = price_sales;
        estimated.push(Metric::NvdaPriceSales);

        let google_trends_index = trends::fetch_search_interest(
            self.client,
            &self.config.sources.trends_base,
            &self.config.trends.keywords,
            &self.config.trends.timeframe,
        )
        .await
        .map_err(|e| ProxySourceError::new(Metric::SearchInterest, e))?;

        let mag7_weight = self.provided(self.placeholders.mag7_weight.as_ref(), &mut estimated).await?;
        let gpu_lead_time_weeks = self
            .provided(self.placeholders.gpu_lead_time.as_ref(), &mut estimated)
            .await?;
        let data_center_flag = self.provided(self.placeholders.data_center.as_ref(), &mut estimated).await?;

        let latest = history.last();
        let tobinq = latest.and_then(|row| row.tobinq);
        let household_equity_share = match latest.and_then(|row| row.household_equity_share) {
            Some(share) => share,
            None => {
                warn!("History has no household equity share, using placeholder");
                self.provided(self.placeholders.household_equity.as_ref(), &mut estimated)
                    .await?
            }
        };

        let insider = insider::insider_selling_or_fallback(self.client, &self.config.insider).await;
        if insider.is_fallback() {
            estimated.push(Metric::InsiderSelling);
        }
        let insider_selling_millions = insider.millions();

        let model = &self.config.score_model;
        let secondary_ratio = match model.secondary_ratio {
            SecondaryRatio::PriceEarnings => price_earnings,
            SecondaryRatio::PriceSales => price_sales,
            SecondaryRatio::TobinQ => tobinq.ok_or_else(|| {
                ProxySourceError::new(
                    Metric::TobinQ,
                    SourceErrorKind::format("history has no Tobin's Q to score with"),
                )
            })?,
        };

        let inputs = ScoreInputs {
            cape,
            secondary_ratio,
            price_ratio: nvda_price_sales,
            search_index: google_trends_index,
            gpu_lead_time_weeks,
            insider_selling_millions,
        };
        let composite_z_score = score(&inputs, model);
        info!("Composite z-score for {}: {}", today, composite_z_score);

        Ok(DailyObservation {
            date: today,
            cape,
            price_earnings,
            price_sales,
            tobinq,
            mag7_weight,
            nvda_price_sales,
            household_equity_share,
            google_trends_index,
            gpu_lead_time_weeks,
            insider_selling_millions,
            data_center_flag,
            composite_z_score,
            estimated: estimated
                .iter()
                .map(|m| m.column())
                .collect::<Vec<_>>()
                .join("|"),
        })
    }
}
