// src/services/placeholders.rs
use async_trait::async_trait;

use crate::config::PlaceholderConfig;
use crate::error::ProxySourceError;
use crate::models::Metric;

/// Source of a single metric. Metrics without a live feed are served by a
/// `ConstantProvider`; a live implementation can replace one without the
/// collector or scorer changing.
#[async_trait]
pub trait MetricProvider: Send + Sync {
    fn metric(&self) -> Metric;

    /// True when the value is a stand-in rather than a measurement.
    fn is_placeholder(&self) -> bool;

    async fn current(&self) -> Result<f64, ProxySourceError>;
}

#[derive(Debug, Clone)]
pub struct ConstantProvider {
    metric: Metric,
    value: f64,
}

impl ConstantProvider {
    pub fn new(metric: Metric, value: f64) -> Self {
        ConstantProvider { metric, value }
    }
}

#[async_trait]
impl MetricProvider for ConstantProvider {
    fn metric(&self) -> Metric {
        self.metric
    }

    fn is_placeholder(&self) -> bool {
        true
    }

    async fn current(&self) -> Result<f64, ProxySourceError> {
        Ok(self.value)
    }
}

/// Providers for the metrics that have no live source yet.
pub struct Placeholders {
    pub mag7_weight: Box<dyn MetricProvider>,
    pub gpu_lead_time: Box<dyn MetricProvider>,
    pub data_center: Box<dyn MetricProvider>,
    /// Used only when the history carries no household equity share.
    pub household_equity: Box<dyn MetricProvider>,
}

impl Placeholders {
    pub fn from_config(config: &PlaceholderConfig) -> Self {
        Placeholders {
            mag7_weight: Box::new(ConstantProvider::new(Metric::Mag7Weight, config.mag7_weight)),
            gpu_lead_time: Box::new(ConstantProvider::new(
                Metric::GpuLeadTime,
                config.gpu_lead_time_weeks,
            )),
            data_center: Box::new(ConstantProvider::new(
                Metric::DataCenterFlag,
                config.data_center_flag,
            )),
            household_equity: Box::new(ConstantProvider::new(
                Metric::HouseholdEquityShare,
                config.household_equity_share,
            )),
        }
    }
}
