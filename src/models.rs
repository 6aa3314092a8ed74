// src/models.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One month of the long-run valuation history.
///
/// Quarterly fields are forward-filled onto the monthly spine and stay `None`
/// only for months before the first quarterly observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRow {
    pub date: NaiveDate,
    pub cape: f64,
    #[serde(default)]
    pub tobinq: Option<f64>,
    #[serde(rename = "hhld", default)]
    pub household_equity_share: Option<f64>,
}

/// Today's row of the published froth series. Column names are what the
/// dashboard reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ObservationRecord")]
pub struct DailyObservation {
    pub date: NaiveDate,
    pub cape: f64,
    #[serde(rename = "pe")]
    pub price_earnings: f64,
    #[serde(rename = "ps")]
    pub price_sales: f64,
    #[serde(default)]
    pub tobinq: Option<f64>,
    #[serde(rename = "mag7")]
    pub mag7_weight: f64,
    #[serde(rename = "nvda_ps")]
    pub nvda_price_sales: f64,
    #[serde(rename = "hhld")]
    pub household_equity_share: f64,
    #[serde(rename = "gt_ai")]
    pub google_trends_index: f64,
    #[serde(rename = "gpu")]
    pub gpu_lead_time_weeks: f64,
    #[serde(rename = "insider")]
    pub insider_selling_millions: f64,
    #[serde(rename = "dc")]
    pub data_center_flag: f64,
    #[serde(rename = "z")]
    pub composite_z_score: f64,
    /// `|`-separated metrics that came from a placeholder or fallback constant.
    #[serde(default)]
    pub estimated: String,
}

/// A published row as stored on disk.
///
/// Series written before the `ps` column existed have no `ps` and keep the
/// price/sales ratio under `tobinq`; those rows are read with the ratio moved
/// back to `ps` and no Tobin's Q.
#[derive(Debug, Deserialize)]
struct ObservationRecord {
    date: NaiveDate,
    cape: f64,
    pe: f64,
    #[serde(default)]
    ps: Option<f64>,
    #[serde(default)]
    tobinq: Option<f64>,
    mag7: f64,
    nvda_ps: f64,
    hhld: f64,
    gt_ai: f64,
    gpu: f64,
    insider: f64,
    dc: f64,
    z: f64,
    #[serde(default)]
    estimated: String,
}

impl From<ObservationRecord> for DailyObservation {
    fn from(record: ObservationRecord) -> Self {
        let (price_sales, tobinq) = match record.ps {
            Some(ps) => (ps, record.tobinq),
            None => (record.tobinq.unwrap_or(record.nvda_ps), None),
        };
        DailyObservation {
            date: record.date,
            cape: record.cape,
            price_earnings: record.pe,
            price_sales,
            tobinq,
            mag7_weight: record.mag7,
            nvda_price_sales: record.nvda_ps,
            household_equity_share: record.hhld,
            google_trends_index: record.gt_ai,
            gpu_lead_time_weeks: record.gpu,
            insider_selling_millions: record.insider,
            data_center_flag: record.dc,
            composite_z_score: record.z,
            estimated: record.estimated,
        }
    }
}

impl DailyObservation {
    /// Every field as a key/value pair, in column order.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("date", self.date.to_string()),
            ("cape", self.cape.to_string()),
            ("pe", self.price_earnings.to_string()),
            ("ps", self.price_sales.to_string()),
            (
                "tobinq",
                self.tobinq.map(|v| v.to_string()).unwrap_or_default(),
            ),
            ("mag7", self.mag7_weight.to_string()),
            ("nvda_ps", self.nvda_price_sales.to_string()),
            ("hhld", self.household_equity_share.to_string()),
            ("gt_ai", self.google_trends_index.to_string()),
            ("gpu", self.gpu_lead_time_weeks.to_string()),
            ("insider", self.insider_selling_millions.to_string()),
            ("dc", self.data_center_flag.to_string()),
            ("z", self.composite_z_score.to_string()),
            ("estimated", self.estimated.clone()),
        ]
    }

    pub fn estimated_metrics(&self) -> Vec<&str> {
        self.estimated.split('|').filter(|s| !s.is_empty()).collect()
    }
}

/// Identity of each input metric, used for error provenance and tagging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Cape,
    PriceEarnings,
    PriceSales,
    TobinQ,
    Mag7Weight,
    NvdaPriceSales,
    HouseholdEquityShare,
    SearchInterest,
    GpuLeadTime,
    InsiderSelling,
    DataCenterFlag,
}

impl Metric {
    /// Column name in the published series.
    pub fn column(&self) -> &'static str {
        match self {
            Metric::Cape => "cape",
            Metric::PriceEarnings => "pe",
            Metric::PriceSales => "ps",
            Metric::TobinQ => "tobinq",
            Metric::Mag7Weight => "mag7",
            Metric::NvdaPriceSales => "nvda_ps",
            Metric::HouseholdEquityShare => "hhld",
            Metric::SearchInterest => "gt_ai",
            Metric::GpuLeadTime => "gpu",
            Metric::InsiderSelling => "insider",
            Metric::DataCenterFlag => "dc",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.column())
    }
}
