// src/services/calculations.rs
use std::str::FromStr;

/// `(value - midpoint) / scale`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Standardization {
    pub midpoint: f64,
    pub scale: f64,
}

impl Standardization {
    pub const fn new(midpoint: f64, scale: f64) -> Self {
        Standardization { midpoint, scale }
    }

    pub fn apply(&self, value: f64) -> f64 {
        (value - self.midpoint) / self.scale
    }
}

/// Which ratio feeds the second term of the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecondaryRatio {
    PriceEarnings,
    TobinQ,
    PriceSales,
}

impl SecondaryRatio {
    pub fn default_standardization(&self) -> Standardization {
        match self {
            SecondaryRatio::PriceEarnings => Standardization::new(20.0, 5.0),
            SecondaryRatio::TobinQ => Standardization::new(1.5, 0.5),
            SecondaryRatio::PriceSales => Standardization::new(30.0, 5.0),
        }
    }
}

impl FromStr for SecondaryRatio {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pe" => Ok(SecondaryRatio::PriceEarnings),
            "tobinq" => Ok(SecondaryRatio::TobinQ),
            "ps" => Ok(SecondaryRatio::PriceSales),
            other => Err(format!("expected pe, tobinq or ps, got {}", other)),
        }
    }
}

/// Midpoints and scales of the six standardized terms.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreModel {
    pub secondary_ratio: SecondaryRatio,
    pub cape: Standardization,
    pub secondary: Standardization,
    pub price_ratio: Standardization,
    pub search_index: Standardization,
    pub gpu_lead_time: Standardization,
    pub insider_selling: Standardization,
}

impl ScoreModel {
    pub fn with_secondary(secondary_ratio: SecondaryRatio) -> Self {
        ScoreModel {
            secondary_ratio,
            secondary: secondary_ratio.default_standardization(),
            ..ScoreModel::default()
        }
    }
}

impl Default for ScoreModel {
    fn default() -> Self {
        ScoreModel {
            secondary_ratio: SecondaryRatio::PriceEarnings,
            cape: Standardization::new(30.0, 10.0),
            secondary: SecondaryRatio::PriceEarnings.default_standardization(),
            price_ratio: Standardization::new(30.0, 5.0),
            search_index: Standardization::new(50.0, 20.0),
            gpu_lead_time: Standardization::new(16.0, 4.0),
            insider_selling: Standardization::new(100.0, 50.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreInputs {
    pub cape: f64,
    pub secondary_ratio: f64,
    pub price_ratio: f64,
    pub search_index: f64,
    pub gpu_lead_time_weeks: f64,
    pub insider_selling_millions: f64,
}

fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Composite froth z-score, rounded to 2 decimals.
pub fn score(inputs: &ScoreInputs, model: &ScoreModel) -> f64 {
    let z = model.cape.apply(inputs.cape)
        + model.secondary.apply(inputs.secondary_ratio)
        + model.price_ratio.apply(inputs.price_ratio)
        + model.search_index.apply(inputs.search_index)
        + model.gpu_lead_time.apply(inputs.gpu_lead_time_weeks)
        + model.insider_selling.apply(inputs.insider_selling_millions);
    round_to_cents(z)
}
