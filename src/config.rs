// src/config.rs
use chrono_tz::Tz;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;
use crate::services::calculations::{ScoreModel, SecondaryRatio, Standardization};

/// What a failed webhook delivery does to the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookPolicy {
    Fail,
    Log,
}

impl FromStr for WebhookPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail" => Ok(WebhookPolicy::Fail),
            "log" => Ok(WebhookPolicy::Log),
            other => Err(format!("expected fail or log, got {}", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WebhookConfig {
    pub url: Option<String>,
    pub policy: WebhookPolicy,
}

#[derive(Debug, Clone)]
pub struct SourceUrls {
    pub multpl_base: String,
    pub fed_tobin_q: String,
    pub fed_household_csv: String,
    pub trends_base: String,
}

#[derive(Debug, Clone)]
pub struct TrendsConfig {
    pub keywords: Vec<String>,
    pub timeframe: String,
}

#[derive(Debug, Clone)]
pub struct InsiderConfig {
    pub screener_url: String,
    pub value_column: String,
    pub api_key: Option<String>,
    pub fallback_millions: f64,
}

/// Constants standing in for metrics that have no live source yet.
#[derive(Debug, Clone)]
pub struct PlaceholderConfig {
    pub mag7_weight: f64,
    pub gpu_lead_time_weeks: f64,
    pub data_center_flag: f64,
    pub household_equity_share: f64,
}

/// Loaded once per run and handed to every component.
#[derive(Debug, Clone)]
pub struct Config {
    pub history_cache_path: PathBuf,
    pub published_series_path: PathBuf,
    pub http_timeout: Duration,
    pub market_timezone: Tz,
    pub sources: SourceUrls,
    pub trends: TrendsConfig,
    pub insider: InsiderConfig,
    pub placeholders: PlaceholderConfig,
    pub score_model: ScoreModel,
    pub webhook: WebhookConfig,
}

const DEFAULT_INSIDER_SCREENER: &str =
    "http://openinsider.com/screener?xs=1&fd=7&cnt=1000";

impl Config {
    /// Read configuration from the process environment (after `.env`).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |key: &str, default: &str| -> String {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let secondary_ratio: SecondaryRatio = parsed(&lookup, "SECONDARY_RATIO", SecondaryRatio::PriceEarnings)?;
        let secondary_default = secondary_ratio.default_standardization();
        let secondary = Standardization::new(
            parsed(&lookup, "SECONDARY_MIDPOINT", secondary_default.midpoint)?,
            parsed(&lookup, "SECONDARY_SCALE", secondary_default.scale)?,
        );
        if secondary.scale == 0.0 {
            return Err(ConfigError::invalid("SECONDARY_SCALE", "0", "scale must be non-zero"));
        }

        let keywords: Vec<String> = text("TRENDS_KEYWORDS", "AI stock,NVDA stock,ChatGPT stock")
            .split(',')
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();
        if keywords.is_empty() {
            return Err(ConfigError::invalid("TRENDS_KEYWORDS", "", "at least one keyword is required"));
        }

        Ok(Config {
            history_cache_path: PathBuf::from(text("HISTORY_CACHE_PATH", "fed_history.csv")),
            published_series_path: PathBuf::from(text("PUBLISHED_SERIES_PATH", "docs/data.csv")),
            http_timeout: Duration::from_secs(parsed(&lookup, "HTTP_TIMEOUT_SECS", 30u64)?),
            market_timezone: parsed(&lookup, "MARKET_TIMEZONE", chrono_tz::America::Chicago)?,
            sources: SourceUrls {
                multpl_base: text("MULTPL_BASE_URL", "https://www.multpl.com"),
                fed_tobin_q: text(
                    "FED_TOBIN_Q_URL",
                    "https://www.federalreserve.gov/releases/z1/current/",
                ),
                fed_household_csv: text(
                    "FED_HOUSEHOLD_CSV_URL",
                    "https://www.federalreserve.gov/releases/z1/current/csv/b101e.csv",
                ),
                trends_base: text("TRENDS_BASE_URL", "https://trends.google.com"),
            },
            trends: TrendsConfig {
                keywords,
                timeframe: text("TRENDS_TIMEFRAME", "today 3-m"),
            },
            insider: InsiderConfig {
                screener_url: text("INSIDER_SCREENER_URL", DEFAULT_INSIDER_SCREENER),
                value_column: text("INSIDER_VALUE_COLUMN", "Value"),
                api_key: optional("SCREENER_API_KEY"),
                fallback_millions: parsed(&lookup, "INSIDER_FALLBACK_MILLIONS", 150.0)?,
            },
            placeholders: PlaceholderConfig {
                mag7_weight: parsed(&lookup, "PLACEHOLDER_MAG7_WEIGHT", 0.36)?,
                gpu_lead_time_weeks: parsed(&lookup, "PLACEHOLDER_GPU_LEAD_WEEKS", 20.0)?,
                data_center_flag: parsed(&lookup, "PLACEHOLDER_DATA_CENTER_FLAG", 0.0)?,
                household_equity_share: parsed(&lookup, "PLACEHOLDER_HOUSEHOLD_EQUITY", 0.31)?,
            },
            score_model: ScoreModel {
                secondary_ratio,
                secondary,
                ..ScoreModel::default()
            },
            webhook: WebhookConfig {
                url: optional("WEBHOOK_URL"),
                policy: parsed(&lookup, "WEBHOOK_FAILURE_POLICY", WebhookPolicy::Fail)?,
            },
        })
    }
}

fn parsed<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key).filter(|v| !v.trim().is_empty()) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| ConfigError::invalid(key, &raw, e)),
        None => Ok(default),
    }
}
