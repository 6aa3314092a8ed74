// src/error.rs
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::models::Metric;

/// Remote inputs of the history load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistorySource {
    Cape,
    TobinQ,
    HouseholdEquity,
}

impl fmt::Display for HistorySource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            HistorySource::Cape => "monthly CAPE table",
            HistorySource::TobinQ => "Tobin's Q table",
            HistorySource::HouseholdEquity => "household equity CSV",
        };
        write!(f, "{}", name)
    }
}

/// What went wrong while talking to a single remote source.
#[derive(Debug, Error)]
pub enum SourceErrorKind {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("CSV parse failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON parse failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unexpected response: {0}")]
    Format(String),
}

impl SourceErrorKind {
    pub fn format(message: impl Into<String>) -> Self {
        SourceErrorKind::Format(message.into())
    }
}

#[derive(Debug, Error)]
#[error("{origin} failed: {kind}")]
pub struct HistorySourceError {
    pub origin: HistorySource,
    #[source]
    pub kind: SourceErrorKind,
}

impl HistorySourceError {
    pub fn new(origin: HistorySource, kind: impl Into<SourceErrorKind>) -> Self {
        HistorySourceError {
            origin,
            kind: kind.into(),
        }
    }
}

#[derive(Debug, Error)]
#[error("{metric} source failed: {kind}")]
pub struct ProxySourceError {
    pub metric: Metric,
    #[source]
    pub kind: SourceErrorKind,
}

impl ProxySourceError {
    pub fn new(metric: Metric, kind: impl Into<SourceErrorKind>) -> Self {
        ProxySourceError {
            metric,
            kind: kind.into(),
        }
    }
}

/// Reading or writing one of the two CSV artefacts.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV on {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("published series: {0}")]
    Store(#[from] StoreError),
    #[error("webhook delivery failed: {0}")]
    Webhook(#[source] reqwest::Error),
}

#[derive(Debug, Error)]
#[error("invalid value {value:?} for {key}: {reason}")]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
    pub reason: String,
}

impl ConfigError {
    pub fn invalid(key: &'static str, value: &str, reason: impl fmt::Display) -> Self {
        ConfigError {
            key,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Everything that can abort a run, tagged by the step it happened in.
#[derive(Debug, Error)]
pub enum FrothError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("HTTP client setup: {0}")]
    Client(#[from] reqwest::Error),
    #[error("history load: {0}")]
    History(#[from] HistorySourceError),
    #[error("history cache: {0}")]
    Cache(#[from] StoreError),
    #[error("daily collection: {0}")]
    Proxy(#[from] ProxySourceError),
    #[error("publish: {0}")]
    Publish(#[from] PublishError),
}
