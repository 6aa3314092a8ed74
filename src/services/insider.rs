// src/services/insider.rs
use csv::ReaderBuilder;
use log::{info, warn};
use reqwest::Client;

use crate::config::InsiderConfig;
use crate::error::SourceErrorKind;
use super::tables::{find_table, parse_number};

/// Where the insider-selling number came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InsiderSelling {
    Screener(f64),
    Fallback(f64),
}

impl InsiderSelling {
    pub fn millions(&self) -> f64 {
        match self {
            InsiderSelling::Screener(v) | InsiderSelling::Fallback(v) => *v,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, InsiderSelling::Fallback(_))
    }
}

fn to_millions(values: impl Iterator<Item = f64>) -> Result<f64, SourceErrorKind> {
    let mut total = 0.0;
    let mut count = 0usize;
    for value in values {
        total += value.abs();
        count += 1;
    }
    if count == 0 {
        return Err(SourceErrorKind::format("screener returned no transaction values"));
    }
    Ok(total / 1_000_000.0)
}

/// Sum of the absolute transaction values in a screener export, in millions.
/// Accepts a CSV export or the screener's HTML results table.
pub fn sum_transaction_values(body: &str, column: &str) -> Result<f64, SourceErrorKind> {
    if body.contains("<table") {
        let table = find_table(body, column)
            .ok_or_else(|| SourceErrorKind::format(format!("no table with a {} column", column)))?;
        let idx = table
            .column(column)
            .ok_or_else(|| SourceErrorKind::format(format!("no {} column", column)))?;
        return to_millions(
            table
                .rows
                .iter()
                .filter_map(|row| row.get(idx).and_then(|cell| parse_number(cell))),
        );
    }

    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(body.as_bytes());
    let headers = rdr.headers()?.clone();
    let idx = headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(column))
        .ok_or_else(|| SourceErrorKind::format(format!("no {} column", column)))?;

    let mut values = Vec::new();
    for record in rdr.records() {
        let record = record?;
        if let Some(value) = record.get(idx).and_then(parse_number) {
            values.push(value);
        }
    }
    to_millions(values.into_iter())
}

pub async fn fetch_insider_selling(client: &Client, config: &InsiderConfig) -> Result<f64, SourceErrorKind> {
    info!("Fetching insider screener from URL: {}", config.screener_url);

    let mut request = client.get(&config.screener_url);
    if let Some(key) = &config.api_key {
        request = request.query(&[("apikey", key.as_str())]);
    }
    let body = request.send().await?.error_for_status()?.text().await?;

    let millions = sum_transaction_values(&body, &config.value_column)?;
    info!("Insider selling over the screener window: {:.1}M", millions);
    Ok(millions)
}

/// Never fails: any error substitutes the configured fallback.
pub async fn insider_selling_or_fallback(client: &Client, config: &InsiderConfig) -> InsiderSelling {
    match fetch_insider_selling(client, config).await {
        Ok(millions) => InsiderSelling::Screener(millions),
        Err(e) => {
            warn!(
                "Insider screener failed ({}), using fallback {}M",
                e, config.fallback_millions
            );
            InsiderSelling::Fallback(config.fallback_millions)
        }
    }
}
