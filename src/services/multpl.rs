// src/services/multpl.rs
use chrono::{Datelike, NaiveDate};
use log::{error, info};
use reqwest::Client;

use crate::error::SourceErrorKind;
use super::tables::{find_table, parse_number, HtmlTable};

pub const CAPE_SLUG: &str = "shiller-pe";
pub const PE_SLUG: &str = "s-p-500-pe-ratio";
pub const PS_SLUG: &str = "s-p-500-price-to-sales";

pub fn table_url(base_url: &str, slug: &str) -> String {
    format!("{}/{}/table/by-month", base_url.trim_end_matches('/'), slug)
}

/// Download the by-month table for a ratio slug.
pub async fn fetch_ratio_table(
    client: &Client,
    base_url: &str,
    slug: &str,
) -> Result<HtmlTable, SourceErrorKind> {
    let url = table_url(base_url, slug);
    info!("Fetching ratio table from URL: {}", url);

    let html = client
        .get(&url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;

    find_table(&html, "Date")
        .ok_or_else(|| SourceErrorKind::format(format!("no Date table on {}", url)))
}

/// Value column of the first data row (the most recent month).
pub fn latest_value(table: &HtmlTable) -> Result<f64, SourceErrorKind> {
    let idx = table.column("Value").unwrap_or(1);
    let row = table
        .rows
        .first()
        .ok_or_else(|| SourceErrorKind::format("ratio table has no data rows"))?;
    let cell = row
        .get(idx)
        .ok_or_else(|| SourceErrorKind::format("missing Value cell"))?;
    parse_number(cell).ok_or_else(|| {
        error!("Unparsable ratio cell: {}", cell);
        SourceErrorKind::format(format!("unparsable value {:?}", cell))
    })
}

/// Fetch the latest value for a slug.
pub async fn fetch_latest_ratio(
    client: &Client,
    base_url: &str,
    slug: &str,
) -> Result<f64, SourceErrorKind> {
    let table = fetch_ratio_table(client, base_url, slug).await?;
    let value = latest_value(&table)?;
    info!("Found {} latest value: {}", slug, value);
    Ok(value)
}

/// Month labels like "Oct 1, 2025", normalised to the first of the month.
pub fn parse_month(label: &str) -> Option<NaiveDate> {
    let label = label.trim();
    ["%b %d, %Y", "%B %d, %Y", "%Y-%m-%d"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(label, fmt).ok())
        .and_then(|d| d.with_day(1))
}

/// Every (month, value) row of the table. Rows with an unparsable date are
/// skipped; rows with an unparsable value keep `None` so the merge can drop
/// them.
pub fn monthly_series(table: &HtmlTable) -> Vec<(NaiveDate, Option<f64>)> {
    let date_idx = table.column("Date").unwrap_or(0);
    let value_idx = table.column("Value").unwrap_or(1);

    table
        .rows
        .iter()
        .filter_map(|row| {
            let date = parse_month(row.get(date_idx)?)?;
            let value = row.get(value_idx).and_then(|c| parse_number(c));
            Some((date, value))
        })
        .collect()
}
