// src/services/fed.rs
use chrono::{Datelike, NaiveDate};
use csv::ReaderBuilder;
use log::{info, warn};
use regex::Regex;
use reqwest::Client;
use std::sync::OnceLock;

use crate::error::SourceErrorKind;
use super::tables::{find_table, parse_number};

pub fn quarter_start(year: i32, quarter: u32) -> Option<NaiveDate> {
    if !(1..=4).contains(&quarter) {
        return None;
    }
    NaiveDate::from_ymd_opt(year, (quarter - 1) * 3 + 1, 1)
}

/// Quarter labels ("2024:Q3", "2024Q3", "2024 Q3", "Q3 2024") or ISO dates,
/// normalised to the first day of the quarter.
pub fn parse_quarter(label: &str) -> Option<NaiveDate> {
    static YEAR_FIRST: OnceLock<Regex> = OnceLock::new();
    static QUARTER_FIRST: OnceLock<Regex> = OnceLock::new();
    let year_first = YEAR_FIRST
        .get_or_init(|| Regex::new(r"(\d{4})\s*[:\-]?\s*[Qq]([1-4])").expect("static quarter pattern"));
    let quarter_first = QUARTER_FIRST
        .get_or_init(|| Regex::new(r"[Qq]([1-4])\s*[:\-]?\s*(\d{4})").expect("static quarter pattern"));

    let label = label.trim();
    if let Some(caps) = year_first.captures(label) {
        return quarter_start(caps[1].parse().ok()?, caps[2].parse().ok()?);
    }
    if let Some(caps) = quarter_first.captures(label) {
        return quarter_start(caps[2].parse().ok()?, caps[1].parse().ok()?);
    }
    let date = NaiveDate::parse_from_str(label, "%Y-%m-%d").ok()?;
    quarter_start(date.year(), (date.month() - 1) / 3 + 1)
}

/// Period/Value rows of the first table mentioning Tobin's Q.
pub fn parse_tobin_q_page(html: &str) -> Result<Vec<(NaiveDate, f64)>, SourceErrorKind> {
    let table = find_table(html, "Tobin")
        .ok_or_else(|| SourceErrorKind::format("no table mentioning Tobin"))?;
    let period_idx = table
        .column("Period")
        .ok_or_else(|| SourceErrorKind::format("Tobin table has no Period column"))?;
    let value_idx = table
        .column("Value")
        .ok_or_else(|| SourceErrorKind::format("Tobin table has no Value column"))?;

    let mut series: Vec<(NaiveDate, f64)> = table
        .rows
        .iter()
        .filter_map(|row| {
            let date = parse_quarter(row.get(period_idx)?)?;
            let value = parse_number(row.get(value_idx)?)?;
            Some((date, value))
        })
        .collect();

    if series.is_empty() {
        return Err(SourceErrorKind::format("Tobin table has no parsable rows"));
    }
    series.sort_by_key(|(date, _)| *date);
    Ok(series)
}

/// The Z.1 B.101.e extract: a preamble, then a `Year,Q1,Q2,Q3,Q4` table that
/// is melted into one value per quarter. Blank and non-numeric cells are
/// skipped.
pub fn parse_household_csv(text: &str) -> Result<Vec<(NaiveDate, f64)>, SourceErrorKind> {
    let body: String = text
        .lines()
        .skip_while(|line| {
            !line
                .trim_start_matches('"')
                .trim_start()
                .to_ascii_lowercase()
                .starts_with("year")
        })
        .collect::<Vec<_>>()
        .join("\n");
    if body.is_empty() {
        return Err(SourceErrorKind::format("no Year header in household CSV"));
    }

    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(body.as_bytes());
    let headers = rdr.headers()?.clone();
    let column = |name: &str| headers.iter().position(|h| h.trim().eq_ignore_ascii_case(name));
    let year_idx = column("Year").ok_or_else(|| SourceErrorKind::format("no Year column"))?;
    let quarter_idx: Vec<(u32, usize)> = (1..=4)
        .filter_map(|q| column(&format!("Q{}", q)).map(|idx| (q, idx)))
        .collect();
    if quarter_idx.is_empty() {
        return Err(SourceErrorKind::format("no Q1..Q4 columns in household CSV"));
    }

    let mut series = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let year: i32 = match record.get(year_idx).and_then(|y| y.trim().parse().ok()) {
            Some(year) => year,
            None => continue,
        };
        for (quarter, idx) in &quarter_idx {
            let value = record.get(*idx).and_then(parse_number);
            if let (Some(date), Some(value)) = (quarter_start(year, *quarter), value) {
                series.push((date, value));
            }
        }
    }

    if series.is_empty() {
        return Err(SourceErrorKind::format("household CSV has no values"));
    }
    series.sort_by_key(|(date, _)| *date);
    Ok(series)
}

async fn fetch_text(client: &Client, url: &str) -> Result<String, SourceErrorKind> {
    Ok(client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?)
}

pub async fn fetch_tobin_q(client: &Client, url: &str) -> Result<Vec<(NaiveDate, f64)>, SourceErrorKind> {
    info!("Fetching Tobin's Q table from URL: {}", url);
    let html = fetch_text(client, url).await?;
    let series = parse_tobin_q_page(&html)?;
    info!("Found {} Tobin's Q quarters", series.len());
    Ok(series)
}

pub async fn fetch_household_equity(
    client: &Client,
    url: &str,
) -> Result<Vec<(NaiveDate, f64)>, SourceErrorKind> {
    info!("Fetching household equity CSV from URL: {}", url);
    let text = fetch_text(client, url).await?;
    let series = parse_household_csv(&text)?;
    if let Some((date, value)) = series.last() {
        info!("Latest household equity share: {} ({})", value, date);
    } else {
        warn!("Household equity CSV parsed but empty");
    }
    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn quarter_labels_map_to_quarter_start() {
        assert_eq!(parse_quarter("2024:Q3"), Some(ymd(2024, 7, 1)));
        assert_eq!(parse_quarter("2024Q1"), Some(ymd(2024, 1, 1)));
        assert_eq!(parse_quarter("2023 q4"), Some(ymd(2023, 10, 1)));
        assert_eq!(parse_quarter("Q2 2022"), Some(ymd(2022, 4, 1)));
        assert_eq!(parse_quarter("2021-11-30"), Some(ymd(2021, 10, 1)));
        assert_eq!(parse_quarter("2024:Q5"), None);
        assert_eq!(parse_quarter("latest"), None);
    }

    #[test]
    fn tobin_table_is_found_by_caption() {
        let html = r#"
            <table><tr><th>Series</th></tr><tr><td>Debt</td></tr></table>
            <table>
              <caption>Tobin's Q, nonfinancial corporate business</caption>
              <tr><th>Period</th><th>Value</th></tr>
              <tr><td>2024:Q2</td><td>1.82</td></tr>
              <tr><td>2024:Q1</td><td>1.75</td></tr>
              <tr><td>2023:Q4</td><td>ND</td></tr>
            </table>"#;
        let series = parse_tobin_q_page(html).unwrap();
        assert_eq!(series, vec![(ymd(2024, 1, 1), 1.75), (ymd(2024, 4, 1), 1.82)]);
    }

    #[test]
    fn tobin_page_without_table_is_an_error() {
        assert!(parse_tobin_q_page("<html><p>release delayed</p></html>").is_err());
    }

    #[test]
    fn household_csv_is_melted_by_quarter() {
        let text = "\
Z.1 Financial Accounts
B.101.e Balance Sheet of Households
Billions of dollars
Source: Federal Reserve
Equity share
Year,Q1,Q2,Q3,Q4
2023,0.28,0.29,0.30,0.31
2024,0.32,,ND,
";
        let series = parse_household_csv(text).unwrap();
        assert_eq!(series.len(), 5);
        assert_eq!(series[0], (ymd(2023, 1, 1), 0.28));
        assert_eq!(series[3], (ymd(2023, 10, 1), 0.31));
        assert_eq!(series[4], (ymd(2024, 1, 1), 0.32));
    }

    #[test]
    fn household_csv_without_header_is_an_error() {
        assert!(parse_household_csv("a,b\n1,2\n").is_err());
    }
}
