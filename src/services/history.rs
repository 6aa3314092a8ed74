// src/services/history.rs
use chrono::{Datelike, NaiveDate};
use log::{info, warn};
use reqwest::Client;
use std::collections::{BTreeMap, HashMap};

use crate::config::Config;
use crate::error::{FrothError, HistorySource, HistorySourceError, SourceErrorKind};
use crate::models::HistoryRow;
use super::{fed, multpl, store};

/// Left merge onto the monthly spine with forward fill.
///
/// Quarterly values join by exact date and carry forward until the next
/// quarterly value. Months before the first quarterly observation stay
/// `None`. Months without a CAPE value are dropped after the fill, so they
/// still pass quarterly values on to later months.
pub fn merge_history(
    monthly: &[(NaiveDate, Option<f64>)],
    tobin_q: &[(NaiveDate, f64)],
    household_equity: &[(NaiveDate, f64)],
) -> Vec<HistoryRow> {
    // Later duplicates of a month win, unless they are blank.
    let mut spine: BTreeMap<NaiveDate, Option<f64>> = BTreeMap::new();
    for (date, cape) in monthly {
        let slot = spine.entry(*date).or_insert(None);
        if cape.is_some() {
            *slot = *cape;
        }
    }

    let tobin_by_date: HashMap<NaiveDate, f64> = tobin_q.iter().copied().collect();
    let household_by_date: HashMap<NaiveDate, f64> = household_equity.iter().copied().collect();

    let mut last_tobin = None;
    let mut last_household = None;
    let mut rows = Vec::with_capacity(spine.len());
    for (date, cape) in spine {
        if let Some(v) = tobin_by_date.get(&date) {
            last_tobin = Some(*v);
        }
        if let Some(v) = household_by_date.get(&date) {
            last_household = Some(*v);
        }
        if let Some(cape) = cape {
            rows.push(HistoryRow {
                date,
                cape,
                tobinq: last_tobin,
                household_equity_share: last_household,
            });
        }
    }
    rows
}

/// True when the latest cached month is the current month or later.
pub fn covers(rows: &[HistoryRow], today: NaiveDate) -> bool {
    rows.last()
        .map(|last| (last.date.year(), last.date.month()) >= (today.year(), today.month()))
        .unwrap_or(false)
}

/// Download all three sources and merge them. Any failure aborts the load.
pub async fn load_history(client: &Client, config: &Config) -> Result<Vec<HistoryRow>, HistorySourceError> {
    let cape_table = multpl::fetch_ratio_table(client, &config.sources.multpl_base, multpl::CAPE_SLUG)
        .await
        .map_err(|e| HistorySourceError::new(HistorySource::Cape, e))?;
    let monthly = multpl::monthly_series(&cape_table);
    if monthly.is_empty() {
        return Err(HistorySourceError::new(
            HistorySource::Cape,
            SourceErrorKind::format("CAPE table has no dated rows"),
        ));
    }

    let tobin_q = fed::fetch_tobin_q(client, &config.sources.fed_tobin_q)
        .await
        .map_err(|e| HistorySourceError::new(HistorySource::TobinQ, e))?;
    let household = fed::fetch_household_equity(client, &config.sources.fed_household_csv)
        .await
        .map_err(|e| HistorySourceError::new(HistorySource::HouseholdEquity, e))?;

    let rows = merge_history(&monthly, &tobin_q, &household);
    if rows.is_empty() {
        return Err(HistorySourceError::new(
            HistorySource::Cape,
            SourceErrorKind::format("no month carries a CAPE value"),
        ));
    }
    info!(
        "Merged history: {} months from {} to {}",
        rows.len(),
        rows[0].date,
        rows[rows.len() - 1].date
    );
    Ok(rows)
}

/// Load from the sources and replace the cache.
pub async fn refresh_history(client: &Client, config: &Config) -> Result<Vec<HistoryRow>, FrothError> {
    let rows = load_history(client, config).await?;
    store::write_history(&config.history_cache_path, &rows)?;
    Ok(rows)
}

/// Cached history when it still covers `today`, otherwise a fresh load.
pub async fn ensure_history(
    client: &Client,
    config: &Config,
    today: NaiveDate,
) -> Result<Vec<HistoryRow>, FrothError> {
    match store::read_history(&config.history_cache_path)? {
        Some(rows) if covers(&rows, today) => {
            info!(
                "History cache {} covers {}, reusing it",
                config.history_cache_path.display(),
                today
            );
            Ok(rows)
        }
        Some(_) => {
            info!("History cache is behind {}, reloading", today);
            refresh_history(client, config).await
        }
        None => {
            warn!(
                "No history cache at {}, building it",
                config.history_cache_path.display()
            );
            refresh_history(client, config).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn months(year: i32, values: &[Option<f64>]) -> Vec<(NaiveDate, Option<f64>)> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| (ymd(year, i as u32 + 1, 1), *v))
            .collect()
    }

    #[test]
    fn forward_fill_starts_at_first_quarterly_observation() {
        let monthly = months(2024, &[Some(30.0); 8]);
        let tobin = vec![(ymd(2024, 4, 1), 1.8), (ymd(2024, 7, 1), 1.9)];
        let rows = merge_history(&monthly, &tobin, &[]);

        let tobin_by_month: Vec<Option<f64>> = rows.iter().map(|r| r.tobinq).collect();
        assert_eq!(
            tobin_by_month,
            vec![None, None, None, Some(1.8), Some(1.8), Some(1.8), Some(1.9), Some(1.9)]
        );
        assert!(rows.iter().all(|r| r.household_equity_share.is_none()));
    }

    #[test]
    fn fill_never_precedes_first_observation_for_any_series() {
        let monthly = months(2023, &[Some(28.0); 12]);
        for start in 1..=12u32 {
            let household = vec![(ymd(2023, start, 1), 0.3)];
            let rows = merge_history(&monthly, &[], &household);
            for row in rows {
                assert_eq!(row.household_equity_share.is_some(), row.date >= ymd(2023, start, 1));
            }
        }
    }

    #[test]
    fn rows_without_cape_are_dropped_but_still_carry_the_fill() {
        let monthly = months(2024, &[Some(30.0), None, Some(31.0)]);
        let tobin = vec![(ymd(2024, 2, 1), 1.7)];
        let rows = merge_history(&monthly, &tobin, &[]);

        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.date != ymd(2024, 2, 1)));
        assert_eq!(rows[1].tobinq, Some(1.7));
    }

    #[test]
    fn output_is_sorted_and_unique() {
        let monthly = vec![
            (ymd(2024, 3, 1), Some(33.0)),
            (ymd(2024, 1, 1), Some(31.0)),
            (ymd(2024, 3, 1), Some(33.5)),
            (ymd(2024, 2, 1), Some(32.0)),
        ];
        let rows = merge_history(&monthly, &[], &[]);
        let dates: Vec<NaiveDate> = rows.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![ymd(2024, 1, 1), ymd(2024, 2, 1), ymd(2024, 3, 1)]);
        assert_eq!(rows[2].cape, 33.5);
    }

    #[test]
    fn quarterly_dates_off_the_spine_are_ignored() {
        let monthly = months(2024, &[Some(30.0), Some(30.5)]);
        let tobin = vec![(ymd(2023, 10, 1), 1.6)];
        let rows = merge_history(&monthly, &tobin, &[]);
        assert!(rows.iter().all(|r| r.tobinq.is_none()));
    }

    #[test]
    fn coverage_is_by_month() {
        let rows = merge_history(&months(2025, &[Some(30.0); 10]), &[], &[]);
        assert!(covers(&rows, ymd(2025, 10, 18)));
        assert!(covers(&rows, ymd(2025, 9, 30)));
        assert!(!covers(&rows, ymd(2025, 11, 1)));
        assert!(!covers(&[], ymd(2025, 1, 1)));
    }
}
