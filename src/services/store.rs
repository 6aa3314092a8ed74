// src/services/store.rs
//! Flat-file persistence for the history cache and the published series.
//! Writes go to a sibling `.tmp` file and are renamed into place, so a failed
//! run never leaves a half-written file behind.

use log::{debug, info};
use serde::{de::DeserializeOwned, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::StoreError;
use crate::models::{DailyObservation, HistoryRow};

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn csv_error(path: &Path, source: csv::Error) -> StoreError {
    StoreError::Csv {
        path: path.to_path_buf(),
        source,
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// All rows of a headed CSV file, or `None` when the file does not exist.
pub fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Option<Vec<T>>, StoreError> {
    if !path.exists() {
        debug!("{} does not exist yet", path.display());
        return Ok(None);
    }

    let mut rdr = csv::Reader::from_path(path).map_err(|e| csv_error(path, e))?;
    let rows = rdr
        .deserialize()
        .collect::<Result<Vec<T>, _>>()
        .map_err(|e| csv_error(path, e))?;
    Ok(Some(rows))
}

/// Replace `path` with `rows`, header included.
pub fn write_rows<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
    }

    let tmp = tmp_path(path);
    let written = (|| -> Result<(), StoreError> {
        let mut wtr = csv::Writer::from_path(&tmp).map_err(|e| csv_error(&tmp, e))?;
        for row in rows {
            wtr.serialize(row).map_err(|e| csv_error(&tmp, e))?;
        }
        wtr.flush().map_err(|e| io_error(&tmp, e))
    })();

    if let Err(e) = written {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }

    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        io_error(path, e)
    })?;
    info!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

pub fn read_history(path: &Path) -> Result<Option<Vec<HistoryRow>>, StoreError> {
    read_rows(path)
}

pub fn write_history(path: &Path, rows: &[HistoryRow]) -> Result<(), StoreError> {
    write_rows(path, rows)
}

pub fn read_observations(path: &Path) -> Result<Vec<DailyObservation>, StoreError> {
    Ok(read_rows(path)?.unwrap_or_default())
}

pub fn write_observations(path: &Path, rows: &[DailyObservation]) -> Result<(), StoreError> {
    write_rows(path, rows)
}
