//! Loads per-instrument daily close-price series from persisted CSV files.
//!
//! Input files follow the collection naming convention
//! `{asset}_{symbol}_from_{start}_to_{end}.csv` and carry at least a `Date`
//! and a `Close` column. Date cells are normalized to calendar dates before
//! any comparison, since files from different providers disagree on
//! formatting.

use crate::error::PipelineError;
use crate::types::{AssetClass, DateRange, InstrumentSeries, PricePoint};
use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A persisted instrument discovered by scanning the data directory.
#[derive(Debug, Clone)]
pub struct StoredInstrument {
    pub symbol: String,
    pub path: PathBuf,
}

/// Read-only access to the persisted price files of one data directory.
#[derive(Debug, Clone)]
pub struct SeriesStore {
    data_dir: PathBuf,
}

impl SeriesStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// List the persisted instruments of one asset class, sorted by filename
    /// so downstream iteration order is reproducible.
    pub fn list(&self, asset: AssetClass) -> Result<Vec<StoredInstrument>, PipelineError> {
        let mut found = Vec::new();
        if !self.data_dir.exists() {
            return Ok(found);
        }

        for entry in std::fs::read_dir(&self.data_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("csv") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let mut segments = stem.split('_');
            let (Some(prefix), Some(symbol)) = (segments.next(), segments.next()) else {
                continue;
            };
            if prefix != asset.prefix() || symbol.is_empty() {
                continue;
            }
            found.push(StoredInstrument {
                symbol: symbol.to_string(),
                path,
            });
        }

        found.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(found)
    }

    /// Load one instrument's close-price series restricted to `range`.
    ///
    /// Fails with `NotFound` when no persisted file matches, and with
    /// `EmptySeries` when the date filter leaves zero rows.
    pub fn load(
        &self,
        asset: AssetClass,
        symbol: &str,
        range: DateRange,
    ) -> Result<InstrumentSeries, PipelineError> {
        let stored = self
            .list(asset)?
            .into_iter()
            .find(|s| s.symbol == symbol)
            .ok_or_else(|| PipelineError::NotFound {
                asset,
                symbol: symbol.to_string(),
            })?;
        read_series(&stored.path, asset, symbol, range)
    }

    /// Load every instrument of an asset class, dropping (with a warning)
    /// those whose series is empty after the date filter. An asset class
    /// with no files at all yields an empty vector, not an error.
    pub fn load_all(
        &self,
        asset: AssetClass,
        range: DateRange,
    ) -> Result<Vec<InstrumentSeries>, PipelineError> {
        let mut all = Vec::new();
        for stored in self.list(asset)? {
            match read_series(&stored.path, asset, &stored.symbol, range) {
                Ok(series) => all.push(series),
                Err(PipelineError::EmptySeries { symbol }) => {
                    warn!(
                        symbol = %symbol,
                        window = %range,
                        "Skipping instrument: no rows inside the date window"
                    );
                }
                Err(e) => return Err(e),
            }
        }
        Ok(all)
    }
}

/// Read and validate one CSV file into a typed series.
fn read_series(
    path: &Path,
    asset: AssetClass,
    symbol: &str,
    range: DateRange,
) -> Result<InstrumentSeries, PipelineError> {
    debug!(path = %path.display(), symbol = %symbol, "Loading CSV data");

    let file = File::open(path)?;
    let df = CsvReader::new(file).has_header(true).finish()?;

    let dates = df.column("Date")?.utf8()?;
    // Integer-priced files infer as i64; cast before extraction.
    let closes = df.column("Close")?.cast(&DataType::Float64)?;
    let closes = closes.f64()?;

    let mut points = Vec::with_capacity(df.height());
    for (raw_date, close) in dates.into_iter().zip(closes.into_iter()) {
        let (Some(raw_date), Some(close)) = (raw_date, close) else {
            continue; // null cells carry no observation
        };
        if !close.is_finite() {
            continue;
        }
        let date = parse_date(raw_date)?;
        if range.contains(date) {
            points.push(PricePoint { date, close });
        }
    }

    if points.is_empty() {
        return Err(PipelineError::EmptySeries {
            symbol: symbol.to_string(),
        });
    }

    Ok(InstrumentSeries::new(asset, symbol.to_string(), points))
}

/// Normalize a raw date cell to a calendar date.
///
/// Providers disagree on formatting: ISO dates, slash-separated dates and
/// full datetimes all show up in collected files.
fn parse_date(raw: &str) -> Result<NaiveDate, PipelineError> {
    const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
    const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

    let trimmed = raw.trim();
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Ok(date);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Ok(dt.date());
        }
    }
    Err(PipelineError::DateParse(format!(
        "unrecognized date format: '{raw}'"
    )))
}
