//! Core domain types shared across the pipeline.

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Asset classes the pipeline screens. Doubles as the input-file prefix
/// (e.g. `stock_AAPL_from_2000-01-01_to_2020-11-18.csv`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetClass {
    Stock,
    Crypto,
    Fx,
}

impl AssetClass {
    /// All asset classes, in the order the pipeline runs them.
    pub const ALL: [AssetClass; 3] = [AssetClass::Stock, AssetClass::Crypto, AssetClass::Fx];

    /// Filename prefix for this asset class.
    pub fn prefix(&self) -> &'static str {
        match self {
            AssetClass::Stock => "stock",
            AssetClass::Crypto => "crypto",
            AssetClass::Fx => "fx",
        }
    }
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// A date window with *exclusive* bounds on both ends, matching the
/// `Date > start AND Date < end` filter the input files were collected for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Whether `date` falls strictly inside the window.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date > self.start && date < self.end
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.start, self.end)
    }
}

/// One daily observation of an instrument.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

/// A loaded close-price series for one instrument. Points are sorted
/// ascending by date and dates are unique; the series is immutable after
/// construction.
#[derive(Debug, Clone)]
pub struct InstrumentSeries {
    asset: AssetClass,
    symbol: String,
    points: Vec<PricePoint>,
}

impl InstrumentSeries {
    /// Build a series from raw points: sorts ascending by date and drops
    /// duplicate dates, keeping the first occurrence.
    pub fn new(asset: AssetClass, symbol: String, mut points: Vec<PricePoint>) -> Self {
        points.sort_by_key(|p| p.date);
        points.dedup_by_key(|p| p.date);
        Self {
            asset,
            symbol,
            points,
        }
    }

    pub fn asset(&self) -> AssetClass {
        self.asset
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.points.iter().map(|p| p.date)
    }

    pub fn closes(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.close)
    }

    /// Close price on an exact date, if present.
    pub fn close_on(&self, date: NaiveDate) -> Option<f64> {
        self.points
            .binary_search_by_key(&date, |p| p.date)
            .ok()
            .map(|i| self.points[i].close)
    }
}
