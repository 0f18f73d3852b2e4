//! Aligns instrument series of one asset class onto a common date index.

use crate::types::{AssetClass, InstrumentSeries};
use chrono::NaiveDate;
use std::collections::HashSet;
use tracing::{debug, info};

/// Close prices of one asset class, inner-joined on date.
///
/// Every column has the same length as the shared date index; column order
/// follows the order the series were supplied in.
#[derive(Debug, Clone)]
pub struct AlignedMatrix {
    asset: AssetClass,
    dates: Vec<NaiveDate>,
    symbols: Vec<String>,
    columns: Vec<Vec<f64>>,
}

impl AlignedMatrix {
    /// Inner-join the supplied series on date: start from the first series'
    /// date index and intersect with each subsequent one.
    pub fn group(asset: AssetClass, series: &[InstrumentSeries]) -> Self {
        let mut common: Option<HashSet<NaiveDate>> = None;
        for s in series {
            let dates: HashSet<NaiveDate> = s.dates().collect();
            common = match common {
                Some(existing) => Some(existing.intersection(&dates).copied().collect()),
                None => Some(dates),
            };
        }

        let mut dates: Vec<NaiveDate> = common.unwrap_or_default().into_iter().collect();
        dates.sort();

        let mut symbols = Vec::with_capacity(series.len());
        let mut columns = Vec::with_capacity(series.len());
        if !dates.is_empty() {
            for s in series {
                let column: Vec<f64> = dates
                    .iter()
                    .filter_map(|d| s.close_on(*d))
                    .collect();
                debug_assert_eq!(column.len(), dates.len());
                symbols.push(s.symbol().to_string());
                columns.push(column);
            }
        }

        if dates.is_empty() && !series.is_empty() {
            info!(asset = %asset, "No overlapping dates across instruments");
        } else {
            debug!(
                asset = %asset,
                instruments = symbols.len(),
                rows = dates.len(),
                "Aligned close-price matrix built"
            );
        }

        Self {
            asset,
            dates,
            symbols,
            columns,
        }
    }

    pub fn asset(&self) -> AssetClass {
        self.asset
    }

    /// Number of rows in the shared date index.
    pub fn n_rows(&self) -> usize {
        self.dates.len()
    }

    pub fn n_symbols(&self) -> usize {
        self.symbols.len()
    }

    /// True when there is nothing to screen: fewer than two instruments or
    /// an empty date index.
    pub fn is_degenerate(&self) -> bool {
        self.n_symbols() < 2 || self.dates.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn column(&self, idx: usize) -> &[f64] {
        &self.columns[idx]
    }

    /// Element-wise price ratio `column[i] / column[j]`.
    pub fn ratio(&self, i: usize, j: usize) -> Vec<f64> {
        self.columns[i]
            .iter()
            .zip(self.columns[j].iter())
            .map(|(a, b)| a / b)
            .collect()
    }
}
