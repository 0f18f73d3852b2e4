//! Final per-pair results: aggregation, persistence and display.

use crate::error::PipelineError;
use crate::types::AssetClass;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Aggregated record for one pair that survived every filter and produced
/// at least one accepted Sharpe ratio.
#[derive(Debug, Clone, PartialEq)]
pub struct PairResult {
    /// Pair label in ratio orientation, e.g. `"AAPL/MSFT"`.
    pub pair: String,
    /// Arithmetic mean of the accepted Sharpe ratios across the threshold
    /// sweep.
    pub avg_sharpe: f64,
    /// Hurst exponent of the training-window price ratio.
    pub hurst: f64,
}

/// Arithmetic mean of the accepted Sharpe ratios; `None` for an empty list
/// (such a pair produces no results row).
pub fn average_sharpe(accepted: &[f64]) -> Option<f64> {
    if accepted.is_empty() {
        return None;
    }
    Some(accepted.iter().sum::<f64>() / accepted.len() as f64)
}

/// Ordered collection of pair results for one asset class. Row order is the
/// order pairs were first evaluated.
#[derive(Debug, Clone)]
pub struct ResultsTable {
    asset: AssetClass,
    rows: Vec<PairResult>,
}

impl ResultsTable {
    pub fn new(asset: AssetClass) -> Self {
        Self {
            asset,
            rows: Vec::new(),
        }
    }

    pub fn asset(&self) -> AssetClass {
        self.asset
    }

    pub fn push(&mut self, row: PairResult) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[PairResult] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Conventional output filename for this asset class.
    pub fn file_name(&self) -> String {
        format!("pairs_results_{}.csv", self.asset)
    }

    /// Persist the table as CSV under `dir`, returning the written path.
    pub fn write_csv(&self, dir: &Path) -> Result<PathBuf, PipelineError> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(self.file_name());
        let mut file = File::create(&path)?;
        writeln!(file, "Symbol,Sharpe Ratio,Hurst")?;
        for row in &self.rows {
            writeln!(file, "{},{},{}", row.pair, row.avg_sharpe, row.hurst)?;
        }
        info!(path = %path.display(), rows = self.rows.len(), "Results written");
        Ok(path)
    }

    /// Print a formatted summary table to stdout.
    pub fn print(&self) {
        println!(
            "\n{:<20} | {:>12} | {:>8}",
            "Pair", "Avg Sharpe", "Hurst"
        );
        println!("{}", "-".repeat(46));
        for row in &self.rows {
            println!(
                "{:<20} | {:>12.4} | {:>8.4}",
                row.pair, row.avg_sharpe, row.hurst
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_of_accepted_sharpes() {
        let avg = average_sharpe(&[1.2, 1.8, 2.0]).unwrap();
        assert!((avg - 5.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_accepted_list_yields_no_row() {
        assert_eq!(average_sharpe(&[]), None);
    }

    #[test]
    fn test_rows_keep_insertion_order() {
        let mut table = ResultsTable::new(AssetClass::Crypto);
        table.push(PairResult {
            pair: "ETHUSD/BTCUSD".to_string(),
            avg_sharpe: 1.1,
            hurst: 0.41,
        });
        table.push(PairResult {
            pair: "BTCUSD/ETHUSD".to_string(),
            avg_sharpe: 0.9,
            hurst: 0.42,
        });
        let pairs: Vec<&str> = table.rows().iter().map(|r| r.pair.as_str()).collect();
        assert_eq!(pairs, vec!["ETHUSD/BTCUSD", "BTCUSD/ETHUSD"]);
    }

    #[test]
    fn test_write_csv_format() {
        let dir = std::env::temp_dir().join(format!("pairscout_report_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);

        let mut table = ResultsTable::new(AssetClass::Fx);
        table.push(PairResult {
            pair: "USDJPY/EURUSD".to_string(),
            avg_sharpe: 1.5,
            hurst: 0.3,
        });
        let path = table.write_csv(&dir).unwrap();
        assert_eq!(path.file_name().unwrap(), "pairs_results_fx.csv");

        let contents = std::fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();
        assert_eq!(lines.next(), Some("Symbol,Sharpe Ratio,Hurst"));
        assert_eq!(lines.next(), Some("USDJPY/EURUSD,1.5,0.3"));
        assert_eq!(lines.next(), None);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
