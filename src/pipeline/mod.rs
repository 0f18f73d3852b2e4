//! Per-asset-class orchestration of the screening pipeline.
//!
//! Load → align → cointegration screen → per-pair persistence filter →
//! threshold-sweep backtests → aggregated results. Every pair is evaluated
//! independently; a failure inside one pair's evaluation is caught at the
//! pair boundary and never aborts the asset-class run.

use crate::backtest;
use crate::config::PipelineConfig;
use crate::data::{AlignedMatrix, SeriesStore};
use crate::error::PipelineError;
use crate::report::{average_sharpe, PairResult, ResultsTable};
use crate::stats::cointegration::{self, PairSet};
use crate::stats::hurst;
use crate::types::AssetClass;
use std::fmt;
use tracing::{debug, info, warn};

/// Why a pair was dropped without producing a results row. These are
/// expected outcomes, not errors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SkipReason {
    /// Hurst exponent at or above 0.5: trending or random-walk-like ratio.
    Trending { hurst: f64 },
    /// The Engle-Granger screen did not place the pair in the cointegrated
    /// set.
    NotCointegrated,
    /// Every threshold run produced a null or out-of-band Sharpe ratio.
    NoAcceptedSharpe,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Trending { hurst } => write!(f, "trending ratio (hurst {hurst:.4})"),
            SkipReason::NotCointegrated => f.write_str("not cointegrated"),
            SkipReason::NoAcceptedSharpe => f.write_str("no accepted sharpe ratios"),
        }
    }
}

/// Outcome of evaluating one candidate pair.
#[derive(Debug)]
pub enum PairOutcome {
    Completed(PairResult),
    Skipped(SkipReason),
    Failed(PipelineError),
}

/// The screening pipeline for one data directory and configuration.
pub struct PairsPipeline<'a> {
    config: &'a PipelineConfig,
    store: SeriesStore,
}

impl<'a> PairsPipeline<'a> {
    pub fn new(config: &'a PipelineConfig, store: SeriesStore) -> Self {
        Self { config, store }
    }

    /// Run the full pipeline for one asset class.
    ///
    /// An asset class with no usable instruments yields an empty table, not
    /// an error; failures outside the per-pair loop propagate.
    pub fn run(&self, asset: AssetClass) -> Result<ResultsTable, PipelineError> {
        let mut table = ResultsTable::new(asset);

        let series = self.store.load_all(asset, self.config.train_window())?;
        if series.len() < 2 {
            info!(
                asset = %asset,
                instruments = series.len(),
                "Fewer than two instruments, skipping asset class"
            );
            return Ok(table);
        }

        let matrix = AlignedMatrix::group(asset, &series);
        if matrix.is_degenerate() {
            info!(asset = %asset, "Empty aligned matrix, skipping asset class");
            return Ok(table);
        }

        let screen = cointegration::screen(&matrix, self.config.coint_pvalue_threshold);

        let n = matrix.n_symbols();
        for i in 0..n {
            for j in (i + 1)..n {
                let pair = format!("{}/{}", matrix.symbols()[i], matrix.symbols()[j]);
                match self.evaluate_pair(&matrix, &screen.cointegrated, i, j) {
                    PairOutcome::Completed(result) => {
                        info!(
                            pair = %pair,
                            avg_sharpe = format!("{:.4}", result.avg_sharpe),
                            hurst = format!("{:.4}", result.hurst),
                            "Pair accepted"
                        );
                        table.push(result);
                    }
                    PairOutcome::Skipped(reason) => {
                        debug!(pair = %pair, reason = %reason, "Skipping pair");
                    }
                    PairOutcome::Failed(e) => {
                        warn!(pair = %pair, error = %e, "Skipping pair after failure");
                    }
                }
            }
        }

        info!(asset = %asset, pairs = table.len(), "Asset class complete");
        Ok(table)
    }

    /// Evaluate one candidate pair, absorbing its errors into the outcome.
    pub(crate) fn evaluate_pair(
        &self,
        matrix: &AlignedMatrix,
        cointegrated: &PairSet,
        i: usize,
        j: usize,
    ) -> PairOutcome {
        match self.try_evaluate(matrix, cointegrated, i, j) {
            Ok(outcome) => outcome,
            Err(e) => PairOutcome::Failed(e),
        }
    }

    fn try_evaluate(
        &self,
        matrix: &AlignedMatrix,
        cointegrated: &PairSet,
        i: usize,
        j: usize,
    ) -> Result<PairOutcome, PipelineError> {
        let symbol_a = &matrix.symbols()[i];
        let symbol_b = &matrix.symbols()[j];

        // Persistence filter on the training-window price ratio.
        let ratio = matrix.ratio(i, j);
        let exponent = hurst(
            &ratio,
            self.config.hurst_lag_lower_limit..self.config.hurst_lag_upper_limit,
        )?;
        if exponent >= 0.5 {
            return Ok(PairOutcome::Skipped(SkipReason::Trending { hurst: exponent }));
        }

        // Cointegration membership is symmetric across orientations.
        if !cointegrated.contains(symbol_a, symbol_b) {
            return Ok(PairOutcome::Skipped(SkipReason::NotCointegrated));
        }

        // Backtests run on the test window, pairwise-aligned.
        let test_window = self.config.test_window();
        let leg_a = self.store.load(matrix.asset(), symbol_a, test_window)?;
        let leg_b = self.store.load(matrix.asset(), symbol_b, test_window)?;
        let aligned = AlignedMatrix::group(matrix.asset(), &[leg_a, leg_b]);
        if aligned.is_degenerate() {
            return Err(PipelineError::Backtest(
                "no overlapping dates in the test window".to_string(),
            ));
        }

        let runs = backtest::sweep(aligned.column(0), aligned.column(1), self.config)?;
        let accepted = backtest::accepted_sharpes(&runs, self.config);

        match average_sharpe(&accepted) {
            Some(avg_sharpe) => Ok(PairOutcome::Completed(PairResult {
                pair: format!("{symbol_a}/{symbol_b}"),
                avg_sharpe,
                hurst: exponent,
            })),
            None => Ok(PairOutcome::Skipped(SkipReason::NoAcceptedSharpe)),
        }
    }
}
