//! Threshold-based pairs-trading simulation.
//!
//! For one candidate pair and one entry threshold, walks the two test-window
//! price series bar by bar, trades the spread with a fixed unit stake, and
//! reports the run's annualized Sharpe ratio together with the simulated
//! portfolio value before and after.

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use std::collections::VecDeque;
use tracing::debug;

/// Trading days per year for Sharpe annualization.
const ANNUALIZATION_FACTOR: f64 = 252.0;

/// Result of one (pair, threshold) simulation.
#[derive(Debug, Clone)]
pub struct BacktestRun {
    /// Spread-entry threshold in z-units.
    pub threshold: f64,
    /// Annualized Sharpe ratio of the daily equity returns; `None` when the
    /// run produced no variation (e.g. no trades).
    pub sharpe: Option<f64>,
    pub start_value: Decimal,
    pub end_value: Decimal,
    /// Completed round trips.
    pub trades: u32,
}

/// Trading signal derived from the spread z-score.
#[derive(Debug, PartialEq, Clone, Copy)]
enum Signal {
    /// Long the spread: buy leg A, sell leg B.
    Buy,
    /// Short the spread: sell leg A, buy leg B.
    Sell,
    /// Close any open position (mean reversion).
    Exit,
    Hold,
}

/// Rolling z-score of the log-price spread `ln(a) - ln(b)`.
struct SpreadModel {
    window: usize,
    entry_z: f64,
    exit_z: f64,
    history: VecDeque<f64>,
}

impl SpreadModel {
    fn new(window: usize, entry_z: f64, exit_z: f64) -> Self {
        Self {
            window,
            entry_z,
            exit_z,
            history: VecDeque::with_capacity(window),
        }
    }

    fn observe(&mut self, price_a: f64, price_b: f64) -> Signal {
        let spread = price_a.ln() - price_b.ln();

        self.history.push_back(spread);
        if self.history.len() > self.window {
            self.history.pop_front();
        }
        if self.history.len() < self.window {
            return Signal::Hold; // Not enough data
        }

        let n = self.history.len() as f64;
        let mean = self.history.iter().sum::<f64>() / n;
        let variance = self
            .history
            .iter()
            .map(|s| {
                let diff = s - mean;
                diff * diff
            })
            .sum::<f64>()
            / n;
        let std_dev = variance.sqrt();

        let z_score = if std_dev == 0.0 {
            0.0
        } else {
            (spread - mean) / std_dev
        };

        if z_score > self.entry_z {
            Signal::Sell
        } else if z_score < -self.entry_z {
            Signal::Buy
        } else if z_score.abs() < self.exit_z {
            Signal::Exit
        } else {
            Signal::Hold
        }
    }
}

/// An open spread position with a fixed unit stake on each leg.
#[derive(Debug, Clone, Copy)]
struct Position {
    /// +1 = long spread (long A, short B), -1 = short spread.
    direction: i8,
}

impl Position {
    fn leg_quantities(&self, stake: Decimal) -> (Decimal, Decimal) {
        match self.direction {
            1 => (stake, -stake),
            _ => (-stake, stake),
        }
    }
}

fn to_decimal(price: f64) -> Result<Decimal, PipelineError> {
    Decimal::from_f64(price)
        .ok_or_else(|| PipelineError::Backtest(format!("price {price} not representable")))
}

/// Annualized Sharpe ratio from per-bar returns. `None` when fewer than two
/// returns exist or the return series has zero variance.
fn calculate_sharpe(returns: &[f64]) -> Option<f64> {
    if returns.len() < 2 {
        return None;
    }

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    // Sample variance (n-1 denominator)
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let std_dev = variance.sqrt();

    if std_dev.abs() < f64::EPSILON {
        return None;
    }

    let sharpe = (mean / std_dev) * ANNUALIZATION_FACTOR.sqrt();
    sharpe.is_finite().then_some(sharpe)
}

/// Simulate one (pair, threshold) run over aligned test-window closes.
pub fn run_pair(
    closes_a: &[f64],
    closes_b: &[f64],
    threshold: f64,
    config: &PipelineConfig,
) -> Result<BacktestRun, PipelineError> {
    if closes_a.len() != closes_b.len() {
        return Err(PipelineError::Backtest(format!(
            "leg length mismatch: {} vs {}",
            closes_a.len(),
            closes_b.len()
        )));
    }
    if closes_a
        .iter()
        .chain(closes_b.iter())
        .any(|p| *p <= 0.0 || !p.is_finite())
    {
        return Err(PipelineError::Backtest(
            "non-positive or non-finite price in test window".to_string(),
        ));
    }

    let stake = Decimal::from(config.stake);
    let start_value = config.initial_capital;
    let mut cash = start_value;
    let mut position: Option<Position> = None;
    let mut trades = 0u32;

    let mut model = SpreadModel::new(config.zscore_window, threshold, config.exit_z_score);
    let mut equity_curve: Vec<Decimal> = Vec::with_capacity(closes_a.len());

    for (&raw_a, &raw_b) in closes_a.iter().zip(closes_b.iter()) {
        let signal = model.observe(raw_a, raw_b);
        let price_a = to_decimal(raw_a)?;
        let price_b = to_decimal(raw_b)?;

        match (signal, position) {
            (Signal::Buy, None) => {
                let pos = Position { direction: 1 };
                let (qty_a, qty_b) = pos.leg_quantities(stake);
                cash -= qty_a * price_a + qty_b * price_b;
                position = Some(pos);
            }
            (Signal::Sell, None) => {
                let pos = Position { direction: -1 };
                let (qty_a, qty_b) = pos.leg_quantities(stake);
                cash -= qty_a * price_a + qty_b * price_b;
                position = Some(pos);
            }
            (Signal::Exit, Some(pos)) => {
                let (qty_a, qty_b) = pos.leg_quantities(stake);
                cash += qty_a * price_a + qty_b * price_b;
                position = None;
                trades += 1;
            }
            // Hold, re-entry while open, or exit while flat
            _ => {}
        }

        let marked = match position {
            Some(pos) => {
                let (qty_a, qty_b) = pos.leg_quantities(stake);
                cash + qty_a * price_a + qty_b * price_b
            }
            None => cash,
        };
        equity_curve.push(marked);
    }

    let mut returns: Vec<f64> = Vec::with_capacity(equity_curve.len().saturating_sub(1));
    for pair in equity_curve.windows(2) {
        let prev = pair[0].to_f64().unwrap_or(0.0);
        let next = pair[1].to_f64().unwrap_or(0.0);
        if prev != 0.0 {
            returns.push((next - prev) / prev);
        }
    }

    let end_value = equity_curve.last().copied().unwrap_or(start_value);
    let sharpe = calculate_sharpe(&returns);

    debug!(
        threshold = threshold,
        trades = trades,
        sharpe = ?sharpe,
        start = %start_value,
        end = %end_value,
        "Backtest run complete"
    );

    Ok(BacktestRun {
        threshold,
        sharpe,
        start_value,
        end_value,
        trades,
    })
}

/// Run the full threshold sweep for one pair: integer thresholds from
/// `spread_lower_limit` (inclusive) to `spread_upper_limit` (exclusive).
pub fn sweep(
    closes_a: &[f64],
    closes_b: &[f64],
    config: &PipelineConfig,
) -> Result<Vec<BacktestRun>, PipelineError> {
    let mut runs = Vec::with_capacity(
        usize::try_from(config.spread_upper_limit - config.spread_lower_limit).unwrap_or(0),
    );
    for threshold in config.spread_lower_limit..config.spread_upper_limit {
        runs.push(run_pair(closes_a, closes_b, threshold as f64, config)?);
    }
    Ok(runs)
}

/// Sharpe ratios accepted into a pair's running list: present and strictly
/// inside the configured band. Everything else is silently discarded.
pub fn accepted_sharpes(runs: &[BacktestRun], config: &PipelineConfig) -> Vec<f64> {
    runs.iter()
        .filter_map(|run| run.sharpe)
        .filter(|s| *s > config.sharpe_lower_limit && *s < config.sharpe_upper_limit)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    /// Deterministic LCG noise in [-0.5, 0.5).
    fn noise(state: &mut u64) -> f64 {
        *state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
        ((*state >> 33) as f64) / (u32::MAX as f64) - 0.5
    }

    /// A cointegrated pair whose ratio oscillates around 2.0.
    fn mean_reverting_pair(len: usize) -> (Vec<f64>, Vec<f64>) {
        let mut state = 11u64;
        let mut ou = 0.0;
        let mut a = Vec::with_capacity(len);
        let mut b = Vec::with_capacity(len);
        for _ in 0..len {
            ou = 0.7 * ou + noise(&mut state);
            a.push(100.0 + ou);
            b.push(50.0);
        }
        (a, b)
    }

    fn test_config() -> PipelineConfig {
        PipelineConfig {
            zscore_window: 10,
            sharpe_lower_limit: -100.0,
            sharpe_upper_limit: 100.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_sweep_runs_one_per_threshold() {
        let (a, b) = mean_reverting_pair(120);
        let config = test_config();
        // spread limits default to [1, 6): exactly five runs.
        let runs = sweep(&a, &b, &config).unwrap();
        assert_eq!(runs.len(), 5);
        let thresholds: Vec<f64> = runs.iter().map(|r| r.threshold).collect();
        assert_eq!(thresholds, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_mean_reverting_pair_trades_and_scores() {
        let (a, b) = mean_reverting_pair(250);
        let config = test_config();
        let run = run_pair(&a, &b, 1.0, &config).unwrap();
        assert!(run.trades > 0, "oscillating spread should complete trades");
        assert!(run.sharpe.is_some());
        assert_eq!(run.start_value, dec!(10_000));
        assert_ne!(run.end_value, run.start_value);
    }

    #[test]
    fn test_flat_prices_yield_no_trades_and_null_sharpe() {
        let a = vec![100.0; 60];
        let b = vec![50.0; 60];
        let run = run_pair(&a, &b, 2.0, &test_config()).unwrap();
        assert_eq!(run.trades, 0);
        assert_eq!(run.sharpe, None);
        assert_eq!(run.end_value, run.start_value);
    }

    #[test]
    fn test_non_positive_price_is_a_backtest_failure() {
        let a = vec![100.0, -1.0, 100.0];
        let b = vec![50.0, 50.0, 50.0];
        assert!(matches!(
            run_pair(&a, &b, 1.0, &test_config()),
            Err(PipelineError::Backtest(_))
        ));
    }

    #[test]
    fn test_length_mismatch_is_a_backtest_failure() {
        let a = vec![100.0; 10];
        let b = vec![50.0; 9];
        assert!(matches!(
            run_pair(&a, &b, 1.0, &test_config()),
            Err(PipelineError::Backtest(_))
        ));
    }

    #[test]
    fn test_acceptance_band_filters_sharpes() {
        let config = PipelineConfig {
            sharpe_lower_limit: 0.0,
            sharpe_upper_limit: 10.0,
            ..Default::default()
        };
        let run = |sharpe: Option<f64>| BacktestRun {
            threshold: 1.0,
            sharpe,
            start_value: dec!(10_000),
            end_value: dec!(10_000),
            trades: 0,
        };
        let runs = vec![
            run(Some(1.2)),
            run(Some(1.8)),
            run(Some(2.0)),
            run(Some(-0.5)), // below the band
            run(Some(12.0)), // above the band
            run(None),       // null is discarded, not an error
        ];
        assert_eq!(accepted_sharpes(&runs, &config), vec![1.2, 1.8, 2.0]);
    }

    #[test]
    fn test_sharpe_needs_variance() {
        assert_eq!(calculate_sharpe(&[0.01, 0.01, 0.01]), None);
        assert_eq!(calculate_sharpe(&[0.01]), None);
        assert!(calculate_sharpe(&[0.01, 0.02, 0.015]).unwrap() > 0.0);
    }
}
