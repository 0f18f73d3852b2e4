//! Property-based tests for the statistical filters and aggregation
//!
//! These tests use proptest to verify invariants across many random inputs,
//! catching edge cases that unit tests might miss.

use pairscout::backtest::{accepted_sharpes, BacktestRun};
use pairscout::config::PipelineConfig;
use pairscout::report::average_sharpe;
use pairscout::stats::cointegration::{engle_granger, PairSet};
use pairscout::stats::hurst;
use proptest::prelude::*;
use rust_decimal_macros::dec;

/// Cumulative sum turns bounded increments into a walk-like level series.
fn cumsum(increments: &[f64]) -> Vec<f64> {
    let mut level = 0.0;
    increments
        .iter()
        .map(|inc| {
            level += inc;
            level
        })
        .collect()
}

proptest! {
    /// When the Hurst estimator produces a value, that value is finite.
    #[test]
    fn hurst_is_finite_when_defined(
        increments in prop::collection::vec(-1.0f64..1.0f64, 50..300)
    ) {
        let series = cumsum(&increments);
        if let Ok(h) = hurst(&series, 2..20) {
            prop_assert!(h.is_finite(), "Hurst exponent should be finite: {}", h);
        }
    }

    /// The estimator keys on relative dispersion across lags, so rescaling
    /// the series must not move the exponent.
    #[test]
    fn hurst_is_scale_invariant(
        increments in prop::collection::vec(-1.0f64..1.0f64, 100..300),
        scale in 0.5f64..10.0f64
    ) {
        let series = cumsum(&increments);
        let scaled: Vec<f64> = series.iter().map(|v| v * scale).collect();

        if let (Ok(h), Ok(h_scaled)) = (hurst(&series, 2..20), hurst(&scaled, 2..20)) {
            prop_assert!(
                (h - h_scaled).abs() < 1e-6,
                "scaling should not move the exponent: {} vs {}", h, h_scaled
            );
        }
    }

    /// Cointegration p-values stay inside the tabulated range.
    #[test]
    fn engle_granger_pvalue_is_bounded(
        inc_a in prop::collection::vec(-1.0f64..1.0f64, 30..200),
        inc_b in prop::collection::vec(-1.0f64..1.0f64, 30..200)
    ) {
        let len = inc_a.len().min(inc_b.len());
        let a = cumsum(&inc_a[..len]);
        let b = cumsum(&inc_b[..len]);

        if let Ok(test) = engle_granger(&a, &b) {
            prop_assert!(
                (0.001..=0.99).contains(&test.p_value),
                "p-value outside the tabulated range: {}", test.p_value
            );
            prop_assert!(test.statistic.is_finite());
        }
    }

    /// Pair membership never depends on orientation.
    #[test]
    fn pair_set_is_orientation_free(
        left in "[A-Z]{1,6}",
        right in "[A-Z]{1,6}"
    ) {
        let mut set = PairSet::default();
        set.insert(&left, &right);
        prop_assert!(set.contains(&left, &right));
        prop_assert!(set.contains(&right, &left));
        prop_assert_eq!(set.len(), 1);
    }

    /// The aggregated Sharpe ratio never leaves the range of its inputs.
    #[test]
    fn average_sharpe_stays_within_input_range(
        accepted in prop::collection::vec(-100.0f64..100.0f64, 1..50)
    ) {
        let avg = average_sharpe(&accepted).unwrap();
        let min = accepted.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = accepted.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        prop_assert!(
            avg >= min - 1e-9 && avg <= max + 1e-9,
            "average {} outside [{}, {}]", avg, min, max
        );
    }

    /// Everything the acceptance filter keeps is strictly inside the band.
    #[test]
    fn accepted_sharpes_respect_the_band(
        sharpes in prop::collection::vec(prop::option::of(-20.0f64..20.0f64), 0..20),
        lower in -10.0f64..0.0f64,
        width in 0.1f64..20.0f64
    ) {
        let config = PipelineConfig {
            sharpe_lower_limit: lower,
            sharpe_upper_limit: lower + width,
            ..Default::default()
        };
        let runs: Vec<BacktestRun> = sharpes
            .iter()
            .map(|sharpe| BacktestRun {
                threshold: 1.0,
                sharpe: *sharpe,
                start_value: dec!(10_000),
                end_value: dec!(10_000),
                trades: 0,
            })
            .collect();

        let accepted = accepted_sharpes(&runs, &config);
        prop_assert!(accepted.len() <= runs.len());
        for s in &accepted {
            prop_assert!(
                *s > config.sharpe_lower_limit && *s < config.sharpe_upper_limit,
                "accepted sharpe {} escapes the band ({}, {})",
                s, config.sharpe_lower_limit, config.sharpe_upper_limit
            );
        }
    }
}
