//! Hurst-exponent estimation for the persistence filter.
//!
//! Estimates long-term memory of a series from the scaling of its lagged
//! differences: for each lag, take the standard deviation of
//! `series[lag..] - series[..len-lag]`; the exponent is twice the slope of
//! `ln(sqrt(std))` against `ln(lag)`. Values below 0.5 indicate
//! mean-reverting behavior, 0.5 a random walk, above 0.5 a trending series.

use super::{ols, StatsError};
use std::ops::Range;

/// Estimate the Hurst exponent of `series` over the given lag range
/// (half-open, in observations).
///
/// The estimator is unbounded numerically; interpret values relative to the
/// 0.5 random-walk baseline rather than clamping.
pub fn hurst(series: &[f64], lags: Range<usize>) -> Result<f64, StatsError> {
    if lags.start < 2 || lags.end <= lags.start + 1 {
        return Err(StatsError::Degenerate(format!(
            "lag range [{}, {}) needs at least two lags >= 2",
            lags.start, lags.end
        )));
    }

    let max_lag = lags.end - 1;
    if series.len() < max_lag + 2 {
        return Err(StatsError::InsufficientData {
            expected: max_lag + 2,
            actual: series.len(),
        });
    }

    let mut log_lags = Vec::with_capacity(lags.len());
    let mut log_taus = Vec::with_capacity(lags.len());

    for lag in lags {
        let diffs: Vec<f64> = series[lag..]
            .iter()
            .zip(series[..series.len() - lag].iter())
            .map(|(a, b)| a - b)
            .collect();

        let n = diffs.len() as f64;
        let mean = diffs.iter().sum::<f64>() / n;
        let variance = diffs.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / n;
        let tau = variance.sqrt().sqrt();

        if tau <= 0.0 || !tau.is_finite() {
            return Err(StatsError::Degenerate(format!(
                "zero dispersion at lag {lag}"
            )));
        }

        log_lags.push((lag as f64).ln());
        log_taus.push(tau.ln());
    }

    let (_, slope) = ols(&log_lags, &log_taus)
        .ok_or_else(|| StatsError::Degenerate("collinear lag grid".to_string()))?;

    Ok(slope * 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic LCG noise in [-0.5, 0.5).
    fn noise(state: &mut u64) -> f64 {
        *state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
        ((*state >> 33) as f64) / (u32::MAX as f64) - 0.5
    }

    #[test]
    fn test_random_walk_is_near_half() {
        let mut state = 99u64;
        let mut level = 0.0;
        let series: Vec<f64> = (0..5000)
            .map(|_| {
                level += noise(&mut state);
                level
            })
            .collect();
        let h = hurst(&series, 2..20).unwrap();
        assert!(
            (h - 0.5).abs() < 0.12,
            "random walk exponent should approach 0.5, got {h}"
        );
    }

    #[test]
    fn test_mean_reverting_series_is_below_half() {
        let mut state = 7u64;
        let mut level = 0.0;
        let series: Vec<f64> = (0..5000)
            .map(|_| {
                level = 0.2 * level + noise(&mut state);
                level
            })
            .collect();
        let h = hurst(&series, 2..20).unwrap();
        assert!(h < 0.4, "strong mean reversion should push H well below 0.5, got {h}");
    }

    #[test]
    fn test_persistent_series_is_above_half() {
        // Positively autocorrelated increments: k-step dispersion grows
        // faster than sqrt(k), which is what the estimator keys on.
        let mut state = 3u64;
        let mut level = 0.0;
        let mut increment = 0.0;
        let series: Vec<f64> = (0..5000)
            .map(|_| {
                increment = 0.8 * increment + noise(&mut state);
                level += increment;
                level
            })
            .collect();
        let h = hurst(&series, 2..20).unwrap();
        assert!(h > 0.5, "persistent increments should push H above 0.5, got {h}");
    }

    #[test]
    fn test_constant_series_is_degenerate() {
        let series = vec![1.0; 200];
        assert!(matches!(
            hurst(&series, 2..20),
            Err(StatsError::Degenerate(_))
        ));
    }

    #[test]
    fn test_short_series_is_insufficient() {
        let series: Vec<f64> = (0..10).map(|i| i as f64).collect();
        assert!(matches!(
            hurst(&series, 2..20),
            Err(StatsError::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_invalid_lag_range_rejected() {
        let series: Vec<f64> = (0..100).map(|i| (i as f64).sin()).collect();
        assert!(hurst(&series, 0..20).is_err());
        assert!(hurst(&series, 5..6).is_err());
    }
}
