//! Statistical routines for pair screening: Engle-Granger cointegration
//! testing and Hurst-exponent persistence estimation.

pub mod cointegration;
pub mod hurst;

pub use cointegration::{engle_granger, CointegrationTest, PairSet, ScreenOutcome};
pub use hurst::hurst;

use thiserror::Error;

/// Errors from the statistical routines.
#[derive(Error, Debug)]
pub enum StatsError {
    /// Input too short for a reliable estimate.
    #[error("insufficient data: expected at least {expected} observations, got {actual}")]
    InsufficientData { expected: usize, actual: usize },

    /// Degenerate input (constant series, zero variance).
    #[error("degenerate input: {0}")]
    Degenerate(String),

    /// Series supplied with mismatched lengths.
    #[error("length mismatch: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },
}

/// Ordinary least squares of `y` on `x` with intercept.
///
/// Returns `(intercept, slope)`, or `None` when `x` has zero variance.
pub(crate) fn ols(x: &[f64], y: &[f64]) -> Option<(f64, f64)> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }

    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let mut covariance = 0.0;
    let mut variance_x = 0.0;
    for (xi, yi) in x.iter().zip(y.iter()) {
        let dx = xi - mean_x;
        covariance += dx * (yi - mean_y);
        variance_x += dx * dx;
    }

    if variance_x.abs() < f64::EPSILON {
        return None;
    }

    let slope = covariance / variance_x;
    let intercept = mean_y - slope * mean_x;
    if slope.is_finite() && intercept.is_finite() {
        Some((intercept, slope))
    } else {
        None
    }
}
