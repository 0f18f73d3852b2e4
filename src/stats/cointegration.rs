//! Engle-Granger two-step cointegration testing and pairwise screening.
//!
//! Step one regresses one price series on the other (OLS with intercept);
//! step two runs an augmented Dickey-Fuller regression on the residuals.
//! A strongly negative test statistic rejects the unit-root null, i.e. the
//! residual spread is stationary and the pair is cointegrated.

use super::{ols, StatsError};
use crate::data::AlignedMatrix;
use std::collections::HashSet;
use tracing::{debug, info};

/// Observations below this make the residual regression unreliable.
const MIN_OBSERVATIONS: usize = 20;

/// Approximate asymptotic quantiles of the Engle-Granger tau distribution
/// for two variables with a constant term (MacKinnon). The screening
/// decision region (p around 0.01-0.10) matches the published surface;
/// interior points are interpolated.
const TAU_QUANTILES: [(f64, f64); 12] = [
    (-4.40, 0.001),
    (-3.90, 0.01),
    (-3.59, 0.025),
    (-3.34, 0.05),
    (-3.04, 0.10),
    (-2.76, 0.20),
    (-2.45, 0.35),
    (-2.03, 0.50),
    (-1.50, 0.70),
    (-0.95, 0.85),
    (-0.30, 0.95),
    (0.50, 0.99),
];

/// Outcome of one Engle-Granger test.
#[derive(Debug, Clone, Copy)]
pub struct CointegrationTest {
    /// ADF t-statistic on the cointegrating residuals (more negative =
    /// stronger evidence of cointegration).
    pub statistic: f64,
    /// Approximate asymptotic p-value for the no-cointegration null.
    pub p_value: f64,
}

/// Unordered symbol pairs, stored canonically so membership lookups are
/// symmetric: `contains("A", "B") == contains("B", "A")`.
#[derive(Debug, Clone, Default)]
pub struct PairSet {
    pairs: HashSet<(String, String)>,
}

impl PairSet {
    fn canonical(a: &str, b: &str) -> (String, String) {
        if a <= b {
            (a.to_string(), b.to_string())
        } else {
            (b.to_string(), a.to_string())
        }
    }

    pub fn insert(&mut self, a: &str, b: &str) {
        self.pairs.insert(Self::canonical(a, b));
    }

    pub fn contains(&self, a: &str, b: &str) -> bool {
        self.pairs.contains(&Self::canonical(a, b))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Pairwise screening result over one aligned matrix.
///
/// `scores[i][j]` and `p_values[i][j]` are populated for `i < j` in column
/// order; the set answers symmetric membership queries.
#[derive(Debug, Clone)]
pub struct ScreenOutcome {
    pub symbols: Vec<String>,
    pub scores: Vec<Vec<f64>>,
    pub p_values: Vec<Vec<f64>>,
    pub cointegrated: PairSet,
}

/// Engle-Granger test of `y` against `x`.
pub fn engle_granger(y: &[f64], x: &[f64]) -> Result<CointegrationTest, StatsError> {
    if y.len() != x.len() {
        return Err(StatsError::LengthMismatch {
            left: y.len(),
            right: x.len(),
        });
    }
    if y.len() < MIN_OBSERVATIONS {
        return Err(StatsError::InsufficientData {
            expected: MIN_OBSERVATIONS,
            actual: y.len(),
        });
    }

    let (intercept, slope) = ols(x, y)
        .ok_or_else(|| StatsError::Degenerate("regressor has zero variance".to_string()))?;

    let residuals: Vec<f64> = y
        .iter()
        .zip(x.iter())
        .map(|(yi, xi)| yi - (intercept + slope * xi))
        .collect();

    let statistic = adf_statistic(&residuals)?;
    let p_value = tau_p_value(statistic);

    Ok(CointegrationTest { statistic, p_value })
}

/// ADF t-statistic: regress the first difference of `series` on its lagged
/// level (both demeaned) and return the t-statistic of the unit-root
/// coefficient.
fn adf_statistic(series: &[f64]) -> Result<f64, StatsError> {
    let n = series.len() - 1;
    let n_f64 = n as f64;

    let mut delta: Vec<f64> = Vec::with_capacity(n);
    let mut lagged: Vec<f64> = Vec::with_capacity(n);
    for i in 1..series.len() {
        delta.push(series[i] - series[i - 1]);
        lagged.push(series[i - 1]);
    }

    let lag_mean = lagged.iter().sum::<f64>() / n_f64;
    let delta_mean = delta.iter().sum::<f64>() / n_f64;

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for i in 0..n {
        let l = lagged[i] - lag_mean;
        numerator += l * (delta[i] - delta_mean);
        denominator += l * l;
    }

    if denominator.abs() < f64::EPSILON {
        return Err(StatsError::Degenerate(
            "residual series has zero variance".to_string(),
        ));
    }

    let gamma = numerator / denominator;

    let mut sse = 0.0;
    for i in 0..n {
        let predicted = gamma * (lagged[i] - lag_mean) + delta_mean;
        let residual = delta[i] - predicted;
        sse += residual * residual;
    }

    let mse = sse / (n_f64 - 1.0);
    let se_gamma = (mse / denominator).sqrt();
    if se_gamma.abs() < f64::EPSILON {
        return Err(StatsError::Degenerate(
            "zero standard error in unit-root regression".to_string(),
        ));
    }

    Ok(gamma / se_gamma)
}

/// Map a tau statistic to an approximate p-value by linear interpolation
/// over `TAU_QUANTILES`, clamped at the table ends.
fn tau_p_value(statistic: f64) -> f64 {
    let first = TAU_QUANTILES[0];
    if statistic <= first.0 {
        return first.1;
    }
    let last = TAU_QUANTILES[TAU_QUANTILES.len() - 1];
    if statistic >= last.0 {
        return last.1;
    }
    for window in TAU_QUANTILES.windows(2) {
        let (s0, p0) = window[0];
        let (s1, p1) = window[1];
        if statistic <= s1 {
            let t = (statistic - s0) / (s1 - s0);
            return p0 + t * (p1 - p0);
        }
    }
    last.1
}

/// Run the Engle-Granger test over every unordered column pair of the
/// matrix. Degenerate pairs are recorded with statistic 0 / p-value 1 and
/// never abort the screen.
pub fn screen(matrix: &AlignedMatrix, p_threshold: f64) -> ScreenOutcome {
    let n = matrix.n_symbols();
    let symbols = matrix.symbols().to_vec();
    let mut scores = vec![vec![0.0; n]; n];
    let mut p_values = vec![vec![1.0; n]; n];
    let mut cointegrated = PairSet::default();

    for i in 0..n {
        for j in (i + 1)..n {
            match engle_granger(matrix.column(i), matrix.column(j)) {
                Ok(test) => {
                    scores[i][j] = test.statistic;
                    p_values[i][j] = test.p_value;
                    if test.p_value < p_threshold {
                        debug!(
                            pair = format!("{}/{}", symbols[i], symbols[j]),
                            statistic = format!("{:.3}", test.statistic),
                            p_value = format!("{:.4}", test.p_value),
                            "Cointegrated pair"
                        );
                        cointegrated.insert(&symbols[i], &symbols[j]);
                    }
                }
                Err(e) => {
                    debug!(
                        pair = format!("{}/{}", symbols[i], symbols[j]),
                        error = %e,
                        "Cointegration test degenerate, pair excluded"
                    );
                }
            }
        }
    }

    info!(
        asset = %matrix.asset(),
        candidates = n * n.saturating_sub(1) / 2,
        cointegrated = cointegrated.len(),
        "Cointegration screen complete"
    );

    ScreenOutcome {
        symbols,
        scores,
        p_values,
        cointegrated,
    }
}
