//! Configuration for the screening and backtesting pipeline.
//!
//! All constants the pipeline consumes live here and are threaded explicitly
//! into each component; there is no ambient global state. Fields can be
//! overridden from a JSON file, with serde defaults filling the rest.

use crate::error::PipelineError;
use crate::types::DateRange;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Training window start (exclusive), used for cointegration and Hurst.
    #[serde(default = "default_train_start")]
    pub train_start: NaiveDate,

    /// Training window end (exclusive).
    #[serde(default = "default_train_end")]
    pub train_end: NaiveDate,

    /// Test window start (exclusive), used for the simulated trading runs.
    #[serde(default = "default_test_start")]
    pub test_start: NaiveDate,

    /// Test window end (exclusive).
    #[serde(default = "default_test_end")]
    pub test_end: NaiveDate,

    /// Engle-Granger p-value below which a pair counts as cointegrated.
    #[serde(default = "default_coint_pvalue")]
    pub coint_pvalue_threshold: f64,

    /// Smallest lag used by the Hurst estimator (inclusive).
    #[serde(default = "default_hurst_lag_lower")]
    pub hurst_lag_lower_limit: usize,

    /// Largest lag used by the Hurst estimator (exclusive).
    #[serde(default = "default_hurst_lag_upper")]
    pub hurst_lag_upper_limit: usize,

    /// First spread-entry threshold of the sweep (inclusive, z-units).
    #[serde(default = "default_spread_lower")]
    pub spread_lower_limit: i64,

    /// End of the spread-entry threshold sweep (exclusive, z-units).
    #[serde(default = "default_spread_upper")]
    pub spread_upper_limit: i64,

    /// Sharpe ratios at or below this are discarded.
    #[serde(default = "default_sharpe_lower")]
    pub sharpe_lower_limit: f64,

    /// Sharpe ratios at or above this are discarded (overfitting guard).
    #[serde(default = "default_sharpe_upper")]
    pub sharpe_upper_limit: f64,

    /// Rolling window for the spread z-score, in trading days.
    #[serde(default = "default_zscore_window")]
    pub zscore_window: usize,

    /// |z| below which an open position is closed (mean reversion).
    #[serde(default = "default_exit_z_score")]
    pub exit_z_score: f64,

    /// Fixed unit stake per leg.
    #[serde(default = "default_stake")]
    pub stake: u32,

    /// Starting cash for each simulated run (in USD).
    #[serde(default = "default_initial_capital")]
    pub initial_capital: Decimal,
}

// Default value functions for serde
fn default_train_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2018, 1, 1).unwrap()
}
fn default_train_end() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()
}
fn default_test_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()
}
fn default_test_end() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 7, 1).unwrap()
}
fn default_coint_pvalue() -> f64 {
    0.05
}
fn default_hurst_lag_lower() -> usize {
    2
}
fn default_hurst_lag_upper() -> usize {
    20
}
fn default_spread_lower() -> i64 {
    1
}
fn default_spread_upper() -> i64 {
    6
}
fn default_sharpe_lower() -> f64 {
    0.0
}
fn default_sharpe_upper() -> f64 {
    10.0
}
fn default_zscore_window() -> usize {
    20
}
fn default_exit_z_score() -> f64 {
    0.1
}
fn default_stake() -> u32 {
    3
}
fn default_initial_capital() -> Decimal {
    dec!(10_000)
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            train_start: default_train_start(),
            train_end: default_train_end(),
            test_start: default_test_start(),
            test_end: default_test_end(),
            coint_pvalue_threshold: default_coint_pvalue(),
            hurst_lag_lower_limit: default_hurst_lag_lower(),
            hurst_lag_upper_limit: default_hurst_lag_upper(),
            spread_lower_limit: default_spread_lower(),
            spread_upper_limit: default_spread_upper(),
            sharpe_lower_limit: default_sharpe_lower(),
            sharpe_upper_limit: default_sharpe_upper(),
            zscore_window: default_zscore_window(),
            exit_z_score: default_exit_z_score(),
            stake: default_stake(),
            initial_capital: default_initial_capital(),
        }
    }
}

impl PipelineConfig {
    /// Load overrides from a JSON file; absent fields keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, PipelineError> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config
            .validate()
            .map_err(PipelineError::InvalidConfig)?;
        Ok(config)
    }

    /// Training window as a `DateRange`.
    pub fn train_window(&self) -> DateRange {
        DateRange::new(self.train_start, self.train_end)
    }

    /// Test window as a `DateRange`.
    pub fn test_window(&self) -> DateRange {
        DateRange::new(self.test_start, self.test_end)
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.train_start >= self.train_end {
            return Err(format!(
                "train window is inverted: {} >= {}",
                self.train_start, self.train_end
            ));
        }
        if self.test_start >= self.test_end {
            return Err(format!(
                "test window is inverted: {} >= {}",
                self.test_start, self.test_end
            ));
        }
        if !(0.0..1.0).contains(&self.coint_pvalue_threshold) || self.coint_pvalue_threshold <= 0.0
        {
            return Err(format!(
                "coint_pvalue_threshold must be inside (0, 1), got {}",
                self.coint_pvalue_threshold
            ));
        }
        if self.hurst_lag_lower_limit < 2 {
            return Err("hurst_lag_lower_limit must be at least 2".to_string());
        }
        if self.hurst_lag_upper_limit <= self.hurst_lag_lower_limit + 1 {
            return Err(format!(
                "hurst lag range [{}, {}) needs at least two lags",
                self.hurst_lag_lower_limit, self.hurst_lag_upper_limit
            ));
        }
        if self.spread_upper_limit <= self.spread_lower_limit {
            return Err(format!(
                "spread threshold range [{}, {}) is empty",
                self.spread_lower_limit, self.spread_upper_limit
            ));
        }
        if self.spread_lower_limit <= 0 {
            return Err("spread_lower_limit must be positive".to_string());
        }
        if self.sharpe_upper_limit <= self.sharpe_lower_limit {
            return Err(format!(
                "sharpe acceptance band ({}, {}) is empty",
                self.sharpe_lower_limit, self.sharpe_upper_limit
            ));
        }
        if self.zscore_window < 2 {
            return Err("zscore_window must be at least 2".to_string());
        }
        if self.stake == 0 {
            return Err("stake must be positive".to_string());
        }
        if self.initial_capital <= Decimal::ZERO {
            return Err("initial_capital must be positive".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_inverted_train_window_invalid() {
        let config = PipelineConfig {
            train_start: NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_spread_range_invalid() {
        let config = PipelineConfig {
            spread_lower_limit: 6,
            spread_upper_limit: 6,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_pvalue_threshold_bounds() {
        let config = PipelineConfig {
            coint_pvalue_threshold: 1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = PipelineConfig {
            coint_pvalue_threshold: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{ "coint_pvalue_threshold": 0.01 }"#).unwrap();
        assert_eq!(config.coint_pvalue_threshold, 0.01);
        assert_eq!(config.spread_upper_limit, default_spread_upper());
        assert_eq!(config.initial_capital, dec!(10_000));
    }
}
