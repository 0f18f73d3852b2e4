//! Error types for the screening pipeline.

use crate::stats::StatsError;
use crate::types::AssetClass;
use thiserror::Error;

/// Errors that can occur while loading data or running the pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// No persisted input file matches the requested instrument.
    #[error("no input file found for {asset} instrument '{symbol}'")]
    NotFound { asset: AssetClass, symbol: String },

    /// Filtering to the requested date window left zero rows.
    #[error("series for '{symbol}' is empty after date filtering")]
    EmptySeries { symbol: String },

    /// A statistical routine failed on degenerate input.
    #[error("statistical computation failed: {0}")]
    Stats(#[from] StatsError),

    /// A single pair's simulation failed.
    #[error("backtest failure: {0}")]
    Backtest(String),

    /// A date cell could not be normalized to a calendar date.
    #[error("date parsing error: {0}")]
    DateParse(String),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O error (file operations).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV reading error from the tabular loader.
    #[error("tabular data error: {0}")]
    Polars(#[from] polars::error::PolarsError),
}
