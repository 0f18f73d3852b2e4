//! Pairscout: screens historical price data for cointegrated, mean-reverting
//! instrument pairs and backtests a threshold-based pairs-trading strategy
//! against every qualifying pair.

pub mod backtest;
pub mod commands;
pub mod config;
pub mod data;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod stats;
pub mod types;
