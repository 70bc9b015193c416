//! Core domain types and logic.

pub mod ohlcv;
pub mod series;
pub mod indicator;
pub mod signal;
pub mod sizing;
pub mod position;
pub mod portfolio;
pub mod strategy;
pub mod backtest;
pub mod metrics;
pub mod config_validation;
pub mod error;
