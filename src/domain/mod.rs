//! Core domain types and logic.

pub mod backtest;
pub mod composer;
pub mod error;
pub mod indicator;
pub mod market_series;
pub mod metrics;
pub mod settings;
pub mod signal;
pub mod strategy;
