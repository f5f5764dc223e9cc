//! Feature computation for the OHLCV EDA toolkit.
//!
//! This crate handles:
//! - Simple returns and trailing return windows
//! - Rolling volatility, skewness and excess kurtosis
//! - Rolling lag-1..3 autocorrelation
//! - Descriptive column statistics and correlation matrices

pub mod window;
pub mod stats;
pub mod rolling;
pub mod summary;

pub use window::TrailingWindows;
pub use rolling::{compute, FeatureRow, FeatureTable, RollingFeatureComputer, FEATURE_COLUMNS};
pub use summary::{
    correlation_matrix, describe, describe_candles, ColumnSummary, CorrelationMatrix,
};
