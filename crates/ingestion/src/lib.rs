//! Data cleaning and resampling for the OHLCV EDA toolkit.
//!
//! This crate handles:
//! - Timestamp parsing and numeric coercion of raw klines
//! - Dropping incomplete rows, sorting and deduplication
//! - Resampling candles into coarser buckets

pub mod preprocess;
pub mod resample;

pub use preprocess::{Preprocessed, PreprocessStats, Preprocessor, RawKline};
pub use resample::resample;
