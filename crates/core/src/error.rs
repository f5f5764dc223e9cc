//! Error types for the OHLCV EDA toolkit.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the OHLCV EDA toolkit.
#[derive(Error, Debug)]
pub enum Error {
    /// Rolling window too small to define a sample statistic.
    #[error("Invalid window: {window} (must be at least 2)")]
    InvalidWindow { window: usize },

    /// Zero-length input.
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data error (inconsistent or malformed series).
    #[error("Data error: {0}")]
    Data(String),

    /// Parse error (timestamps, frequency aliases).
    #[error("Parse error: {0}")]
    Parse(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create an invalid window error.
    pub fn invalid_window(window: usize) -> Self {
        Error::InvalidWindow { window }
    }

    /// Create an empty input error.
    pub fn empty_input(msg: impl Into<String>) -> Self {
        Error::EmptyInput(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a data error.
    pub fn data(msg: impl Into<String>) -> Self {
        Error::Data(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Error::Parse(msg.into())
    }
}
