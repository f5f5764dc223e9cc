//! Rolling return statistics.
//!
//! Computes per-row simple returns and, over a trailing window of returns,
//! volatility, skewness, excess kurtosis and lag-1..3 autocorrelation.

use crate::stats::{autocorrelation, excess_kurtosis, is_flat, max_abs, sample_std_dev, skewness};
use crate::window::TrailingWindows;
use eda_core::{config::FeatureConfig, Candle, Error, PriceSeries, Result, TimestampMs};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Lags used for the autocorrelation columns.
pub const AUTOCORR_LAGS: [usize; 3] = [1, 2, 3];

/// Column names of a [`FeatureTable`], in [`FeatureRow`] order.
pub const FEATURE_COLUMNS: [&str; 7] = [
    "return",
    "volatility",
    "skewness",
    "kurtosis",
    "autocorr_1",
    "autocorr_2",
    "autocorr_3",
];

/// Derived features for a single row. `None` marks a missing value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub ts: TimestampMs,
    #[serde(rename = "return")]
    pub ret: Option<f64>,
    pub volatility: Option<f64>,
    pub skewness: Option<f64>,
    pub kurtosis: Option<f64>,
    pub autocorr_1: Option<f64>,
    pub autocorr_2: Option<f64>,
    pub autocorr_3: Option<f64>,
}

/// Feature columns aligned one-to-one with the input series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureTable {
    index: Vec<TimestampMs>,
    returns: Vec<Option<f64>>,
    volatility: Vec<Option<f64>>,
    skewness: Vec<Option<f64>>,
    kurtosis: Vec<Option<f64>>,
    autocorr: [Vec<Option<f64>>; 3],
    window: usize,
}

impl FeatureTable {
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Window the table was computed with.
    pub fn window(&self) -> usize {
        self.window
    }

    /// Timestamps, identical to the input series index.
    pub fn index(&self) -> &[TimestampMs] {
        &self.index
    }

    /// Column by name (see [`FEATURE_COLUMNS`]).
    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        let col = match name {
            "return" => &self.returns,
            "volatility" => &self.volatility,
            "skewness" => &self.skewness,
            "kurtosis" => &self.kurtosis,
            "autocorr_1" => &self.autocorr[0],
            "autocorr_2" => &self.autocorr[1],
            "autocorr_3" => &self.autocorr[2],
            _ => return None,
        };
        Some(col)
    }

    pub fn returns(&self) -> &[Option<f64>] {
        &self.returns
    }

    pub fn volatility(&self) -> &[Option<f64>] {
        &self.volatility
    }

    pub fn skewness(&self) -> &[Option<f64>] {
        &self.skewness
    }

    pub fn kurtosis(&self) -> &[Option<f64>] {
        &self.kurtosis
    }

    /// Autocorrelation column for `lag` in 1..=3.
    pub fn autocorr(&self, lag: usize) -> Option<&[Option<f64>]> {
        AUTOCORR_LAGS
            .iter()
            .position(|&l| l == lag)
            .map(|i| self.autocorr[i].as_slice())
    }

    /// Row at position `i`.
    pub fn row(&self, i: usize) -> Option<FeatureRow> {
        (i < self.len()).then(|| self.row_at(i))
    }

    fn row_at(&self, i: usize) -> FeatureRow {
        FeatureRow {
            ts: self.index[i],
            ret: self.returns[i],
            volatility: self.volatility[i],
            skewness: self.skewness[i],
            kurtosis: self.kurtosis[i],
            autocorr_1: self.autocorr[0][i],
            autocorr_2: self.autocorr[1][i],
            autocorr_3: self.autocorr[2][i],
        }
    }

    /// Row for timestamp `ts`.
    pub fn get(&self, ts: TimestampMs) -> Option<FeatureRow> {
        let i = self.index.binary_search(&ts).ok()?;
        self.row(i)
    }

    /// Iterate rows in index order.
    pub fn rows(&self) -> impl ExactSizeIterator<Item = FeatureRow> + '_ {
        (0..self.len()).map(move |i| self.row_at(i))
    }

    /// Join rows back onto candles by open time.
    ///
    /// Candles whose open time is not in the index are skipped.
    pub fn augment<'c>(&self, candles: &'c [Candle]) -> Vec<(&'c Candle, FeatureRow)> {
        candles
            .iter()
            .filter_map(|c| self.get(c.open_time).map(|row| (c, row)))
            .collect()
    }
}

/// Rolling feature calculator over a fixed trailing window of returns.
#[derive(Debug, Clone, Copy)]
pub struct RollingFeatureComputer {
    window: usize,
}

impl RollingFeatureComputer {
    /// Create a computer; fails with `InvalidWindow` when `window < 2`.
    pub fn new(window: usize) -> Result<Self> {
        if window < 2 {
            return Err(Error::invalid_window(window));
        }
        Ok(Self { window })
    }

    /// Create a computer from configuration.
    pub fn from_config(config: &FeatureConfig) -> Result<Self> {
        Self::new(config.window)
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Compute the feature table for `prices`.
    ///
    /// Rows before the first full window carry `None` features; a series of
    /// at most `window` prices is all-missing rather than an error.
    pub fn compute(&self, prices: &PriceSeries) -> Result<FeatureTable> {
        if prices.is_empty() {
            return Err(Error::empty_input("price series has no rows"));
        }

        let close = prices.close();
        let diffs: Vec<f64> = close.windows(2).map(|w| w[1] / w[0] - 1.0).collect();

        let mut returns = Vec::with_capacity(close.len());
        returns.push(None);
        returns.extend(diffs.iter().map(|&r| r.is_finite().then_some(r)));

        let windows = TrailingWindows::new(&diffs, self.window, 1);
        let column = |stat: &dyn Fn(&[f64]) -> Option<f64>| -> Vec<Option<f64>> {
            windows.clone().map(|w| w.and_then(stat)).collect()
        };

        let vol = column(&sample_std_dev);
        let skew = column(&|w: &[f64]| (!flat_returns(w)).then(|| skewness(w)).flatten());
        let kurt = column(&|w: &[f64]| (!flat_returns(w)).then(|| excess_kurtosis(w)).flatten());
        let autocorr = AUTOCORR_LAGS.map(|lag| {
            column(&|w: &[f64]| {
                let n = w.len().checked_sub(lag)?;
                if flat_returns(&w[..n]) || flat_returns(&w[lag..]) {
                    return None;
                }
                autocorrelation(w, lag)
            })
        });

        debug!(
            rows = close.len(),
            window = self.window,
            full_windows = close.len().saturating_sub(self.window),
            "computed rolling features"
        );

        Ok(FeatureTable {
            index: prices.index().to_vec(),
            returns,
            volatility: vol,
            skewness: skew,
            kurtosis: kurt,
            autocorr,
            window: self.window,
        })
    }
}

/// Returns identical up to the rounding of `close[i] / close[i-1]`.
///
/// The ratio carries noise at the scale of `1 + r`, not of `r`.
fn flat_returns(returns: &[f64]) -> bool {
    is_flat(returns, 1.0 + max_abs(returns))
}

/// Compute rolling features for `prices` over `window` returns.
pub fn compute(prices: &PriceSeries, window: usize) -> Result<FeatureTable> {
    RollingFeatureComputer::new(window)?.compute(prices)
}
