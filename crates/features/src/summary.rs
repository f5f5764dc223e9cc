//! Descriptive statistics for candle columns.

use crate::stats::{pearson, sample_std_dev};
use eda_core::Candle;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Describe-style summary of one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSummary {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; `None` with fewer than two values.
    pub std: Option<f64>,
    pub min: f64,
    /// 25th percentile.
    pub p25: f64,
    /// Median.
    pub p50: f64,
    /// 75th percentile.
    pub p75: f64,
    pub max: f64,
}

/// Summarize a column. Returns `None` for an empty column.
pub fn describe(values: &[f64]) -> Option<ColumnSummary> {
    if values.is_empty() {
        return None;
    }

    let mut sorted: Vec<OrderedFloat<f64>> = values.iter().copied().map(OrderedFloat).collect();
    sorted.sort_unstable();
    let sorted: Vec<f64> = sorted.into_iter().map(OrderedFloat::into_inner).collect();

    Some(ColumnSummary {
        count: values.len(),
        mean: values.iter().mean(),
        std: sample_std_dev(values),
        min: sorted[0],
        p25: quantile_sorted(&sorted, 0.25),
        p50: quantile_sorted(&sorted, 0.50),
        p75: quantile_sorted(&sorted, 0.75),
        max: sorted[sorted.len() - 1],
    })
}

/// Linear-interpolation quantile of non-empty sorted values.
fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

fn columns(candles: &[Candle]) -> Vec<Vec<f64>> {
    let mut cols = vec![Vec::with_capacity(candles.len()); Candle::NUMERIC_COLUMNS.len()];
    for candle in candles {
        for (col, value) in cols.iter_mut().zip(candle.numeric_values()) {
            col.push(value);
        }
    }
    cols
}

/// Summaries of every numeric candle column, keyed by column name.
pub fn describe_candles(candles: &[Candle]) -> Vec<(&'static str, ColumnSummary)> {
    Candle::NUMERIC_COLUMNS
        .iter()
        .zip(columns(candles))
        .filter_map(|(&name, col)| describe(&col).map(|s| (name, s)))
        .collect()
}

/// Pairwise Pearson correlations between numeric candle columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    /// Row-major; `None` where a column has zero variance.
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    /// Correlation between two named columns.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        self.values[i][j]
    }
}

/// Correlation matrix over the numeric candle columns.
pub fn correlation_matrix(candles: &[Candle]) -> CorrelationMatrix {
    let cols = columns(candles);
    let n = cols.len();
    let mut values = vec![vec![None; n]; n];

    for i in 0..n {
        for j in i..n {
            let r = pearson(&cols[i], &cols[j]).map(|r| if i == j { 1.0 } else { r });
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    CorrelationMatrix {
        columns: Candle::NUMERIC_COLUMNS.iter().map(|c| c.to_string()).collect(),
        values,
    }
}
