//! Raw kline cleaning and typing.
//!
//! Turns string-typed kline records into clean, time-sorted candles: parses
//! timestamps, coerces numeric columns, drops incomplete rows and derives log
//! returns.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use eda_core::{config::PreprocessConfig, Candle, Error, Result, TimestampMs};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// A kline record as read from a dump, before typing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawKline {
    pub open_time: String,
    pub open: String,
    pub high: String,
    pub low: String,
    pub close: String,
    pub volume: String,
    pub quote_asset_volume: String,
    pub number_of_trades: String,
    pub taker_buy_base_asset_volume: String,
    pub taker_buy_quote_asset_volume: String,
}

/// Statistics about a preprocessing pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreprocessStats {
    /// Records received.
    pub total_records: u64,
    /// Rows dropped because the timestamp did not parse.
    pub dropped_bad_timestamp: u64,
    /// Rows dropped because a numeric column was missing or malformed.
    pub dropped_bad_numeric: u64,
    /// Rows dropped because their timestamp repeated an earlier row.
    pub duplicates_removed: u64,
    /// Clean rows emitted.
    pub emitted: u64,
}

impl PreprocessStats {
    /// Total rows dropped for any reason.
    pub fn dropped(&self) -> u64 {
        self.dropped_bad_timestamp + self.dropped_bad_numeric + self.duplicates_removed
    }
}

/// Output of [`Preprocessor::process`].
#[derive(Debug, Clone)]
pub struct Preprocessed {
    /// Clean candles sorted by open time.
    pub candles: Vec<Candle>,
    /// `ln(close[i] / close[i-1])`, aligned with `candles`.
    pub log_returns: Vec<Option<f64>>,
    pub stats: PreprocessStats,
}

/// Cleans raw klines into the series consumed by feature computation.
pub struct Preprocessor {
    config: PreprocessConfig,
}

impl Preprocessor {
    pub fn new(config: PreprocessConfig) -> Self {
        Self { config }
    }

    /// Clean a batch of raw records.
    ///
    /// Fails with `EmptyInput` when no row survives cleaning.
    pub fn process(&self, records: &[RawKline]) -> Result<Preprocessed> {
        let mut stats = PreprocessStats {
            total_records: records.len() as u64,
            ..Default::default()
        };

        let mut candles = Vec::with_capacity(records.len());
        for record in records {
            let Some(open_time) = parse_timestamp(&record.open_time) else {
                stats.dropped_bad_timestamp += 1;
                continue;
            };
            match type_record(open_time, record) {
                Some(candle) => candles.push(candle),
                None => stats.dropped_bad_numeric += 1,
            }
        }

        // Stable, so duplicates keep their input order
        candles.sort_by_key(|c| c.open_time);

        if self.config.dedupe_timestamps {
            let before = candles.len();
            candles.dedup_by_key(|c| c.open_time);
            stats.duplicates_removed = (before - candles.len()) as u64;
        }

        stats.emitted = candles.len() as u64;
        if stats.dropped() > 0 {
            warn!(
                bad_timestamp = stats.dropped_bad_timestamp,
                bad_numeric = stats.dropped_bad_numeric,
                duplicates = stats.duplicates_removed,
                "dropped kline rows during preprocessing"
            );
        }
        if candles.is_empty() {
            return Err(Error::empty_input(format!(
                "no clean rows out of {} records",
                stats.total_records
            )));
        }
        debug!(emitted = stats.emitted, "preprocessed klines");

        let log_returns = log_returns(&candles);
        Ok(Preprocessed {
            candles,
            log_returns,
            stats,
        })
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new(PreprocessConfig::default())
    }
}

/// Parse a kline timestamp.
///
/// Accepts integer epoch milliseconds, RFC 3339, `%Y-%m-%d %H:%M:%S[.f]` and
/// bare `%Y-%m-%d` (the last two read as UTC).
pub fn parse_timestamp(raw: &str) -> Option<TimestampMs> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(ms) = raw.parse::<i64>() {
        return Some(ms);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.timestamp_millis());
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc().timestamp_millis());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().timestamp_millis())
}

/// Coerce a numeric field; malformed or non-finite values are missing.
pub fn coerce_numeric(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn type_record(open_time: TimestampMs, record: &RawKline) -> Option<Candle> {
    Some(Candle {
        open_time,
        open: coerce_numeric(&record.open)?,
        high: coerce_numeric(&record.high)?,
        low: coerce_numeric(&record.low)?,
        close: coerce_numeric(&record.close)?,
        volume: coerce_numeric(&record.volume)?,
        quote_asset_volume: coerce_numeric(&record.quote_asset_volume)?,
        number_of_trades: coerce_numeric(&record.number_of_trades)?,
        taker_buy_base_asset_volume: coerce_numeric(&record.taker_buy_base_asset_volume)?,
        taker_buy_quote_asset_volume: coerce_numeric(&record.taker_buy_quote_asset_volume)?,
    })
}

/// Log returns of consecutive closes; missing at row 0 and around
/// non-positive prices.
pub fn log_returns(candles: &[Candle]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(candles.len());
    if candles.is_empty() {
        return out;
    }
    out.push(None);
    out.extend(candles.windows(2).map(|w| {
        let (prev, curr) = (w[0].close, w[1].close);
        (prev > 0.0 && curr > 0.0).then(|| (curr / prev).ln())
    }));
    out
}
