//! Core data types for the OHLCV EDA toolkit.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Timestamp in milliseconds since Unix epoch (UTC).
pub type TimestampMs = i64;

const MINUTE_MS: i64 = 60_000;
const HOUR_MS: i64 = 60 * MINUTE_MS;
const DAY_MS: i64 = 24 * HOUR_MS;
const WEEK_MS: i64 = 7 * DAY_MS;

/// Convert a millisecond timestamp to a UTC datetime.
#[inline]
pub fn ts_to_datetime(ts_ms: TimestampMs) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ts_ms)
}

/// A single clean kline (OHLCV) row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Bucket open time (ms).
    pub open_time: TimestampMs,
    /// Open price.
    pub open: f64,
    /// High price.
    pub high: f64,
    /// Low price.
    pub low: f64,
    /// Close price.
    pub close: f64,
    /// Base asset volume.
    pub volume: f64,
    /// Quote asset volume.
    pub quote_asset_volume: f64,
    /// Number of trades in the interval.
    pub number_of_trades: f64,
    /// Taker buy volume in the base asset.
    pub taker_buy_base_asset_volume: f64,
    /// Taker buy volume in the quote asset.
    pub taker_buy_quote_asset_volume: f64,
}

impl Candle {
    /// Names of the numeric columns, in [`Candle::numeric_values`] order.
    pub const NUMERIC_COLUMNS: [&'static str; 9] = [
        "open",
        "high",
        "low",
        "close",
        "volume",
        "quote_asset_volume",
        "number_of_trades",
        "taker_buy_base_asset_volume",
        "taker_buy_quote_asset_volume",
    ];

    /// Numeric columns as an array.
    pub fn numeric_values(&self) -> [f64; 9] {
        [
            self.open,
            self.high,
            self.low,
            self.close,
            self.volume,
            self.quote_asset_volume,
            self.number_of_trades,
            self.taker_buy_base_asset_volume,
            self.taker_buy_quote_asset_volume,
        ]
    }

    /// Open time as a UTC datetime.
    pub fn open_datetime(&self) -> Option<DateTime<Utc>> {
        ts_to_datetime(self.open_time)
    }
}

/// Closing prices indexed by strictly increasing timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    index: Vec<TimestampMs>,
    close: Vec<f64>,
}

impl PriceSeries {
    /// Build a series from parallel index and price vectors.
    ///
    /// Rejects mismatched lengths, non-finite prices and timestamps that are
    /// not strictly increasing.
    pub fn new(index: Vec<TimestampMs>, close: Vec<f64>) -> Result<Self> {
        if index.len() != close.len() {
            return Err(Error::data(format!(
                "index has {} entries but close has {}",
                index.len(),
                close.len()
            )));
        }
        if let Some(pos) = close.iter().position(|p| !p.is_finite()) {
            return Err(Error::data(format!("non-finite close at row {pos}")));
        }
        if let Some(pos) = index.windows(2).position(|w| w[1] <= w[0]) {
            return Err(Error::data(format!(
                "timestamps not strictly increasing at row {}",
                pos + 1
            )));
        }
        Ok(Self { index, close })
    }

    /// Build a series from the closes of sorted candles.
    pub fn from_candles(candles: &[Candle]) -> Result<Self> {
        Self::new(
            candles.iter().map(|c| c.open_time).collect(),
            candles.iter().map(|c| c.close).collect(),
        )
    }

    /// Timestamps.
    pub fn index(&self) -> &[TimestampMs] {
        &self.index
    }

    /// Closing prices.
    pub fn close(&self) -> &[f64] {
        &self.close
    }

    pub fn len(&self) -> usize {
        self.close.len()
    }

    pub fn is_empty(&self) -> bool {
        self.close.is_empty()
    }
}

/// Fixed-width resampling frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    Minutes(u32),
    Hours(u32),
    Days(u32),
    /// Epoch-aligned, so weeks start on Thursday 00:00 UTC (not pandas W-SUN).
    Weeks(u32),
}

impl Frequency {
    /// Bucket width in milliseconds.
    pub fn width_ms(self) -> i64 {
        match self {
            Frequency::Minutes(n) => n as i64 * MINUTE_MS,
            Frequency::Hours(n) => n as i64 * HOUR_MS,
            Frequency::Days(n) => n as i64 * DAY_MS,
            Frequency::Weeks(n) => n as i64 * WEEK_MS,
        }
    }

    /// Start of the bucket containing `ts_ms`, aligned to the epoch.
    #[inline]
    pub fn bucket_start(self, ts_ms: TimestampMs) -> TimestampMs {
        ts_ms.div_euclid(self.width_ms()) * self.width_ms()
    }
}

impl FromStr for Frequency {
    type Err = Error;

    /// Parse aliases such as `"15min"`, `"T"`, `"4H"`, `"1h"`, `"D"`, `"W"`.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let split = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
        let (digits, unit) = s.split_at(split);

        let multiple = if digits.is_empty() {
            1
        } else {
            digits
                .parse::<u32>()
                .map_err(|_| Error::parse(format!("invalid frequency multiple in {s:?}")))?
        };
        if multiple == 0 {
            return Err(Error::parse(format!("frequency multiple must be positive: {s:?}")));
        }

        match unit {
            "min" | "T" => Ok(Frequency::Minutes(multiple)),
            "H" | "h" => Ok(Frequency::Hours(multiple)),
            "D" | "d" => Ok(Frequency::Days(multiple)),
            "W" | "w" => Ok(Frequency::Weeks(multiple)),
            _ => Err(Error::parse(format!("unknown frequency alias {s:?}"))),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frequency::Minutes(n) => write!(f, "{n}min"),
            Frequency::Hours(n) => write!(f, "{n}H"),
            Frequency::Days(n) => write!(f, "{n}D"),
            Frequency::Weeks(n) => write!(f, "{n}W"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_price_series_rejects_unsorted_index() {
        let err = PriceSeries::new(vec![0, 60_000, 60_000], vec![1.0, 2.0, 3.0]);
        assert!(matches!(err, Err(Error::Data(_))));
    }

    #[test]
    fn test_price_series_rejects_length_mismatch() {
        assert!(PriceSeries::new(vec![0, 1], vec![1.0]).is_err());
    }

    #[test]
    fn test_price_series_rejects_nan() {
        assert!(PriceSeries::new(vec![0, 1], vec![1.0, f64::NAN]).is_err());
    }

    #[test]
    fn test_frequency_parse() {
        assert_eq!("15min".parse::<Frequency>().unwrap(), Frequency::Minutes(15));
        assert_eq!("T".parse::<Frequency>().unwrap(), Frequency::Minutes(1));
        assert_eq!("4H".parse::<Frequency>().unwrap(), Frequency::Hours(4));
        assert_eq!("h".parse::<Frequency>().unwrap(), Frequency::Hours(1));
        assert_eq!("1D".parse::<Frequency>().unwrap(), Frequency::Days(1));
        assert_eq!("W".parse::<Frequency>().unwrap(), Frequency::Weeks(1));
        assert!("0H".parse::<Frequency>().is_err());
        assert!("5s".parse::<Frequency>().is_err());
    }

    #[test]
    fn test_bucket_start() {
        // 2024-01-01 00:01:30.500 -> 2024-01-01 00:00:00.000
        let ts = 1704067290500i64;
        assert_eq!(Frequency::Hours(1).bucket_start(ts), 1704067200000);
        assert_eq!(Frequency::Minutes(1).bucket_start(ts), 1704067260000);
    }

    #[test]
    fn test_weekly_bucket_starts_thursday() {
        // 2024-01-01 is a Monday; its bucket opens Thursday 2023-12-28
        let ts = 1704067200000i64;
        let start = Frequency::Weeks(1).bucket_start(ts);
        assert_eq!(start, 1703721600000);
        assert_eq!(ts_to_datetime(start).unwrap().weekday(), chrono::Weekday::Thu);
        assert_eq!(Frequency::Weeks(1).bucket_start(start + WEEK_MS - 1), start);
    }

    #[test]
    fn test_frequency_display_round_trips() {
        let freq = Frequency::Hours(4);
        assert_eq!(freq.to_string().parse::<Frequency>().unwrap(), freq);
    }
}
