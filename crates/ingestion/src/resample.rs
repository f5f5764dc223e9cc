//! Resampling candles into coarser time buckets.
//!
//! Aggregates OHLCV rows into fixed-width buckets aligned to the Unix epoch:
//! open = first, high = max, low = min, close = last, volumes summed.

use eda_core::{Candle, Frequency, TimestampMs};
use std::collections::BTreeMap;
use tracing::debug;

/// A bucket that's currently being aggregated.
#[derive(Debug, Clone)]
struct BucketInProgress {
    open_time: TimestampMs,
    /// Open time of the row that set `open`.
    first_ts: TimestampMs,
    /// Open time of the row that set `close`.
    last_ts: TimestampMs,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
    quote_asset_volume: f64,
    number_of_trades: f64,
    taker_buy_base_asset_volume: f64,
    taker_buy_quote_asset_volume: f64,
}

impl BucketInProgress {
    fn new(open_time: TimestampMs, candle: &Candle) -> Self {
        Self {
            open_time,
            first_ts: candle.open_time,
            last_ts: candle.open_time,
            open: candle.open,
            high: candle.high,
            low: candle.low,
            close: candle.close,
            volume: candle.volume,
            quote_asset_volume: candle.quote_asset_volume,
            number_of_trades: candle.number_of_trades,
            taker_buy_base_asset_volume: candle.taker_buy_base_asset_volume,
            taker_buy_quote_asset_volume: candle.taker_buy_quote_asset_volume,
        }
    }

    fn add(&mut self, candle: &Candle) {
        if candle.open_time < self.first_ts {
            self.first_ts = candle.open_time;
            self.open = candle.open;
        }
        if candle.open_time >= self.last_ts {
            self.last_ts = candle.open_time;
            self.close = candle.close;
        }
        self.high = self.high.max(candle.high);
        self.low = self.low.min(candle.low);
        self.volume += candle.volume;
        self.quote_asset_volume += candle.quote_asset_volume;
        self.number_of_trades += candle.number_of_trades;
        self.taker_buy_base_asset_volume += candle.taker_buy_base_asset_volume;
        self.taker_buy_quote_asset_volume += candle.taker_buy_quote_asset_volume;
    }

    fn to_candle(&self) -> Candle {
        Candle {
            open_time: self.open_time,
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            volume: self.volume,
            quote_asset_volume: self.quote_asset_volume,
            number_of_trades: self.number_of_trades,
            taker_buy_base_asset_volume: self.taker_buy_base_asset_volume,
            taker_buy_quote_asset_volume: self.taker_buy_quote_asset_volume,
        }
    }
}

/// Resample candles to `freq`.
///
/// Input order does not matter; first/last are decided by open time. Empty
/// buckets are not emitted and the output is sorted by bucket start.
pub fn resample(candles: &[Candle], freq: Frequency) -> Vec<Candle> {
    let mut buckets: BTreeMap<TimestampMs, BucketInProgress> = BTreeMap::new();

    for candle in candles {
        let start = freq.bucket_start(candle.open_time);
        buckets
            .entry(start)
            .and_modify(|b| b.add(candle))
            .or_insert_with(|| BucketInProgress::new(start, candle));
    }

    debug!(
        input = candles.len(),
        buckets = buckets.len(),
        %freq,
        "resampled candles"
    );

    buckets.values().map(BucketInProgress::to_candle).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const HOUR: i64 = 3_600_000;

    fn make_candle(open_time: i64, open: f64, high: f64, low: f64, close: f64) -> Candle {
        Candle {
            open_time,
            open,
            high,
            low,
            close,
            volume: 1.0,
            quote_asset_volume: close,
            number_of_trades: 3.0,
            taker_buy_base_asset_volume: 0.5,
            taker_buy_quote_asset_volume: close / 2.0,
        }
    }

    #[test]
    fn test_single_bucket_aggregation() {
        let candles = vec![
            make_candle(0, 100.0, 105.0, 99.0, 104.0),
            make_candle(60_000, 104.0, 110.0, 103.0, 108.0),
            make_candle(120_000, 108.0, 109.0, 95.0, 97.0),
        ];

        let out = resample(&candles, Frequency::Hours(1));

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].open_time, 0);
        assert_relative_eq!(out[0].open, 100.0);
        assert_relative_eq!(out[0].high, 110.0);
        assert_relative_eq!(out[0].low, 95.0);
        assert_relative_eq!(out[0].close, 97.0);
        assert_relative_eq!(out[0].volume, 3.0);
        assert_relative_eq!(out[0].number_of_trades, 9.0);
    }

    #[test]
    fn test_multiple_buckets_skip_empty() {
        let candles = vec![
            make_candle(10 * 60_000, 1.0, 2.0, 0.5, 1.5),
            make_candle(2 * HOUR + 5 * 60_000, 3.0, 4.0, 2.5, 3.5),
        ];

        let out = resample(&candles, Frequency::Hours(1));

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].open_time, 0);
        assert_eq!(out[1].open_time, 2 * HOUR);
    }

    #[test]
    fn test_unsorted_input_uses_time_order() {
        let candles = vec![
            make_candle(120_000, 108.0, 109.0, 95.0, 97.0),
            make_candle(0, 100.0, 105.0, 99.0, 104.0),
        ];

        let out = resample(&candles, Frequency::Minutes(15));

        assert_eq!(out.len(), 1);
        assert_relative_eq!(out[0].open, 100.0);
        assert_relative_eq!(out[0].close, 97.0);
    }

    #[test]
    fn test_daily_buckets() {
        let day = 24 * HOUR;
        let candles: Vec<_> = (0..48)
            .map(|h| make_candle(h * HOUR, h as f64, h as f64 + 1.0, h as f64 - 1.0, h as f64))
            .collect();

        let out = resample(&candles, Frequency::Days(1));

        assert_eq!(out.len(), 2);
        assert_eq!(out[1].open_time, day);
        assert_relative_eq!(out[0].close, 23.0);
        assert_relative_eq!(out[1].open, 24.0);
        assert_relative_eq!(out[1].low, 23.0);
    }

    #[test]
    fn test_weekly_buckets() {
        let day = 24 * HOUR;
        // Daily rows from Thursday 1970-01-01 through the following Friday
        let candles: Vec<_> = (0..9)
            .map(|d| make_candle(d * day, d as f64, d as f64, d as f64, d as f64))
            .collect();

        let out = resample(&candles, Frequency::Weeks(1));

        assert_eq!(out.len(), 2);
        assert_eq!(out[1].open_time, 7 * day);
        assert_relative_eq!(out[0].close, 6.0);
        assert_relative_eq!(out[1].open, 7.0);
        assert_relative_eq!(out[1].volume, 2.0);
    }

    #[test]
    fn test_empty_input() {
        assert!(resample(&[], Frequency::Days(1)).is_empty());
    }
}
