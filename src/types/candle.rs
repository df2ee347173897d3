use serde::{Deserialize, Serialize};

/// One M5 (5-minute) OHLCV candle for a currency pair.
///
/// Produced by a candle source in ascending timestamp order, spaced by
/// the bucket width. The analysis engine does not validate the OHLC
/// invariants; malformed input degrades silently.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Bucket open time in epoch seconds.
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candle_serialization_roundtrip() {
        let candle = Candle {
            timestamp: 1_700_000_100,
            open: 1.0850,
            high: 1.0862,
            low: 1.0844,
            close: 1.0858,
            volume: 1200.0,
        };

        let json = serde_json::to_string(&candle).unwrap();
        let back: Candle = serde_json::from_str(&json).unwrap();
        assert_eq!(back, candle);
    }

    #[test]
    fn test_candle_fields() {
        let candle = Candle {
            timestamp: 0,
            open: 1.0,
            high: 2.0,
            low: 0.5,
            close: 1.5,
            volume: 800.0,
        };

        assert!(candle.high >= candle.open.max(candle.close));
        assert!(candle.low <= candle.open.min(candle.close));
    }
}
