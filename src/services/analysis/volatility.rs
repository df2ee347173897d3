//! ATR-style volatility measure.

use crate::types::Candle;

const PERIOD: usize = 14;

/// Average true range over the trailing 14 candles.
///
/// Feeds the stop-loss/take-profit bands on generated signals. Returns
/// `0.0` when fewer than 15 candles are available.
pub fn volatility(candles: &[Candle]) -> f64 {
    if candles.len() < PERIOD + 1 {
        return 0.0;
    }

    let mut true_range = 0.0;

    for i in candles.len() - PERIOD..candles.len() {
        let curr = &candles[i];
        let prev = &candles[i - 1];

        true_range += (curr.high - curr.low)
            .max((curr.high - prev.close).abs())
            .max((curr.low - prev.close).abs());
    }

    true_range / PERIOD as f64
}
