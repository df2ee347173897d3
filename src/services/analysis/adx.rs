//! ADX-style directional-movement strength score.

use crate::types::Candle;

/// Simplified trend-strength score in [0, 100].
///
/// Accumulates +DM, -DM and true range over the trailing `period`
/// candles, then returns `|+DI - -DI| / (+DI + -DI) * 100`. There is no
/// Wilder smoothing across periods, so treat this as a proprietary
/// trend-strength score rather than a textbook ADX.
///
/// Returns `20.0` (weak trend) when fewer than `period + 1` candles are
/// available.
pub fn adx(candles: &[Candle], period: usize) -> f64 {
    if candles.len() < period + 1 {
        return 20.0;
    }

    let mut plus_dm = 0.0;
    let mut minus_dm = 0.0;
    let mut true_range = 0.0;

    for i in candles.len() - period..candles.len() {
        let curr = &candles[i];
        let prev = &candles[i - 1];

        let up_move = curr.high - prev.high;
        let down_move = prev.low - curr.low;

        if up_move > down_move && up_move > 0.0 {
            plus_dm += up_move;
        }
        if down_move > up_move && down_move > 0.0 {
            minus_dm += down_move;
        }

        true_range += (curr.high - curr.low)
            .max((curr.high - prev.close).abs())
            .max((curr.low - prev.close).abs());
    }

    let avg_tr = true_range / period as f64;
    if avg_tr == 0.0 {
        // Perfectly flat window: no movement in either direction.
        return 0.0;
    }

    let plus_di = plus_dm / (avg_tr * period as f64) * 100.0;
    let minus_di = minus_dm / (avg_tr * period as f64) * 100.0;

    let denom = plus_di + minus_di;
    let dx = (plus_di - minus_di).abs() / if denom == 0.0 { 1.0 } else { denom };

    (dx * 100.0).min(100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candle(high: f64, low: f64, close: f64) -> Candle {
        Candle {
            timestamp: 0,
            open: close,
            high,
            low,
            close,
            volume: 1000.0,
        }
    }

    fn trending_up(count: usize) -> Vec<Candle> {
        (0..count)
            .map(|i| {
                let base = 100.0 + i as f64 * 2.0;
                candle(base + 1.5, base - 0.5, base + 1.0)
            })
            .collect()
    }

    #[test]
    fn test_adx_insufficient_data_default() {
        let candles = trending_up(14);
        assert_eq!(adx(&candles, 14), 20.0);
    }

    #[test]
    fn test_adx_strong_uptrend_high_score() {
        let candles = trending_up(30);
        let value = adx(&candles, 14);
        assert!(value > 90.0, "one-sided movement should score near 100, got {}", value);
    }

    #[test]
    fn test_adx_strong_downtrend_high_score() {
        let candles: Vec<Candle> = (0..30)
            .map(|i| {
                let base = 300.0 - i as f64 * 2.0;
                candle(base + 0.5, base - 1.5, base - 1.0)
            })
            .collect();
        let value = adx(&candles, 14);
        assert!(value > 90.0, "got {}", value);
    }

    #[test]
    fn test_adx_choppy_market_low_score() {
        // Alternate up and down moves of equal size.
        let candles: Vec<Candle> = (0..30)
            .map(|i| {
                let offset = if i % 2 == 0 { 2.0 } else { -2.0 };
                let base = 100.0 + offset;
                candle(base + 1.0, base - 1.0, base)
            })
            .collect();
        let value = adx(&candles, 14);
        assert!(value < 40.0, "balanced movement should score low, got {}", value);
    }

    #[test]
    fn test_adx_flat_window_zero() {
        let candles: Vec<Candle> = (0..20).map(|_| candle(1.0, 1.0, 1.0)).collect();
        assert_eq!(adx(&candles, 14), 0.0);
    }

    #[test]
    fn test_adx_bounds() {
        let candles = trending_up(50);
        let value = adx(&candles, 14);
        assert!((0.0..=100.0).contains(&value));
    }
}
