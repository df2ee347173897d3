//! Support/resistance zone detection.

use crate::types::{Candle, PriceLevel};

/// Classifies the current price inside the trailing 20-candle range:
/// the bottom 35% of the range is a support zone (likely bounce up),
/// the top 35% a resistance zone (likely bounce down).
///
/// Returns `Neutral` when fewer than 20 candles are available.
pub fn price_level(candles: &[Candle], current_price: f64) -> PriceLevel {
    if candles.len() < 20 {
        return PriceLevel::Neutral;
    }

    let recent = &candles[candles.len() - 20..];
    let min_low = recent.iter().map(|c| c.low).fold(f64::MAX, f64::min);
    let max_high = recent.iter().map(|c| c.high).fold(f64::MIN, f64::max);
    let range = max_high - min_low;

    if current_price < min_low + range * 0.35 {
        PriceLevel::Support
    } else if current_price > max_high - range * 0.35 {
        PriceLevel::Resistance
    } else {
        PriceLevel::Neutral
    }
}
