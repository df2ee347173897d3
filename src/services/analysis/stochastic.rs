//! Stochastic Oscillator (%K / %D) indicator.

use crate::types::Candle;

/// %K and %D values in [0, 100].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StochasticOutput {
    pub k: f64,
    pub d: f64,
}

/// Raw stochastic %K over the trailing `period` candles:
/// `(close - lowest_low) / (highest_high - lowest_low) * 100`.
///
/// %D mirrors %K; no smoothing pass is applied. Returns a neutral
/// `(50, 50)` when fewer than `period` candles are available or the
/// window has zero range.
pub fn stochastic(candles: &[Candle], period: usize) -> StochasticOutput {
    if candles.len() < period {
        return StochasticOutput { k: 50.0, d: 50.0 };
    }

    let window = &candles[candles.len() - period..];
    let highest_high = window.iter().map(|c| c.high).fold(f64::MIN, f64::max);
    let lowest_low = window.iter().map(|c| c.low).fold(f64::MAX, f64::min);

    let close = candles[candles.len() - 1].close;
    let range = highest_high - lowest_low;

    let k = if range == 0.0 {
        50.0
    } else {
        ((close - lowest_low) / range * 100.0).clamp(0.0, 100.0)
    };

    StochasticOutput { k, d: k }
}
