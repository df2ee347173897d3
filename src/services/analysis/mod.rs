//! Indicator engine: pure technical-analysis functions over M5 candles.
//!
//! Every function is total and deterministic; insufficient data degrades
//! to a documented neutral default instead of failing. Input candles are
//! expected oldest to newest, spaced by the bucket width — this is not
//! validated here, and violating it degrades the output silently.

pub mod adx;
pub mod ema;
pub mod macd;
pub mod price_level;
pub mod rsi;
pub mod sma;
pub mod stochastic;
pub mod volatility;
pub mod volume;

pub use adx::adx;
pub use ema::ema;
pub use macd::{macd, MacdOutput};
pub use price_level::price_level;
pub use rsi::rsi;
pub use sma::sma;
pub use stochastic::{stochastic, StochasticOutput};
pub use volatility::volatility;
pub use volume::volume_signal;

use crate::types::{Candle, Momentum, TechnicalMetrics, Trend};

/// Minimum candles required for a full analysis; below this the neutral
/// fallback snapshot is returned.
pub const MIN_CANDLES: usize = 26;

/// Runs every indicator over the candle sequence and classifies trend
/// and momentum.
///
/// Trend is Bullish when `close > sma20 > sma50` with `ema12 > ema26`
/// and `close > ema12`; the mirrored condition is Bearish; anything
/// else is Neutral. Momentum buckets the ADX score: Strong above 40,
/// Moderate above 25, Weak otherwise.
///
/// Never fails: with fewer than [`MIN_CANDLES`] candles a default
/// neutral snapshot anchored at the last close is returned. Callers
/// that care about output quality must check the candle count first.
pub fn analyze(candles: &[Candle]) -> TechnicalMetrics {
    if candles.len() < MIN_CANDLES {
        let last_close = candles.last().map(|c| c.close).unwrap_or(0.0);
        return TechnicalMetrics::neutral(last_close);
    }

    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    let close = *closes.last().unwrap();

    let rsi = rsi(&closes, 14);
    let macd = macd(&closes);
    let sma20 = sma(&closes, 20);
    let sma50 = sma(&closes, 50);
    let ema12 = ema(&closes, 12);
    let ema26 = ema(&closes, 26);
    let stochastic = stochastic(candles, 14);
    let adx = adx(candles, 14);
    let volume_signal = volume_signal(candles);
    let volatility = volatility(candles);
    let price_level = price_level(candles, close);

    let sma_bullish = close > sma20 && sma20 > sma50;
    let ema_bullish = ema12 > ema26 && close > ema12;

    let trend = if sma_bullish && ema_bullish {
        Trend::Bullish
    } else if close < sma20 && sma20 < sma50 && ema12 < ema26 && close < ema12 {
        Trend::Bearish
    } else {
        Trend::Neutral
    };

    let momentum = if adx > 40.0 {
        Momentum::Strong
    } else if adx > 25.0 {
        Momentum::Moderate
    } else {
        Momentum::Weak
    };

    TechnicalMetrics {
        rsi,
        macd_line: macd.line,
        macd_signal: macd.signal,
        macd_histogram: macd.histogram,
        sma20,
        sma50,
        ema12,
        ema26,
        stochastic_k: stochastic.k,
        stochastic_d: stochastic.d,
        adx,
        volatility,
        trend,
        momentum,
        volume_signal,
        price_level,
    }
}
