use serde::{Deserialize, Serialize};

/// Trend classification derived from moving-average posture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Trend {
    Bullish,
    Bearish,
    Neutral,
}

/// Momentum strength bucketed from the ADX trend-strength score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Momentum {
    Strong,
    Moderate,
    Weak,
}

/// Volume conviction: recent volume spiking above its historical mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VolumeSignal {
    Strong,
    Weak,
}

/// Position of the current price inside the recent trading range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriceLevel {
    Support,
    Resistance,
    Neutral,
}

/// Snapshot of all technical indicators for one candle sequence.
///
/// Created fresh on every analysis call and embedded into the persisted
/// signal row as JSON. Has no lifecycle of its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalMetrics {
    pub rsi: f64,
    pub macd_line: f64,
    pub macd_signal: f64,
    pub macd_histogram: f64,
    pub sma20: f64,
    pub sma50: f64,
    pub ema12: f64,
    pub ema26: f64,
    pub stochastic_k: f64,
    pub stochastic_d: f64,
    pub adx: f64,
    /// ATR-style average true range over the trailing 14 candles.
    pub volatility: f64,
    pub trend: Trend,
    pub momentum: Momentum,
    pub volume_signal: VolumeSignal,
    pub price_level: PriceLevel,
}

impl TechnicalMetrics {
    /// Default-neutral snapshot used when fewer than 26 candles are
    /// available. All moving averages collapse to the last close.
    pub fn neutral(last_close: f64) -> Self {
        Self {
            rsi: 50.0,
            macd_line: 0.0,
            macd_signal: 0.0,
            macd_histogram: 0.0,
            sma20: last_close,
            sma50: last_close,
            ema12: last_close,
            ema26: last_close,
            stochastic_k: 50.0,
            stochastic_d: 50.0,
            adx: 20.0,
            volatility: 0.0,
            trend: Trend::Neutral,
            momentum: Momentum::Weak,
            volume_signal: VolumeSignal::Weak,
            price_level: PriceLevel::Neutral,
        }
    }
}
