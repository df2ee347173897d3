//! Weighted-consensus signal decision engine.
//!
//! Converts a [`TechnicalMetrics`] snapshot into a CALL/PUT/WAIT verdict
//! with a confidence percentage. Each indicator contributes points to a
//! bullish or bearish accumulator when it agrees with that reading; no
//! single indicator is mandatory. Pure and deterministic.

use crate::types::{PriceLevel, SignalType, TechnicalMetrics, Trend, VolumeSignal};
use serde::{Deserialize, Serialize};

/// Weight table and thresholds for the consensus rule.
///
/// Externalized so the decision policy can be tuned and tested
/// independently of the indicator math. The defaults are the adopted
/// reference table:
///
/// - trend alignment 4 (the core signal)
/// - MACD 3, RSI healthy band 3, support/resistance confluence 3
/// - ADX trend strength 3/2/1 by band
/// - stochastic confirmation 2, volume spike bonus 2
///
/// Maximum attainable score is 20; `min_score` 4 admits a bare
/// trend + MACD consensus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionPolicy {
    pub trend_weight: u32,
    pub macd_weight: u32,
    pub rsi_weight: u32,
    pub adx_strong_weight: u32,
    pub adx_moderate_weight: u32,
    pub adx_weak_weight: u32,
    pub level_weight: u32,
    pub stochastic_weight: u32,
    pub volume_weight: u32,
    /// Minimum accumulator score for a directional verdict.
    pub min_score: u32,
    /// Maximum attainable score under this table; anchors the
    /// confidence interpolation.
    pub max_score: u32,
    /// Minimum absolute MACD histogram for the MACD vote to count.
    pub macd_histogram_min: f64,
}

impl Default for DecisionPolicy {
    fn default() -> Self {
        Self {
            trend_weight: 4,
            macd_weight: 3,
            rsi_weight: 3,
            adx_strong_weight: 3,
            adx_moderate_weight: 2,
            adx_weak_weight: 1,
            level_weight: 3,
            stochastic_weight: 2,
            volume_weight: 2,
            min_score: 4,
            max_score: 20,
            macd_histogram_min: 0.001,
        }
    }
}

/// Outcome of one consensus evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    /// None means WAIT.
    pub direction: Option<SignalType>,
    /// 0 for WAIT, otherwise 70-99.
    pub confidence: u8,
    pub bullish_score: u32,
    pub bearish_score: u32,
}

impl DecisionPolicy {
    /// Applies the weighted consensus to a metrics snapshot.
    ///
    /// A direction is emitted when its accumulator reaches `min_score`
    /// and strictly beats the opposing accumulator; confidence
    /// interpolates linearly from `min_score` (70%) to `max_score`
    /// (99%) and is monotone in the winning score.
    pub fn decide(&self, metrics: &TechnicalMetrics) -> Verdict {
        let mut bullish: u32 = 0;
        let mut bearish: u32 = 0;

        // 1. MACD direction
        if metrics.macd_histogram > self.macd_histogram_min
            && metrics.macd_line > metrics.macd_signal
        {
            bullish += self.macd_weight;
        } else if metrics.macd_histogram < -self.macd_histogram_min
            && metrics.macd_line < metrics.macd_signal
        {
            bearish += self.macd_weight;
        }

        // 2. Trend alignment (SMA + EMA posture)
        match metrics.trend {
            Trend::Bullish => bullish += self.trend_weight,
            Trend::Bearish => bearish += self.trend_weight,
            Trend::Neutral => {}
        }

        // 3. RSI momentum validation: a healthy band, not an extreme
        if metrics.rsi > 55.0 && metrics.rsi < 75.0 {
            bullish += self.rsi_weight;
        } else if metrics.rsi < 45.0 && metrics.rsi > 25.0 {
            bearish += self.rsi_weight;
        }

        // 4. ADX trend strength, credited to the trend's side only
        let adx_weight = if metrics.adx > 35.0 {
            self.adx_strong_weight
        } else if metrics.adx > 25.0 {
            self.adx_moderate_weight
        } else if metrics.adx > 20.0 {
            self.adx_weak_weight
        } else {
            0
        };
        match metrics.trend {
            Trend::Bullish => bullish += adx_weight,
            Trend::Bearish => bearish += adx_weight,
            Trend::Neutral => {}
        }

        // 5. Support/resistance bounce confluence
        if metrics.trend == Trend::Bullish && metrics.price_level == PriceLevel::Support {
            bullish += self.level_weight;
        } else if metrics.trend == Trend::Bearish && metrics.price_level == PriceLevel::Resistance
        {
            bearish += self.level_weight;
        }

        // 6. Stochastic confirmation
        if metrics.trend == Trend::Bullish && metrics.stochastic_k > 55.0 {
            bullish += self.stochastic_weight;
        } else if metrics.trend == Trend::Bearish && metrics.stochastic_k < 45.0 {
            bearish += self.stochastic_weight;
        }

        // 7. Volume spike bonus, credited to the trend's side
        if metrics.volume_signal == VolumeSignal::Strong {
            match metrics.trend {
                Trend::Bullish => bullish += self.volume_weight,
                Trend::Bearish => bearish += self.volume_weight,
                Trend::Neutral => {}
            }
        }

        let (direction, score) = if bullish >= self.min_score && bullish > bearish {
            (Some(SignalType::Call), bullish)
        } else if bearish >= self.min_score && bearish > bullish {
            (Some(SignalType::Put), bearish)
        } else {
            (None, 0)
        };

        let confidence = if direction.is_some() {
            self.confidence_for(score)
        } else {
            0
        };

        Verdict {
            direction,
            confidence,
            bullish_score: bullish,
            bearish_score: bearish,
        }
    }

    /// Linear interpolation from `min_score` (70%) to `max_score` (99%),
    /// clamped to that band.
    fn confidence_for(&self, score: u32) -> u8 {
        let span = (self.max_score - self.min_score).max(1) as f64;
        let above = score.saturating_sub(self.min_score) as f64;
        let confidence = 70.0 + (above / span * 29.0).round();
        confidence.clamp(70.0, 99.0) as u8
    }
}
