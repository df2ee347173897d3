//! Volume-spike detection.

use crate::types::{Candle, VolumeSignal};

/// Compares the mean volume of the most recent 5 candles against the
/// mean of the preceding 15. A spike more than 30% above the historical
/// mean signals conviction behind the current move.
///
/// Returns `Weak` when fewer than 10 candles are available.
pub fn volume_signal(candles: &[Candle]) -> VolumeSignal {
    if candles.len() < 10 {
        return VolumeSignal::Weak;
    }

    let len = candles.len();
    let recent = &candles[len - 5..];
    let historical = &candles[len.saturating_sub(20)..len - 5];

    let avg_recent = recent.iter().map(|c| c.volume).sum::<f64>() / recent.len() as f64;
    let avg_historical =
        historical.iter().map(|c| c.volume).sum::<f64>() / historical.len() as f64;

    if avg_recent > avg_historical * 1.3 {
        VolumeSignal::Strong
    } else {
        VolumeSignal::Weak
    }
}
