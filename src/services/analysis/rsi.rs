//! Relative Strength Index (RSI) indicator.

/// Wilder-style RSI over the trailing `period` close-to-close changes,
/// using simple (not smoothed) gain/loss averages.
///
/// Values range 0-100:
/// - Below 30: oversold
/// - Above 70: overbought
///
/// Returns a neutral `50.0` when fewer than `period + 1` closes are
/// available.
pub fn rsi(closes: &[f64], period: usize) -> f64 {
    if closes.len() < period + 1 {
        return 50.0;
    }

    let mut gains = 0.0;
    let mut losses = 0.0;

    for i in closes.len() - period..closes.len() {
        let diff = closes[i] - closes[i - 1];
        if diff > 0.0 {
            gains += diff;
        } else {
            losses += -diff;
        }
    }

    let avg_gain = gains / period as f64;
    let avg_loss = losses / period as f64;

    // A lossless window pins RS at 100 instead of dividing by zero.
    let rs = if avg_loss == 0.0 {
        100.0
    } else {
        avg_gain / avg_loss
    };

    100.0 - (100.0 / (1.0 + rs))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rising_closes(count: usize) -> Vec<f64> {
        (0..count).map(|i| 100.0 + i as f64 * 1.5).collect()
    }

    fn falling_closes(count: usize) -> Vec<f64> {
        (0..count).map(|i| 200.0 - i as f64 * 1.5).collect()
    }

    #[test]
    fn test_rsi_insufficient_data_returns_neutral() {
        let closes = rising_closes(14);
        assert_eq!(rsi(&closes, 14), 50.0);
        assert_eq!(rsi(&[], 14), 50.0);
    }

    #[test]
    fn test_rsi_monotone_rise_approaches_100() {
        let closes = rising_closes(30);
        let value = rsi(&closes, 14);
        assert!(value > 99.0, "monotone rise should pin RSI near 100, got {}", value);
        assert!(value <= 100.0);
    }

    #[test]
    fn test_rsi_monotone_fall_approaches_0() {
        let closes = falling_closes(30);
        let value = rsi(&closes, 14);
        assert!(value < 1.0, "monotone fall should pin RSI near 0, got {}", value);
        assert!(value >= 0.0);
    }

    #[test]
    fn test_rsi_bounds_on_mixed_series() {
        let closes: Vec<f64> = (0..40)
            .map(|i| 100.0 + ((i * 7) % 5) as f64 - 2.0)
            .collect();
        let value = rsi(&closes, 14);
        assert!((0.0..=100.0).contains(&value));
    }

    #[test]
    fn test_rsi_flat_series_pins_high() {
        // Zero losses over the window means RS is pinned at 100.
        let closes = vec![1.0; 20];
        let value = rsi(&closes, 14);
        assert!((value - (100.0 - 100.0 / 101.0)).abs() < 1e-9);
    }

    #[test]
    fn test_rsi_deterministic() {
        let closes = rising_closes(25);
        assert_eq!(rsi(&closes, 14), rsi(&closes, 14));
    }
}
