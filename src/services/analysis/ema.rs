//! Exponential Moving Average (EMA) indicator.

/// EMA seeded with the first value and folded left-to-right over the
/// entire input with smoothing constant `k = 2 / (period + 1)`.
///
/// Returns `0.0` on empty input. The first-value seed (rather than an
/// SMA seed) biases short series toward the seed; the decision
/// thresholds downstream are tuned against this behavior, so it is
/// kept as-is.
pub fn ema(values: &[f64], period: usize) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut ema = values[0];

    for value in &values[1..] {
        ema = value * k + ema * (1.0 - k);
    }

    ema
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ema_empty_input() {
        assert_eq!(ema(&[], 12), 0.0);
    }

    #[test]
    fn test_ema_single_value_is_seed() {
        assert_eq!(ema(&[1.0850], 12), 1.0850);
    }

    #[test]
    fn test_ema_tracks_rising_series() {
        let values: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let fast = ema(&values, 12);
        let slow = ema(&values, 26);

        // The fast EMA lags the last value less than the slow EMA.
        let last = *values.last().unwrap();
        assert!(fast < last);
        assert!(slow < fast, "slow EMA should lag more: fast={} slow={}", fast, slow);
    }

    #[test]
    fn test_ema_constant_series() {
        let values = vec![2.5; 40];
        assert!((ema(&values, 12) - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_ema_two_values_exact() {
        // k = 2/13; ema = 10*(1-k) + 23*k
        let k = 2.0 / 13.0;
        let expected = 23.0 * k + 10.0 * (1.0 - k);
        assert!((ema(&[10.0, 23.0], 12) - expected).abs() < 1e-12);
    }
}
