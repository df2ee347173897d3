//! Simple Moving Average (SMA) indicator.

/// Arithmetic mean of the trailing `period` values.
///
/// With fewer values than `period`, the mean of everything available is
/// used instead, so that a 50-period SMA over a 30-candle series still
/// sits below a rising price rather than collapsing onto it. Returns
/// `0.0` on empty input.
pub fn sma(values: &[f64], period: usize) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let window = &values[values.len().saturating_sub(period)..];
    window.iter().sum::<f64>() / window.len() as f64
}
