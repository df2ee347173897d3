//! MACD (Moving Average Convergence Divergence) indicator.

use crate::services::analysis::ema::ema;

/// MACD line, signal line, and histogram at the end of a close series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacdOutput {
    pub line: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// MACD from the simplified EMA:
/// - line = EMA(12) - EMA(26) over the closes
/// - signal = EMA(9) over the rolling history of line values
/// - histogram = line - signal
///
/// The line history carries one value per close prefix, computed with
/// the same seed-first EMAs, so `line` here equals
/// `ema(closes, 12) - ema(closes, 26)` exactly.
pub fn macd(closes: &[f64]) -> MacdOutput {
    if closes.is_empty() {
        return MacdOutput {
            line: 0.0,
            signal: 0.0,
            histogram: 0.0,
        };
    }

    let k12 = 2.0 / 13.0;
    let k26 = 2.0 / 27.0;

    let mut ema12 = closes[0];
    let mut ema26 = closes[0];
    let mut lines = Vec::with_capacity(closes.len());
    lines.push(0.0); // both EMAs share the seed

    for value in &closes[1..] {
        ema12 = value * k12 + ema12 * (1.0 - k12);
        ema26 = value * k26 + ema26 * (1.0 - k26);
        lines.push(ema12 - ema26);
    }

    let line = *lines.last().unwrap();
    let signal = ema(&lines, 9);

    MacdOutput {
        line,
        signal,
        histogram: line - signal,
    }
}
