//! Market data acquisition.
//!
//! The engine consumes candles through the [`CandleSource`] trait so
//! tests and alternative feeds can inject their own history. The shipped
//! implementation, [`RealRateSource`], anchors each series to a live spot
//! rate from exchangerate.host and synthesizes the M5 OHLC structure
//! around it, since free forex APIs do not expose intraday OTC candles.

use async_trait::async_trait;
use rand::Rng;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{AppError, Result};
use crate::types::Candle;

const EXCHANGE_RATE_API_URL: &str = "https://api.exchangerate.host/latest";
const SPOT_TIMEOUT_SECS: u64 = 5;

/// Supported pairs and their base/quote split for spot lookups.
pub const PAIR_MAP: &[(&str, (&str, &str))] = &[
    ("EUR/USD", ("EUR", "USD")),
    ("GBP/USD", ("GBP", "USD")),
    ("USD/JPY", ("USD", "JPY")),
    ("EUR/JPY", ("EUR", "JPY")),
    ("AUD/USD", ("AUD", "USD")),
    ("USD/CHF", ("USD", "CHF")),
    ("NZD/USD", ("NZD", "USD")),
    ("GBP/JPY", ("GBP", "JPY")),
    ("CAD/JPY", ("CAD", "JPY")),
    ("AUD/JPY", ("AUD", "JPY")),
];

/// Recent reference rates used when the spot API is unreachable.
const FALLBACK_PRICES: &[(&str, f64)] = &[
    ("EUR/USD", 1.0850),
    ("GBP/USD", 1.2630),
    ("USD/JPY", 151.20),
    ("EUR/JPY", 163.82),
    ("AUD/USD", 0.6490),
    ("USD/CHF", 0.8750),
    ("NZD/USD", 0.5950),
    ("GBP/JPY", 191.50),
    ("CAD/JPY", 113.20),
    ("AUD/JPY", 98.45),
];

/// Candle history provider for one symbol.
///
/// Implementations must return candles ordered oldest to newest, spaced
/// by the M5 bucket width.
#[async_trait]
pub trait CandleSource: Send + Sync {
    async fn fetch_candles(&self, symbol: &str, count: usize) -> Result<Vec<Candle>>;
}

#[derive(Debug, Deserialize)]
struct SpotResponse {
    rates: Option<HashMap<String, f64>>,
}

/// Live-rate-anchored candle source.
pub struct RealRateSource {
    client: Client,
}

impl Default for RealRateSource {
    fn default() -> Self {
        Self::new()
    }
}

impl RealRateSource {
    pub fn new() -> Self {
        let client = Client::builder()
            .user_agent("Flare/1.0 (OTC Signal Engine)")
            .timeout(Duration::from_secs(SPOT_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();
        Self { client }
    }

    /// Current spot rate for a mapped pair, or None when the pair is
    /// unknown or the API call fails.
    async fn spot_rate(&self, symbol: &str) -> Option<f64> {
        let (base, quote) = PAIR_MAP
            .iter()
            .find(|(pair, _)| *pair == symbol)
            .map(|(_, split)| *split)?;

        let response = self
            .client
            .get(EXCHANGE_RATE_API_URL)
            .query(&[("base", base), ("symbols", quote)])
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => {
                match resp.json::<SpotResponse>().await {
                    Ok(body) => {
                        let rate = body.rates.and_then(|r| r.get(quote).copied());
                        if let Some(rate) = rate {
                            debug!(symbol, rate, "fetched live spot rate");
                        }
                        rate
                    }
                    Err(e) => {
                        warn!(symbol, error = %e, "spot rate response malformed");
                        None
                    }
                }
            }
            Ok(resp) => {
                warn!(symbol, status = %resp.status(), "spot rate API error");
                None
            }
            Err(e) => {
                warn!(symbol, error = %e, "spot rate request failed");
                None
            }
        }
    }

    fn fallback_price(symbol: &str) -> f64 {
        FALLBACK_PRICES
            .iter()
            .find(|(pair, _)| *pair == symbol)
            .map(|(_, price)| *price)
            .unwrap_or(100.0)
    }
}

#[async_trait]
impl CandleSource for RealRateSource {
    async fn fetch_candles(&self, symbol: &str, count: usize) -> Result<Vec<Candle>> {
        if count == 0 {
            return Err(AppError::BadRequest("candle count must be positive".into()));
        }

        let base_price = match self.spot_rate(symbol).await {
            Some(rate) => rate,
            None => {
                let price = Self::fallback_price(symbol);
                warn!(symbol, price, "using fallback reference price");
                price
            }
        };

        let now = chrono::Utc::now().timestamp();
        Ok(synthesize_candles(symbol, base_price, count, now))
    }
}

/// Builds an M5 series ending just before `now`, anchored at
/// `base_price`, with wave structure: a random global drift plus a local
/// trend that flips every 4 candles, and proportional noise.
pub fn synthesize_candles(symbol: &str, base_price: f64, count: usize, now: i64) -> Vec<Candle> {
    let mut rng = rand::thread_rng();
    let overall_trend: f64 = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };

    let mut candles = Vec::with_capacity(count);
    let mut current_price = base_price;

    for i in (1..=count).rev() {
        let timestamp = now - i as i64 * 300;

        let phase = (count - i) / 4;
        let local_trend = if phase % 2 == 0 { 1.0 } else { -1.0 };

        let trend_strength = 0.0004 * overall_trend + 0.0003 * local_trend;
        let noise: f64 = (rng.gen::<f64>() - 0.5) * 0.0005 * current_price;
        let change = trend_strength * current_price + noise;

        let open = current_price;
        let close = open + change;
        let high = open.max(close) + change.abs() * 0.8;
        let low = open.min(close) - change.abs() * 0.5;

        candles.push(Candle {
            timestamp,
            open,
            high,
            low,
            close,
            volume: rng.gen_range(800.0_f64..2800.0).floor(),
        });

        current_price = close;
    }

    debug!(symbol, count = candles.len(), "synthesized candle series");
    candles
}
