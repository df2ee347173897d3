//! Telegram channel delivery.
//!
//! Formats a generated signal into a subscriber-facing alert and posts
//! it through the Bot API. Delivery is best effort: failures are
//! reported in the [`DeliveryOutcome`], never propagated as pipeline
//! errors, because a persisted signal without a Telegram message is
//! still a valid signal.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{info, warn};

use crate::types::{DeliveryOutcome, SignalDraft, SignalSource, SignalType, TechnicalMetrics};

const TELEGRAM_API_URL: &str = "https://api.telegram.org";
const SEND_TIMEOUT_SECS: u64 = 30;
const MAX_ATTEMPTS: u32 = 3;
const RETRY_DELAY_SECS: u64 = 1;

#[derive(Debug, Deserialize)]
struct SendMessageResponse {
    ok: bool,
    result: Option<SentMessage>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    message_id: i64,
}

#[derive(Debug, Deserialize)]
struct GetMeResponse {
    ok: bool,
}

/// Message transport for generated signals.
///
/// The engine delivers through this seam so tests can observe and fake
/// delivery without a live bot.
#[async_trait]
pub trait SignalTransport: Send + Sync {
    async fn send_signal(&self, draft: &SignalDraft) -> DeliveryOutcome;
}

/// Telegram Bot API client bound to one channel.
pub struct TelegramService {
    client: Client,
    bot_token: String,
    channel_id: String,
}

impl TelegramService {
    pub fn new(bot_token: String, channel_id: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(SEND_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();
        Self {
            client,
            bot_token,
            channel_id,
        }
    }

    /// Checks the bot token against the `getMe` endpoint.
    pub async fn validate_credentials(&self) -> bool {
        let url = format!("{}/bot{}/getMe", TELEGRAM_API_URL, self.bot_token);
        match self.client.get(&url).send().await {
            Ok(resp) => resp
                .json::<GetMeResponse>()
                .await
                .map(|body| body.ok)
                .unwrap_or(false),
            Err(_) => false,
        }
    }

    async fn send_message(&self, text: &str) -> std::result::Result<String, String> {
        let url = format!("{}/bot{}/sendMessage", TELEGRAM_API_URL, self.bot_token);
        let payload = json!({
            "chat_id": self.channel_id,
            "text": text,
            "parse_mode": "HTML",
        });

        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let body: SendMessageResponse = response.json().await.map_err(|e| e.to_string())?;

        if body.ok {
            body.result
                .map(|m| m.message_id.to_string())
                .ok_or_else(|| "missing message id in response".to_string())
        } else {
            Err(body
                .description
                .unwrap_or_else(|| "unknown telegram error".to_string()))
        }
    }
}

#[async_trait]
impl SignalTransport for TelegramService {
    /// Posts the formatted alert, retrying transient failures.
    ///
    /// Up to three attempts with a short pause between them; the final
    /// error (if any) is carried in the outcome.
    async fn send_signal(&self, draft: &SignalDraft) -> DeliveryOutcome {
        let message = format_signal_message(draft);
        let mut last_error = String::from("no attempts made");

        for attempt in 1..=MAX_ATTEMPTS {
            match self.send_message(&message).await {
                Ok(message_id) => {
                    info!(
                        symbol = %draft.symbol,
                        message_id,
                        attempt,
                        "signal delivered to telegram"
                    );
                    return DeliveryOutcome {
                        success: true,
                        message_id: Some(message_id),
                        error: None,
                    };
                }
                Err(e) => {
                    warn!(
                        symbol = %draft.symbol,
                        attempt,
                        error = %e,
                        "telegram delivery attempt failed"
                    );
                    last_error = e;
                }
            }

            if attempt < MAX_ATTEMPTS {
                tokio::time::sleep(Duration::from_secs(RETRY_DELAY_SECS)).await;
            }
        }

        DeliveryOutcome {
            success: false,
            message_id: None,
            error: Some(last_error),
        }
    }
}

fn format_hhmm(timestamp: i64) -> String {
    Utc.timestamp_opt(timestamp, 0)
        .single()
        .map(|dt| dt.format("%H:%M").to_string())
        .unwrap_or_else(|| "--:--".to_string())
}

/// Renders the subscriber-facing alert text.
pub fn format_signal_message(draft: &SignalDraft) -> String {
    let source_label = match draft.source {
        SignalSource::Auto => "AUTO",
        SignalSource::Manual => "MANUAL",
    };
    let type_label = match draft.signal_type {
        SignalType::Call => "🟢 BUY/CALL",
        SignalType::Put => "🔴 SELL/PUT",
    };

    format!(
        "🚀 NEW SIGNAL ALERT ({source}) 🚀\n\
         \n\
         📊 Pair: {symbol}\n\
         ⚡ Type: {kind}\n\
         ⏱ Timeframe: M5\n\
         ⏰ Start Time: {start}\n\
         🏁 End Time: {end}\n\
         \n\
         🎯 Entry: {entry:.5}\n\
         🛑 Stop Loss: {sl:.5}\n\
         💰 Take Profit: {tp:.5}\n\
         \n\
         💪 Confidence: {confidence}%\n\
         \n\
         📊 Technicals:\n\
         • RSI: {rsi:.1}\n\
         • Trend: {trend:?}\n\
         • Momentum: {momentum:?}\n\
         \n\
         {analysis}",
        source = source_label,
        symbol = draft.symbol,
        kind = type_label,
        start = format_hhmm(draft.entry_time),
        end = format_hhmm(draft.expiry_time),
        entry = draft.entry_price,
        sl = draft.stop_loss,
        tp = draft.take_profit,
        confidence = draft.confidence,
        rsi = draft.technicals.rsi,
        trend = draft.technicals.trend,
        momentum = draft.technicals.momentum,
        analysis = analysis_text(&draft.technicals),
    )
}

/// Human-readable indicator highlights for the alert footer.
fn analysis_text(technicals: &TechnicalMetrics) -> String {
    let mut insights: Vec<String> = Vec::new();

    if technicals.rsi > 70.0 {
        insights.push(format!(
            "• RSI extremely overbought at {:.1} - strong reversal signal",
            technicals.rsi
        ));
    } else if technicals.rsi < 30.0 {
        insights.push(format!(
            "• RSI extremely oversold at {:.1} - strong bounce signal",
            technicals.rsi
        ));
    }

    if technicals.macd_histogram > 0.0 {
        insights.push("• MACD bullish crossover with positive histogram".to_string());
    } else {
        insights.push("• MACD bearish signal with negative histogram".to_string());
    }

    if technicals.sma20 > 0.0 && technicals.sma50 > 0.0 {
        if technicals.sma20 > technicals.sma50 {
            insights.push("• Price above SMA20 and SMA50 - uptrend confirmed".to_string());
        } else {
            insights.push("• Price below SMA20 and SMA50 - downtrend confirmed".to_string());
        }
    }

    if technicals.ema12 > technicals.ema26 {
        insights.push(format!(
            "• EMA12 > EMA26 - short-term bullish momentum ({:?})",
            technicals.momentum
        ));
    } else {
        insights.push(format!(
            "• EMA26 > EMA12 - short-term bearish momentum ({:?})",
            technicals.momentum
        ));
    }

    if technicals.stochastic_k > 80.0 {
        insights.push(format!(
            "• Stochastic overbought (K:{:.1}, D:{:.1})",
            technicals.stochastic_k, technicals.stochastic_d
        ));
    } else if technicals.stochastic_k < 20.0 {
        insights.push(format!(
            "• Stochastic oversold (K:{:.1}, D:{:.1})",
            technicals.stochastic_k, technicals.stochastic_d
        ));
    }

    if technicals.adx > 40.0 {
        insights.push(format!(
            "• Very strong trend (ADX: {:.1}) - high conviction",
            technicals.adx
        ));
    } else if technicals.adx > 25.0 {
        insights.push(format!(
            "• Strong trend (ADX: {:.1}) - moderate conviction",
            technicals.adx
        ));
    }

    if insights.is_empty() {
        "📈 Analysis: Mixed signals detected".to_string()
    } else {
        format!("📈 Analysis:\n{}", insights.join("\n"))
    }
}
