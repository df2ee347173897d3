use crate::types::TechnicalMetrics;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Direction of a binary-options signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalType {
    Call,
    Put,
}

impl SignalType {
    pub fn label(&self) -> &'static str {
        match self {
            SignalType::Call => "CALL",
            SignalType::Put => "PUT",
        }
    }
}

/// How a signal-generation request entered the pipeline. The core treats
/// both identically; this is audit metadata only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalSource {
    Auto,
    Manual,
}

/// Fields of a signal as produced by the pipeline, before the store has
/// assigned an id and creation timestamp.
#[derive(Debug, Clone)]
pub struct SignalDraft {
    pub symbol: String,
    pub signal_type: SignalType,
    pub source: SignalSource,
    /// 0-100.
    pub confidence: u8,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    /// Timestamp of the oldest analyzed candle.
    pub analysis_start_time: i64,
    /// Timestamp of the newest analyzed candle.
    pub analysis_end_time: i64,
    pub entry_time: i64,
    pub expiry_time: i64,
    pub send_time: i64,
    pub technicals: TechnicalMetrics,
}

/// A persisted trading signal. Immutable after creation except for the
/// single `telegram_message_id` patch applied after successful delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeSignal {
    pub id: Uuid,
    pub symbol: String,
    pub signal_type: SignalType,
    pub source: SignalSource,
    pub confidence: u8,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub analysis_start_time: i64,
    pub analysis_end_time: i64,
    pub entry_time: i64,
    pub expiry_time: i64,
    pub send_time: i64,
    pub technicals: TechnicalMetrics,
    pub telegram_message_id: Option<String>,
    pub created_at: i64,
}

/// Result of one delivery attempt sequence against the message transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Terminal response of a signal-generation request. Every outcome
/// (signal produced, no strong signal, cooldown) is a successful
/// response with a distinct message; none is ambiguous with a failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signal: Option<TradeSignal>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery: Option<DeliveryOutcome>,
    /// Seconds left in the per-symbol cooldown window, when rejected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cooldown_remaining: Option<i64>,
}
