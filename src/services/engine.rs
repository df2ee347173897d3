//! Signal generation pipeline.
//!
//! Single entry point for both manual API requests and the automatic
//! per-bucket loop: fetch candles, run the indicator engine, apply the
//! decision policy, align the entry to the next viable M5 boundary,
//! persist, then deliver. Persistence happens before delivery so a
//! Telegram outage never loses a signal. Manual requests deliver
//! immediately; automatic signals are held back until their send time,
//! two minutes before entry.

use std::sync::Arc;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::services::analysis::{self, MIN_CANDLES};
use crate::services::debounce::DebounceGate;
use crate::services::decision::DecisionPolicy;
use crate::services::market::CandleSource;
use crate::services::scheduler;
use crate::services::sqlite_store::SqliteStore;
use crate::services::telegram::SignalTransport;
use crate::types::{
    DeliveryOutcome, SignalDraft, SignalResponse, SignalSource, SignalType, TradeSignal,
};

/// Stop-loss distance in ATR multiples.
const STOP_LOSS_ATR: f64 = 1.5;
/// Take-profit distance in ATR multiples.
const TAKE_PROFIT_ATR: f64 = 2.0;
/// Risk band floor as a fraction of entry price, for dead-flat series.
const MIN_RISK_FRACTION: f64 = 0.0005;

pub struct SignalEngine {
    source: Arc<dyn CandleSource>,
    store: Arc<SqliteStore>,
    gate: DebounceGate,
    telegram: Option<Arc<dyn SignalTransport>>,
    policy: DecisionPolicy,
    candle_count: usize,
    min_confidence: u8,
}

impl SignalEngine {
    pub fn new(
        source: Arc<dyn CandleSource>,
        store: Arc<SqliteStore>,
        telegram: Option<Arc<dyn SignalTransport>>,
        policy: DecisionPolicy,
        candle_count: usize,
        min_confidence: u8,
    ) -> Self {
        Self {
            source,
            store,
            gate: DebounceGate::new(),
            telegram,
            policy,
            candle_count,
            min_confidence,
        }
    }

    /// Runs the full pipeline for one symbol against the current clock.
    pub async fn generate(&self, symbol: &str, source: SignalSource) -> Result<SignalResponse> {
        let now = chrono::Utc::now().timestamp();
        self.generate_at(symbol, source, now).await
    }

    /// Runs the full pipeline for one symbol at an explicit clock value.
    ///
    /// Every non-error path returns a [`SignalResponse`] with a distinct
    /// message: a generated signal, no strong consensus, or an active
    /// cooldown. Errors are reserved for data and storage failures.
    pub async fn generate_at(
        &self,
        symbol: &str,
        source: SignalSource,
        now: i64,
    ) -> Result<SignalResponse> {
        if symbol.is_empty() {
            return Err(AppError::BadRequest("symbol must not be empty".into()));
        }

        let candles = self.source.fetch_candles(symbol, self.candle_count).await?;
        if candles.len() < MIN_CANDLES {
            return Err(AppError::InsufficientData {
                symbol: symbol.to_string(),
                got: candles.len(),
                need: MIN_CANDLES,
            });
        }

        let metrics = analysis::analyze(&candles);
        let verdict = self.policy.decide(&metrics);
        debug!(
            symbol,
            bullish = verdict.bullish_score,
            bearish = verdict.bearish_score,
            confidence = verdict.confidence,
            "consensus evaluated"
        );

        let (signal_type, confidence) = match verdict.direction {
            Some(direction) if verdict.confidence >= self.min_confidence => {
                (direction, verdict.confidence)
            }
            _ => {
                return Ok(SignalResponse {
                    signal: None,
                    message: format!("No strong signal for {symbol} right now"),
                    delivery: None,
                    cooldown_remaining: None,
                });
            }
        };

        // Claim the cooldown slot before any side effects; a failed
        // delivery afterwards still burns the bucket.
        if let Err(remaining) = self.gate.acquire(symbol, now) {
            info!(symbol, remaining, "signal suppressed by cooldown");
            return Ok(SignalResponse {
                signal: None,
                message: format!(
                    "Signal for {symbol} suppressed: cooldown active for another {remaining}s"
                ),
                delivery: None,
                cooldown_remaining: Some(remaining),
            });
        }

        let entry_time = scheduler::entry_time(now);
        let entry_price = candles.last().map(|c| c.close).unwrap_or_default();
        let (stop_loss, take_profit) = risk_bands(signal_type, entry_price, metrics.volatility);

        let draft = SignalDraft {
            symbol: symbol.to_string(),
            signal_type,
            source,
            confidence,
            entry_price,
            stop_loss,
            take_profit,
            analysis_start_time: candles.first().map(|c| c.timestamp).unwrap_or_default(),
            analysis_end_time: candles.last().map(|c| c.timestamp).unwrap_or_default(),
            entry_time,
            expiry_time: scheduler::expiry_time(entry_time),
            send_time: scheduler::send_time(entry_time),
            technicals: metrics,
        };

        // The audit record comes first; delivery can only ever lag it.
        let mut signal = self.store.create_signal(draft.clone(), now)?;
        let delivery = self.deliver(&draft, signal.id, now).await;

        if let Some(outcome) = &delivery {
            if let Some(message_id) = &outcome.message_id {
                self.store.set_telegram_message_id(signal.id, message_id)?;
                signal.telegram_message_id = Some(message_id.clone());
            }
        }

        info!(
            symbol,
            id = %signal.id,
            kind = signal.signal_type.label(),
            confidence,
            entry_time,
            "signal generated"
        );

        Ok(SignalResponse {
            message: format!(
                "{} signal generated for {} with {}% confidence",
                signal.signal_type.label(),
                symbol,
                confidence
            ),
            signal: Some(signal),
            delivery,
            cooldown_remaining: None,
        })
    }

    /// Delivers a persisted signal through the configured transport.
    ///
    /// Manual signals go out immediately. Automatic signals with send
    /// time still ahead are handed to a background task that sleeps
    /// until then, so subscribers get the alert two minutes before
    /// entry; their outcome is recorded in the store asynchronously and
    /// `None` is returned here.
    async fn deliver(
        &self,
        draft: &SignalDraft,
        id: Uuid,
        now: i64,
    ) -> Option<DeliveryOutcome> {
        let transport = self.telegram.as_ref()?;

        let delay = draft.send_time - now;
        if draft.source == SignalSource::Auto && delay > 0 {
            debug!(symbol = %draft.symbol, %id, delay, "delivery scheduled for send time");
            let transport = transport.clone();
            let store = self.store.clone();
            let draft = draft.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_secs(delay as u64)).await;
                let outcome = transport.send_signal(&draft).await;
                match outcome.message_id {
                    Some(message_id) => {
                        if let Err(e) = store.set_telegram_message_id(id, &message_id) {
                            warn!(%id, error = %e, "failed to record telegram message id");
                        }
                    }
                    None => {
                        warn!(%id, error = ?outcome.error, "scheduled delivery failed")
                    }
                }
            });
            return None;
        }

        Some(transport.send_signal(draft).await)
    }

    /// Most recent persisted signals for a symbol, newest first.
    pub fn list(&self, symbol: &str, limit: usize) -> Result<Vec<TradeSignal>> {
        self.store.list_recent(symbol, limit)
    }

    /// Spawns the automatic loop: one generation pass over `symbols`
    /// every candle bucket, through the same pipeline as manual
    /// requests. Per-symbol failures are logged and skipped.
    pub fn start_auto_loop(self: Arc<Self>, symbols: Vec<String>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = interval(Duration::from_secs(scheduler::BUCKET_SECONDS as u64));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!(symbols = symbols.len(), "automatic signal loop started");

            loop {
                ticker.tick().await;
                for symbol in &symbols {
                    match self.generate(symbol, SignalSource::Auto).await {
                        Ok(response) => debug!(symbol, message = %response.message, "auto pass"),
                        Err(e) => warn!(symbol, error = %e, "auto signal pass failed"),
                    }
                }
            }
        })
    }
}

/// ATR-multiple stop-loss and take-profit around the entry, floored so a
/// dead-flat series still yields non-degenerate bands.
fn risk_bands(signal_type: SignalType, entry_price: f64, atr: f64) -> (f64, f64) {
    let unit = atr.max(entry_price.abs() * MIN_RISK_FRACTION);
    match signal_type {
        SignalType::Call => (
            entry_price - STOP_LOSS_ATR * unit,
            entry_price + TAKE_PROFIT_ATR * unit,
        ),
        SignalType::Put => (
            entry_price + STOP_LOSS_ATR * unit,
            entry_price - TAKE_PROFIT_ATR * unit,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Candle;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// Fixed candle series for pipeline tests.
    struct FixtureSource {
        candles: Vec<Candle>,
    }

    #[async_trait]
    impl CandleSource for FixtureSource {
        async fn fetch_candles(&self, _symbol: &str, count: usize) -> Result<Vec<Candle>> {
            let len = self.candles.len().min(count);
            Ok(self.candles[self.candles.len() - len..].to_vec())
        }
    }

    fn rising_candles(count: usize) -> Vec<Candle> {
        (0..count)
            .map(|i| {
                let close = 1.0800 + i as f64 * 0.0002;
                let open = close - 0.0002;
                Candle {
                    timestamp: 1_705_294_800 + i as i64 * 300,
                    open,
                    high: close + 0.0003,
                    low: open - 0.0001,
                    close,
                    volume: 1000.0,
                }
            })
            .collect()
    }

    fn engine_with(candles: Vec<Candle>) -> SignalEngine {
        SignalEngine::new(
            Arc::new(FixtureSource { candles }),
            Arc::new(SqliteStore::new_in_memory().unwrap()),
            None,
            DecisionPolicy::default(),
            60,
            70,
        )
    }

    /// Transport fixture that records how many rows the store held at
    /// the moment delivery ran.
    struct RecordingTransport {
        store: Arc<SqliteStore>,
        succeed: bool,
        sent: AtomicBool,
        rows_at_send: AtomicUsize,
    }

    impl RecordingTransport {
        fn new(store: Arc<SqliteStore>, succeed: bool) -> Arc<Self> {
            Arc::new(Self {
                store,
                succeed,
                sent: AtomicBool::new(false),
                rows_at_send: AtomicUsize::new(usize::MAX),
            })
        }
    }

    #[async_trait]
    impl SignalTransport for RecordingTransport {
        async fn send_signal(&self, draft: &SignalDraft) -> DeliveryOutcome {
            let rows = self.store.list_recent(&draft.symbol, 100).unwrap().len();
            self.rows_at_send.store(rows, Ordering::SeqCst);
            self.sent.store(true, Ordering::SeqCst);

            if self.succeed {
                DeliveryOutcome {
                    success: true,
                    message_id: Some("777".to_string()),
                    error: None,
                }
            } else {
                DeliveryOutcome {
                    success: false,
                    message_id: None,
                    error: Some("bot unreachable".to_string()),
                }
            }
        }
    }

    fn engine_with_transport(
        candles: Vec<Candle>,
        succeed: bool,
    ) -> (SignalEngine, Arc<RecordingTransport>) {
        let store = Arc::new(SqliteStore::new_in_memory().unwrap());
        let transport = RecordingTransport::new(store.clone(), succeed);
        let engine = SignalEngine::new(
            Arc::new(FixtureSource { candles }),
            store,
            Some(transport.clone() as Arc<dyn SignalTransport>),
            DecisionPolicy::default(),
            60,
            70,
        );
        (engine, transport)
    }

    // 2024-01-15 10:03:00 UTC.
    const NOW: i64 = 1_705_312_980;

    #[tokio::test]
    async fn test_generate_call_from_rising_series() {
        let engine = engine_with(rising_candles(60));
        let response = engine
            .generate_at("EUR/USD", SignalSource::Manual, NOW)
            .await
            .unwrap();

        let signal = response.signal.expect("expected a signal");
        assert_eq!(signal.signal_type, SignalType::Call);
        assert!(signal.confidence >= 70);
        assert_eq!(signal.source, SignalSource::Manual);
        assert!(response.message.contains("CALL"));
    }

    #[tokio::test]
    async fn test_generate_schedules_entry_with_lead() {
        let engine = engine_with(rising_candles(60));
        let response = engine
            .generate_at("EUR/USD", SignalSource::Manual, NOW)
            .await
            .unwrap();

        let signal = response.signal.unwrap();
        // 10:03 has exactly two minutes of lead to 10:05.
        assert_eq!(signal.entry_time, NOW + 120);
        assert_eq!(signal.send_time, signal.entry_time - 120);
        assert_eq!(signal.expiry_time, signal.entry_time + 300);
        assert_eq!(signal.entry_time % 300, 0);
    }

    #[tokio::test]
    async fn test_generate_risk_bands_bracket_entry() {
        let engine = engine_with(rising_candles(60));
        let response = engine
            .generate_at("EUR/USD", SignalSource::Manual, NOW)
            .await
            .unwrap();

        let signal = response.signal.unwrap();
        assert!(signal.stop_loss < signal.entry_price);
        assert!(signal.take_profit > signal.entry_price);
    }

    #[tokio::test]
    async fn test_generate_persists_and_lists() {
        let engine = engine_with(rising_candles(60));
        let response = engine
            .generate_at("EUR/USD", SignalSource::Auto, NOW)
            .await
            .unwrap();
        let id = response.signal.unwrap().id;

        let listed = engine.list("EUR/USD", 10).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, id);
        assert_eq!(listed[0].source, SignalSource::Auto);
    }

    #[tokio::test]
    async fn test_second_generate_hits_cooldown() {
        let engine = engine_with(rising_candles(60));
        engine
            .generate_at("EUR/USD", SignalSource::Manual, NOW)
            .await
            .unwrap();

        let response = engine
            .generate_at("EUR/USD", SignalSource::Manual, NOW + 180)
            .await
            .unwrap();

        assert!(response.signal.is_none());
        assert_eq!(response.cooldown_remaining, Some(120));
        assert!(response.message.contains("cooldown"));
        assert_eq!(engine.list("EUR/USD", 10).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_generate_readmitted_after_cooldown() {
        let engine = engine_with(rising_candles(60));
        engine
            .generate_at("EUR/USD", SignalSource::Manual, NOW)
            .await
            .unwrap();

        let response = engine
            .generate_at("EUR/USD", SignalSource::Manual, NOW + 301)
            .await
            .unwrap();
        assert!(response.signal.is_some());
        assert_eq!(engine.list("EUR/USD", 10).unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_generate_insufficient_data() {
        let engine = engine_with(rising_candles(20));
        let result = engine.generate_at("EUR/USD", SignalSource::Manual, NOW).await;

        match result {
            Err(AppError::InsufficientData { got, need, .. }) => {
                assert_eq!(got, 20);
                assert_eq!(need, 26);
            }
            other => panic!("expected InsufficientData, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_generate_flat_series_no_signal() {
        let flat: Vec<Candle> = (0..60)
            .map(|i| Candle {
                timestamp: 1_705_294_800 + i as i64 * 300,
                open: 1.0850,
                high: 1.0850,
                low: 1.0850,
                close: 1.0850,
                volume: 1000.0,
            })
            .collect();

        let engine = engine_with(flat);
        let response = engine
            .generate_at("EUR/USD", SignalSource::Manual, NOW)
            .await
            .unwrap();

        assert!(response.signal.is_none());
        assert!(response.cooldown_remaining.is_none());
        assert!(response.message.contains("No strong signal"));
    }

    #[tokio::test]
    async fn test_generate_empty_symbol_rejected() {
        let engine = engine_with(rising_candles(60));
        let result = engine.generate_at("", SignalSource::Manual, NOW).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_signal_persisted_before_delivery() {
        let (engine, transport) = engine_with_transport(rising_candles(60), true);
        let response = engine
            .generate_at("EUR/USD", SignalSource::Manual, NOW)
            .await
            .unwrap();

        // The row was already in the store when the transport ran.
        assert_eq!(transport.rows_at_send.load(Ordering::SeqCst), 1);

        let signal = response.signal.unwrap();
        assert_eq!(signal.telegram_message_id, Some("777".to_string()));
        let delivery = response.delivery.unwrap();
        assert!(delivery.success);
        assert_eq!(delivery.message_id, Some("777".to_string()));
    }

    #[tokio::test]
    async fn test_failed_delivery_keeps_persisted_signal() {
        let (engine, transport) = engine_with_transport(rising_candles(60), false);
        let response = engine
            .generate_at("EUR/USD", SignalSource::Manual, NOW)
            .await
            .unwrap();

        assert!(transport.sent.load(Ordering::SeqCst));
        let delivery = response.delivery.unwrap();
        assert!(!delivery.success);

        let signal = response.signal.unwrap();
        assert!(signal.telegram_message_id.is_none());
        let listed = engine.list("EUR/USD", 10).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, signal.id);
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_delivery_waits_for_send_time() {
        // 10:02: entry lands on 10:05, so the alert is due at 10:03.
        let at = NOW - 60;
        let (engine, transport) = engine_with_transport(rising_candles(60), true);
        let response = engine
            .generate_at("EUR/USD", SignalSource::Auto, at)
            .await
            .unwrap();

        let signal = response.signal.unwrap();
        assert_eq!(signal.send_time, at + 60);
        assert!(response.delivery.is_none());
        assert!(!transport.sent.load(Ordering::SeqCst));
        assert!(signal.telegram_message_id.is_none());

        tokio::time::sleep(Duration::from_secs(61)).await;

        assert!(transport.sent.load(Ordering::SeqCst));
        let listed = engine.list("EUR/USD", 10).unwrap();
        assert_eq!(listed[0].telegram_message_id, Some("777".to_string()));
    }

    #[tokio::test]
    async fn test_manual_delivery_is_immediate() {
        // Same clock as the auto case above; manual skips the hold-back.
        let (engine, transport) = engine_with_transport(rising_candles(60), true);
        let response = engine
            .generate_at("EUR/USD", SignalSource::Manual, NOW - 60)
            .await
            .unwrap();

        assert!(transport.sent.load(Ordering::SeqCst));
        assert!(response.delivery.unwrap().success);
    }

    #[test]
    fn test_risk_bands_put_mirrored() {
        let (sl, tp) = risk_bands(SignalType::Put, 1.0850, 0.0010);
        assert!((sl - (1.0850 + 0.0015)).abs() < 1e-12);
        assert!((tp - (1.0850 - 0.0020)).abs() < 1e-12);
    }

    #[test]
    fn test_risk_bands_flat_series_floor() {
        let (sl, tp) = risk_bands(SignalType::Call, 1.0850, 0.0);
        assert!(sl < 1.0850);
        assert!(tp > 1.0850);
    }
}
