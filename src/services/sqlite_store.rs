//! SQLite persistence for the signal history.
//!
//! Signals are append-only: once written they are never updated except
//! for the single `telegram_message_id` patch after a successful
//! delivery. Technical metrics are stored as a JSON column since they
//! are read back whole, never queried by field.

use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::types::{SignalDraft, SignalSource, SignalType, TechnicalMetrics, TradeSignal};

/// SQLite-backed signal store.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Create a new SQLite store at the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        info!("SQLite store initialized");
        Ok(store)
    }

    /// Create an in-memory SQLite store (for testing).
    pub fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        debug!("In-memory SQLite store initialized");
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();

        conn.execute(
            "CREATE TABLE IF NOT EXISTS signals (
                id TEXT PRIMARY KEY,
                symbol TEXT NOT NULL,
                signal_type TEXT NOT NULL,
                source TEXT NOT NULL,
                confidence INTEGER NOT NULL,
                entry_price REAL NOT NULL,
                stop_loss REAL NOT NULL,
                take_profit REAL NOT NULL,
                analysis_start_time INTEGER NOT NULL,
                analysis_end_time INTEGER NOT NULL,
                entry_time INTEGER NOT NULL,
                expiry_time INTEGER NOT NULL,
                send_time INTEGER NOT NULL,
                technicals_json TEXT NOT NULL,
                telegram_message_id TEXT,
                created_at INTEGER NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_signals_symbol_created
             ON signals(symbol, created_at DESC)",
            [],
        )?;

        Ok(())
    }

    /// Persists a draft, assigning its id and creation timestamp.
    pub fn create_signal(&self, draft: SignalDraft, created_at: i64) -> Result<TradeSignal> {
        let id = Uuid::new_v4();
        let technicals_json = serde_json::to_string(&draft.technicals)?;

        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO signals (
                id, symbol, signal_type, source, confidence,
                entry_price, stop_loss, take_profit,
                analysis_start_time, analysis_end_time,
                entry_time, expiry_time, send_time,
                technicals_json, telegram_message_id, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, NULL, ?15)",
            params![
                id.to_string(),
                draft.symbol,
                draft.signal_type.label(),
                source_label(draft.source),
                draft.confidence as i64,
                draft.entry_price,
                draft.stop_loss,
                draft.take_profit,
                draft.analysis_start_time,
                draft.analysis_end_time,
                draft.entry_time,
                draft.expiry_time,
                draft.send_time,
                technicals_json,
                created_at,
            ],
        )?;

        debug!(%id, symbol = %draft.symbol, "signal persisted");

        Ok(TradeSignal {
            id,
            symbol: draft.symbol,
            signal_type: draft.signal_type,
            source: draft.source,
            confidence: draft.confidence,
            entry_price: draft.entry_price,
            stop_loss: draft.stop_loss,
            take_profit: draft.take_profit,
            analysis_start_time: draft.analysis_start_time,
            analysis_end_time: draft.analysis_end_time,
            entry_time: draft.entry_time,
            expiry_time: draft.expiry_time,
            send_time: draft.send_time,
            technicals: draft.technicals,
            telegram_message_id: None,
            created_at,
        })
    }

    /// Records the Telegram message id after a successful delivery.
    pub fn set_telegram_message_id(&self, id: Uuid, message_id: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let updated = conn.execute(
            "UPDATE signals SET telegram_message_id = ?1 WHERE id = ?2",
            params![message_id, id.to_string()],
        )?;

        if updated == 0 {
            return Err(AppError::NotFound(format!("signal {id}")));
        }
        Ok(())
    }

    /// Most recent signals for a symbol, newest first.
    pub fn list_recent(&self, symbol: &str, limit: usize) -> Result<Vec<TradeSignal>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, symbol, signal_type, source, confidence,
                    entry_price, stop_loss, take_profit,
                    analysis_start_time, analysis_end_time,
                    entry_time, expiry_time, send_time,
                    technicals_json, telegram_message_id, created_at
             FROM signals WHERE symbol = ?1
             ORDER BY created_at DESC, rowid DESC LIMIT ?2",
        )?;

        let rows = stmt.query_map(params![symbol, limit as i64], row_to_signal)?;
        let mut signals = Vec::new();
        for row in rows {
            signals.push(row?);
        }
        Ok(signals)
    }

    /// Fetch a single signal by id.
    pub fn get_signal(&self, id: Uuid) -> Result<Option<TradeSignal>> {
        let conn = self.conn.lock().unwrap();
        let result = conn
            .query_row(
                "SELECT id, symbol, signal_type, source, confidence,
                        entry_price, stop_loss, take_profit,
                        analysis_start_time, analysis_end_time,
                        entry_time, expiry_time, send_time,
                        technicals_json, telegram_message_id, created_at
                 FROM signals WHERE id = ?1",
                params![id.to_string()],
                row_to_signal,
            )
            .optional()?;
        Ok(result)
    }
}

fn source_label(source: SignalSource) -> &'static str {
    match source {
        SignalSource::Auto => "AUTO",
        SignalSource::Manual => "MANUAL",
    }
}

fn row_to_signal(row: &rusqlite::Row<'_>) -> rusqlite::Result<TradeSignal> {
    let id_text: String = row.get(0)?;
    let signal_type_text: String = row.get(2)?;
    let source_text: String = row.get(3)?;
    let confidence: i64 = row.get(4)?;
    let technicals_json: String = row.get(13)?;

    let id = Uuid::parse_str(&id_text).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let technicals: TechnicalMetrics = serde_json::from_str(&technicals_json).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(13, rusqlite::types::Type::Text, Box::new(e))
    })?;

    let signal_type = match signal_type_text.as_str() {
        "CALL" => SignalType::Call,
        _ => SignalType::Put,
    };
    let source = match source_text.as_str() {
        "MANUAL" => SignalSource::Manual,
        _ => SignalSource::Auto,
    };

    Ok(TradeSignal {
        id,
        symbol: row.get(1)?,
        signal_type,
        source,
        confidence: confidence as u8,
        entry_price: row.get(5)?,
        stop_loss: row.get(6)?,
        take_profit: row.get(7)?,
        analysis_start_time: row.get(8)?,
        analysis_end_time: row.get(9)?,
        entry_time: row.get(10)?,
        expiry_time: row.get(11)?,
        send_time: row.get(12)?,
        technicals,
        telegram_message_id: row.get(14)?,
        created_at: row.get(15)?,
    })
}
