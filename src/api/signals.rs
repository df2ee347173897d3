//! Signal API endpoints.

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::error::Result;
use crate::types::{SignalResponse, SignalSource, TradeSignal};
use crate::AppState;

const DEFAULT_HISTORY_LIMIT: usize = 20;
const MAX_HISTORY_LIMIT: usize = 100;

/// Query parameters for the signal history endpoint.
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    /// Maximum signals to return (default 20, capped at 100).
    pub limit: Option<usize>,
}

/// Create the signals router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/:symbol", get(list_signals))
        .route("/:symbol/generate", post(generate_signal))
}

/// Symbols arrive with the pair separator either percent-encoded or
/// dash-folded (`EUR%2FUSD` or `EUR-USD`).
fn normalize_symbol(raw: &str) -> String {
    if raw.contains('/') {
        raw.to_string()
    } else {
        raw.replace('-', "/")
    }
}

/// Run the signal pipeline for a symbol, on demand.
async fn generate_signal(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<SignalResponse>> {
    let symbol = normalize_symbol(&symbol);
    let response = state.engine.generate(&symbol, SignalSource::Manual).await?;
    Ok(Json(response))
}

/// Recent signal history for a symbol, newest first.
async fn list_signals(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<TradeSignal>>> {
    let symbol = normalize_symbol(&symbol);
    let limit = query
        .limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .min(MAX_HISTORY_LIMIT);
    let signals = state.engine.list(&symbol, limit)?;
    Ok(Json(signals))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_symbol_variants() {
        assert_eq!(normalize_symbol("EUR/USD"), "EUR/USD");
        assert_eq!(normalize_symbol("EUR-USD"), "EUR/USD");
        assert_eq!(normalize_symbol("EURUSD"), "EURUSD");
    }

    #[test]
    fn test_history_query_defaults() {
        let query: HistoryQuery = serde_json::from_str("{}").unwrap();
        assert!(query.limit.is_none());
    }
}
