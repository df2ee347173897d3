//! Flare - OTC forex signal engine with M5 candle alignment and
//! Telegram delivery.

pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod types;

use std::sync::Arc;

use config::Config;
use services::SignalEngine;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub engine: Arc<SignalEngine>,
}
