use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use flare::config::Config;
use flare::services::{
    DecisionPolicy, RealRateSource, SignalEngine, SignalTransport, SqliteStore, TelegramService,
};
use flare::{api, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "flare=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(Config::from_env());
    info!("Starting Flare server on {}:{}", config.host, config.port);

    let store = Arc::new(SqliteStore::new(&config.database_path)?);

    let telegram = match &config.telegram {
        Some(creds) => {
            let service = Arc::new(TelegramService::new(
                creds.bot_token.clone(),
                creds.channel_id.clone(),
            ));
            if service.validate_credentials().await {
                info!("Telegram credentials validated, delivery enabled");
            } else {
                tracing::warn!("Telegram credential check failed, delivery may not work");
            }
            Some(service as Arc<dyn SignalTransport>)
        }
        None => {
            info!("No Telegram credentials configured, delivery disabled");
            None
        }
    };

    let engine = Arc::new(SignalEngine::new(
        Arc::new(RealRateSource::new()),
        store,
        telegram,
        DecisionPolicy::default(),
        config.candle_count,
        config.min_confidence,
    ));

    // Automatic per-bucket signal loop
    if config.auto_signals {
        engine.clone().start_auto_loop(config.symbols.clone());
    }

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let state = AppState {
        config: config.clone(),
        engine,
    };

    let app = Router::new()
        .merge(api::router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Flare server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
