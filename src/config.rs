use std::env;

use crate::services::analysis::MIN_CANDLES;

/// Telegram delivery configuration. Delivery is disabled entirely when
/// either credential is missing.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    /// Bot API token.
    pub bot_token: String,
    /// Target channel or chat id.
    pub channel_id: String,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// SQLite database path.
    pub database_path: String,
    /// Telegram credentials, when both are configured.
    pub telegram: Option<TelegramConfig>,
    /// Symbols watched by the automatic signal loop.
    pub symbols: Vec<String>,
    /// Whether the automatic per-bucket signal loop runs.
    pub auto_signals: bool,
    /// Candles fetched per analysis.
    pub candle_count: usize,
    /// Minimum confidence for a signal to be emitted (0-100).
    pub min_confidence: u8,
}

const DEFAULT_SYMBOLS: &[&str] = &[
    "EUR/USD", "GBP/USD", "USD/JPY", "EUR/JPY", "AUD/USD", "USD/CHF", "NZD/USD", "GBP/JPY",
    "CAD/JPY", "AUD/JPY",
];

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3001);

        let telegram = match (env::var("TELEGRAM_BOT_TOKEN"), env::var("TELEGRAM_CHANNEL_ID")) {
            (Ok(bot_token), Ok(channel_id)) if !bot_token.is_empty() && !channel_id.is_empty() => {
                Some(TelegramConfig {
                    bot_token,
                    channel_id,
                })
            }
            _ => None,
        };

        let symbols = env::var("SYMBOLS")
            .ok()
            .map(|s| {
                s.split(',')
                    .map(|sym| sym.trim().to_string())
                    .filter(|sym| !sym.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|list| !list.is_empty())
            .unwrap_or_else(|| DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect());

        Self {
            host,
            port,
            database_path: env::var("DATABASE_PATH").unwrap_or_else(|_| "flare.db".to_string()),
            telegram,
            symbols,
            auto_signals: env::var("AUTO_SIGNALS")
                .ok()
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            // Below the indicator floor every analysis would fail.
            candle_count: env::var("CANDLE_COUNT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60)
                .max(MIN_CANDLES),
            min_confidence: env::var("MIN_CONFIDENCE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(70),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_manual_construction() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 8080,
            database_path: "test.db".to_string(),
            telegram: Some(TelegramConfig {
                bot_token: "123:abc".to_string(),
                channel_id: "@signals".to_string(),
            }),
            symbols: vec!["EUR/USD".to_string()],
            auto_signals: true,
            candle_count: 60,
            min_confidence: 70,
        };

        assert_eq!(config.port, 8080);
        assert!(config.telegram.is_some());
        assert_eq!(config.symbols.len(), 1);
    }

    #[test]
    fn test_default_symbol_list_has_ten_pairs() {
        assert_eq!(DEFAULT_SYMBOLS.len(), 10);
        assert!(DEFAULT_SYMBOLS.contains(&"EUR/USD"));
        assert!(DEFAULT_SYMBOLS.iter().all(|s| s.contains('/')));
    }

    #[test]
    fn test_candle_count_floored_at_indicator_minimum() {
        env::set_var("CANDLE_COUNT", "10");
        let config = Config::from_env();
        env::remove_var("CANDLE_COUNT");

        assert_eq!(config.candle_count, MIN_CANDLES);
    }

    #[test]
    fn test_telegram_config_clone() {
        let config = TelegramConfig {
            bot_token: "t".to_string(),
            channel_id: "c".to_string(),
        };
        let cloned = config.clone();
        assert_eq!(cloned.bot_token, config.bot_token);
        assert_eq!(cloned.channel_id, config.channel_id);
    }
}
