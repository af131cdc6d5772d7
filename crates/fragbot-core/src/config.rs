use std::{env, path::PathBuf, time::Duration};

use crate::{errors::Error, Result};

/// Fragment numbers collection on GetGems (anonymous +888 numbers).
pub const DEFAULT_NUMBERS_COLLECTION: &str = "EQAOQdwdw8kGftJCSFgOErM1mBjYPe4DBPq8-AhF6vr9si5N";

/// GetGems and Fragment both reject requests without a browser-like agent.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:135.0) Gecko/20100101 Firefox/135.0";

/// Typed configuration for the bot.
#[derive(Clone, Debug)]
pub struct Config {
    pub telegram_bot_token: String,

    // Outbound HTTP
    pub http_timeout: Duration,
    pub http_user_agent: String,

    // Fragment
    pub fragment_request_delay: Duration,

    // GetGems
    pub numbers_collection: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        check_dotenv(dotenvy::dotenv())?;

        let telegram_bot_token = env_str("BOT_TOKEN")
            .and_then(non_empty)
            .or_else(|| env_str("TELEGRAM_BOT_TOKEN").and_then(non_empty))
            .ok_or_else(|| {
                Error::Config("BOT_TOKEN environment variable is required".to_string())
            })?;

        let http_timeout = Duration::from_millis(env_u64("HTTP_TIMEOUT_MS").unwrap_or(5_000));
        let http_user_agent = env_str("HTTP_USER_AGENT")
            .and_then(non_empty)
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());

        let fragment_request_delay =
            Duration::from_millis(env_u64("FRAGMENT_REQUEST_DELAY_MS").unwrap_or(500));

        let numbers_collection = env_str("GETGEMS_COLLECTION_ADDRESS")
            .and_then(non_empty)
            .unwrap_or_else(|| DEFAULT_NUMBERS_COLLECTION.to_string());

        Ok(Self {
            telegram_bot_token,
            http_timeout,
            http_user_agent,
            fragment_request_delay,
            numbers_collection,
        })
    }
}

/// A missing .env is fine; the process environment may carry everything.
/// A present but unreadable or malformed one is a config error.
fn check_dotenv(loaded: dotenvy::Result<PathBuf>) -> Result<()> {
    match loaded {
        Ok(_) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(Error::Config(format!(".env could not be loaded: {e}"))),
    }
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn env_u64(key: &str) -> Option<u64> {
    env_str(key).and_then(|s| s.trim().parse::<u64>().ok())
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s.trim().to_string())
    }
}
