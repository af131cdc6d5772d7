/// Core error type for the bot.
///
/// Source adapters map transport and decoding failures into this type; the
/// fetchers in [`crate::fetchers`] turn every variant into a degraded result
/// so nothing reaches the Telegram layer.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("http error: {0}")]
    Http(String),

    #[error("{source_name} responded with status {status}")]
    UpstreamStatus { source_name: &'static str, status: u16 },

    #[error("malformed response from {source_name}: {reason}")]
    Malformed {
        source_name: &'static str,
        reason: String,
    },

    #[error("external error: {0}")]
    External(String),
}

impl Error {
    pub fn malformed(source_name: &'static str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            source_name,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
