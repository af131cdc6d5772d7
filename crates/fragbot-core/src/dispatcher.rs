use tracing::debug;

use crate::{
    classifier::{classify, QueryKind},
    domain::{Availability, InlineAnswer},
    fetchers::{FloorPriceFetcher, PriceFetcher, UsernameChecker},
    formatter,
};

/// Cache hints (seconds) handed back to Telegram with each answer.
pub mod cache_time {
    pub const GENERAL_INFO: u32 = 5;
    pub const CONVERSION: u32 = 30;
    pub const USERNAME: u32 = 300;
    pub const INVALID: u32 = 300;
    pub const ERROR: u32 = 5;
}

/// Per-query orchestration: classify, fetch, format.
///
/// Holds no mutable state; one instance is shared by every concurrent query.
#[derive(Clone)]
pub struct InlineDispatcher {
    prices: PriceFetcher,
    usernames: UsernameChecker,
    floor: FloorPriceFetcher,
}

impl InlineDispatcher {
    pub fn new(prices: PriceFetcher, usernames: UsernameChecker, floor: FloorPriceFetcher) -> Self {
        Self {
            prices,
            usernames,
            floor,
        }
    }

    /// Always returns at least one result; failed sources degrade to placeholders.
    pub async fn dispatch(&self, query: &str) -> InlineAnswer {
        let kind = classify(query);
        debug!(?kind, "inline query classified");

        match kind {
            QueryKind::GeneralInfo => {
                let (quote, floor) = tokio::join!(self.prices.fetch(), self.floor.fetch());
                InlineAnswer {
                    results: vec![
                        formatter::welcome_result(),
                        formatter::ton_rate_result(quote.as_ref()),
                        formatter::floor_price_result(floor.as_ref(), quote.as_ref()),
                    ],
                    cache_time: cache_time::GENERAL_INFO,
                }
            }
            QueryKind::Conversion(amount) => {
                let quote = self.prices.fetch().await;
                let cache_time = if quote.is_some() {
                    cache_time::CONVERSION
                } else {
                    cache_time::ERROR
                };
                InlineAnswer {
                    results: vec![formatter::conversion_result(amount, quote.as_ref())],
                    cache_time,
                }
            }
            QueryKind::UsernameCheck(candidate) => {
                let status = self.usernames.check(&candidate).await;
                let cache_time = match status.availability {
                    Availability::Available | Availability::Taken => cache_time::USERNAME,
                    Availability::Invalid => cache_time::INVALID,
                    Availability::Unknown => cache_time::ERROR,
                };
                InlineAnswer {
                    results: vec![formatter::username_result(&status)],
                    cache_time,
                }
            }
        }
    }
}
