//! HTTP adapters (reqwest) for the `fragbot-core` ports.
//!
//! - CoinGecko / Binance: TON/USD price feeds
//! - Fragment: username registry pages
//! - GetGems: marketplace floor price

use fragbot_core::{config::Config, errors::Error, Result};

pub mod binance;
pub mod coingecko;
pub mod fragment;
pub mod getgems;

pub use binance::BinanceClient;
pub use coingecko::CoinGeckoClient;
pub use fragment::FragmentClient;
pub use getgems::GetGemsClient;

/// Build the one HTTP client shared by every adapter.
///
/// Redirects are not followed: Fragment answers unknown names with a redirect,
/// and the other APIs never redirect.
pub fn build_http_client(cfg: &Config) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(cfg.http_timeout)
        .user_agent(cfg.http_user_agent.clone())
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .map_err(|e| Error::Config(format!("http client build failed: {e}")))
}

pub(crate) fn map_transport(source_name: &'static str, e: reqwest::Error) -> Error {
    Error::Http(format!("{source_name} request error: {e}"))
}

/// Fail on non-2xx so callers only decode real payloads.
pub(crate) fn ensure_success(
    source_name: &'static str,
    resp: reqwest::Response,
) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        Ok(resp)
    } else {
        Err(Error::UpstreamStatus {
            source_name,
            status: status.as_u16(),
        })
    }
}

#[cfg(test)]
pub(crate) fn test_client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("reqwest client build")
}
