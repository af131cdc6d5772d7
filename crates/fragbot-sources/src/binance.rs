use async_trait::async_trait;
use serde::Deserialize;

use fragbot_core::{domain::PriceSourceKind, errors::Error, ports::PriceSource, Result};

use crate::{ensure_success, map_transport};

const SOURCE: &str = "binance";
pub const DEFAULT_BASE_URL: &str = "https://api.binance.com";

#[derive(Debug, Deserialize)]
struct TickerPrice {
    /// Binance quotes prices as decimal strings.
    price: String,
}

/// `GET /api/v3/ticker/price?symbol=TONUSDT`
#[derive(Clone, Debug)]
pub struct BinanceClient {
    http: reqwest::Client,
    base_url: String,
}

impl BinanceClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self::with_base_url(http, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl PriceSource for BinanceClient {
    fn kind(&self) -> PriceSourceKind {
        PriceSourceKind::Binance
    }

    async fn ton_usd(&self) -> Result<f64> {
        let url = format!("{}/api/v3/ticker/price", self.base_url);
        let resp = self
            .http
            .get(url)
            .query(&[("symbol", "TONUSDT")])
            .send()
            .await
            .map_err(|e| map_transport(SOURCE, e))?;

        let ticker: TickerPrice = ensure_success(SOURCE, resp)?
            .json()
            .await
            .map_err(|e| Error::malformed(SOURCE, e.to_string()))?;

        ticker
            .price
            .trim()
            .parse::<f64>()
            .map_err(|e| Error::malformed(SOURCE, format!("bad price {:?}: {e}", ticker.price)))
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::test_client;

    #[tokio::test]
    async fn parses_string_price() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/ticker/price"))
            .and(query_param("symbol", "TONUSDT"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                serde_json::json!({"symbol": "TONUSDT", "price": "5.43100000"}),
            ))
            .mount(&server)
            .await;

        let client = BinanceClient::with_base_url(test_client(), server.uri());
        assert_eq!(client.ton_usd().await.unwrap(), 5.431);
    }

    #[tokio::test]
    async fn non_numeric_price_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"price": "n/a"})),
            )
            .mount(&server)
            .await;

        let client = BinanceClient::with_base_url(test_client(), server.uri());
        assert!(matches!(
            client.ton_usd().await.unwrap_err(),
            Error::Malformed { .. }
        ));
    }

    #[tokio::test]
    async fn unreachable_host_is_http_error() {
        // Port 9 (discard) is closed on test hosts.
        let client = BinanceClient::with_base_url(test_client(), "http://127.0.0.1:9");
        assert!(matches!(client.ton_usd().await.unwrap_err(), Error::Http(_)));
    }
}
