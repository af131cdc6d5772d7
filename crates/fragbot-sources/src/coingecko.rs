use async_trait::async_trait;
use serde::Deserialize;

use fragbot_core::{domain::PriceSourceKind, errors::Error, ports::PriceSource, Result};

use crate::{ensure_success, map_transport};

const SOURCE: &str = "coingecko";
pub const DEFAULT_BASE_URL: &str = "https://api.coingecko.com";

#[derive(Debug, Deserialize)]
struct SimplePrice {
    #[serde(rename = "the-open-network")]
    ton: Option<UsdPrice>,
}

#[derive(Debug, Deserialize)]
struct UsdPrice {
    usd: Option<f64>,
}

/// `GET /api/v3/simple/price?ids=the-open-network&vs_currencies=usd`
#[derive(Clone, Debug)]
pub struct CoinGeckoClient {
    http: reqwest::Client,
    base_url: String,
}

impl CoinGeckoClient {
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
impl PriceSource for CoinGeckoClient {
    fn kind(&self) -> PriceSourceKind {
        PriceSourceKind::CoinGecko
    }

    async fn ton_usd(&self) -> Result<f64> {
        let url = format!("{}/api/v3/simple/price", self.base_url);
        let resp = self
            .http
            .get(url)
            .query(&[("ids", "the-open-network"), ("vs_currencies", "usd")])
            .send()
            .await
            .map_err(|e| map_transport(SOURCE, e))?;

        let body: SimplePrice = ensure_success(SOURCE, resp)?
            .json()
            .await
            .map_err(|e| Error::malformed(SOURCE, e.to_string()))?;

        body.ton
            .and_then(|p| p.usd)
            .ok_or_else(|| Error::malformed(SOURCE, "missing the-open-network.usd"))
    }
}
