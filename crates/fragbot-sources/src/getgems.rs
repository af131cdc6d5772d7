//! GetGems marketplace: cheapest fixed-price item of a collection.
//!
//! Uses the persisted `nftSearch` GraphQL query the getgems.io frontend sends.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use fragbot_core::{
    domain::{nano_to_ton, FloorPrice},
    errors::Error,
    ports::FloorPriceSource,
    Result,
};

use crate::{ensure_success, map_transport};

const SOURCE: &str = "getgems";
pub const DEFAULT_BASE_URL: &str = "https://getgems.io";
const NFT_SEARCH_HASH: &str = "0a50a6e37a860bc3a75f3318946b487bbeedd57febc690c0b5b9ddd2302604af";

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<SearchData>,
    errors: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct SearchData {
    #[serde(rename = "alphaNftItemSearch")]
    search: Option<Connection>,
}

#[derive(Debug, Deserialize)]
struct Connection {
    #[serde(default)]
    edges: Vec<Edge>,
}

#[derive(Debug, Deserialize)]
struct Edge {
    node: Option<NftItem>,
}

#[derive(Debug, Deserialize)]
struct NftItem {
    name: Option<String>,
    address: Option<String>,
    sale: Option<Sale>,
}

#[derive(Debug, Deserialize)]
struct Sale {
    #[serde(rename = "__typename")]
    typename: Option<String>,
    /// nanoTON, usually as a decimal string.
    #[serde(rename = "fullPrice")]
    full_price: Option<Value>,
}

#[derive(Clone, Debug)]
pub struct GetGemsClient {
    http: reqwest::Client,
    base_url: String,
    collection: String,
}

impl GetGemsClient {
    pub fn new(http: reqwest::Client, collection: impl Into<String>) -> Self {
        Self::with_base_url(http, DEFAULT_BASE_URL, collection)
    }

    pub fn with_base_url(
        http: reqwest::Client,
        base_url: impl Into<String>,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            collection: collection.into(),
        }
    }

    fn search_request(&self) -> Value {
        let filter = json!({
            "$and": [
                { "collectionAddress": self.collection },
                { "saleType": "fix_price" },
            ]
        });
        let sort = json!([
            { "fixPrice": { "order": "asc" } },
            { "index": { "order": "asc" } },
        ]);

        // `query` and `sort` are JSON documents passed as strings.
        json!({
            "operationName": "nftSearch",
            "variables": {
                "query": filter.to_string(),
                "attributes": null,
                "sort": sort.to_string(),
                "count": 1,
            },
            "extensions": {
                "persistedQuery": { "version": 1, "sha256Hash": NFT_SEARCH_HASH }
            }
        })
    }
}

#[async_trait]
impl FloorPriceSource for GetGemsClient {
    async fn floor_price(&self) -> Result<FloorPrice> {
        let url = format!("{}/graphql/", self.base_url);
        let resp = self
            .http
            .post(url)
            .header("x-gg-client", "v:1 l:en")
            .json(&self.search_request())
            .send()
            .await
            .map_err(|e| map_transport(SOURCE, e))?;

        let body: GraphQlResponse = ensure_success(SOURCE, resp)?
            .json()
            .await
            .map_err(|e| Error::malformed(SOURCE, e.to_string()))?;

        parse_floor(body, &self.collection)
    }
}

fn parse_floor(body: GraphQlResponse, collection: &str) -> Result<FloorPrice> {
    if let Some(errors) = body.errors {
        return Err(Error::malformed(SOURCE, format!("graphql errors: {errors}")));
    }

    let item = body
        .data
        .and_then(|d| d.search)
        .and_then(|c| c.edges.into_iter().next())
        .and_then(|e| e.node)
        .ok_or_else(|| Error::malformed(SOURCE, "no items in search result"))?;

    let sale = item
        .sale
        .ok_or_else(|| Error::malformed(SOURCE, "cheapest item has no sale"))?;
    if sale.typename.as_deref() != Some("NftSaleFixPrice") {
        warn!(sale_type = ?sale.typename, "unexpected getgems sale type");
    }

    let nano = match sale.full_price {
        Some(Value::String(s)) => s.trim().parse::<u128>().ok(),
        Some(Value::Number(n)) => n.as_u64().map(u128::from),
        _ => None,
    }
    .ok_or_else(|| Error::malformed(SOURCE, "missing or non-integer fullPrice"))?;

    Ok(FloorPrice {
        price_ton: nano_to_ton(nano),
        collection: collection.to_string(),
        item_name: item.name,
        item_address: item.address,
    })
}
