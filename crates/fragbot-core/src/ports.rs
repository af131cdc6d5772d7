use async_trait::async_trait;

use crate::{
    classifier::Handle,
    domain::{FloorPrice, Listing, PriceSourceKind},
    Result,
};

/// Hexagonal port for a TON/USD price feed (CoinGecko, Binance, ...).
#[async_trait]
pub trait PriceSource: Send + Sync {
    fn kind(&self) -> PriceSourceKind;

    /// Current price of one TON in USD.
    async fn ton_usd(&self) -> Result<f64>;
}

/// What the username registry knows about a handle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegistryEntry {
    /// The registry page exists and was parsed.
    Listed(Listing),
    /// The page exists but carries no recognizable status header.
    Unrecognized,
}

/// Hexagonal port for the username registry (Fragment).
#[async_trait]
pub trait UsernameRegistry: Send + Sync {
    async fn lookup(&self, handle: &Handle) -> Result<RegistryEntry>;
}

/// Hexagonal port for a marketplace floor price (GetGems).
#[async_trait]
pub trait FloorPriceSource: Send + Sync {
    async fn floor_price(&self) -> Result<FloorPrice>;
}
