//! Fetchers: the boundary where upstream failures become placeholders.
//!
//! Every fetcher returns a value the formatter can always render. Errors from
//! the ports are logged here and never returned.

use std::{sync::Arc, time::Duration};

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::{
    classifier::Handle,
    domain::{FloorPrice, PriceQuote, UsernameStatus},
    ports::{FloorPriceSource, PriceSource, RegistryEntry, UsernameRegistry},
};

/// Primary source with a single fallback.
#[derive(Clone)]
pub struct PriceFetcher {
    primary: Arc<dyn PriceSource>,
    secondary: Arc<dyn PriceSource>,
}

impl PriceFetcher {
    pub fn new(primary: Arc<dyn PriceSource>, secondary: Arc<dyn PriceSource>) -> Self {
        Self { primary, secondary }
    }

    /// `None` means "price unavailable": both sources failed.
    pub async fn fetch(&self) -> Option<PriceQuote> {
        for source in [&self.primary, &self.secondary] {
            let kind = source.kind();
            match source.ton_usd().await {
                Ok(rate) if rate.is_finite() && rate > 0.0 => {
                    let usd_per_ton = round_to(rate, 4);
                    info!(source = kind.label(), usd_per_ton, "TON rate fetched");
                    return Some(PriceQuote {
                        usd_per_ton,
                        source: kind,
                        fetched_at: Utc::now(),
                    });
                }
                Ok(rate) => warn!(source = kind.label(), rate, "ignoring non-positive TON rate"),
                Err(e) => warn!(source = kind.label(), error = %e, "TON rate fetch failed"),
            }
        }
        None
    }
}

#[derive(Clone)]
pub struct UsernameChecker {
    registry: Arc<dyn UsernameRegistry>,
    request_delay: Duration,
}

impl UsernameChecker {
    pub fn new(registry: Arc<dyn UsernameRegistry>, request_delay: Duration) -> Self {
        Self {
            registry,
            request_delay,
        }
    }

    /// Invalid handles are answered locally; anything the registry cannot
    /// answer becomes `Unknown`.
    pub async fn check(&self, candidate: &str) -> UsernameStatus {
        let Some(handle) = Handle::parse(candidate) else {
            debug!(candidate, "rejecting invalid handle");
            return UsernameStatus::invalid(candidate);
        };

        // Typing produces a query per keystroke; give the user a moment to finish.
        if !self.request_delay.is_zero() {
            tokio::time::sleep(self.request_delay).await;
        }

        match self.registry.lookup(&handle).await {
            Ok(RegistryEntry::Listed(listing)) => {
                debug!(handle = %handle, state = listing.state.label(), "username looked up");
                UsernameStatus::from_listing(handle.as_str(), listing)
            }
            Ok(RegistryEntry::Unrecognized) => {
                warn!(handle = %handle, "registry page has no status header");
                UsernameStatus::unknown(handle.as_str())
            }
            Err(e) => {
                warn!(handle = %handle, error = %e, "username lookup failed");
                UsernameStatus::unknown(handle.as_str())
            }
        }
    }
}

#[derive(Clone)]
pub struct FloorPriceFetcher {
    source: Arc<dyn FloorPriceSource>,
}

impl FloorPriceFetcher {
    pub fn new(source: Arc<dyn FloorPriceSource>) -> Self {
        Self { source }
    }

    pub async fn fetch(&self) -> Option<FloorPrice> {
        match self.source.floor_price().await {
            Ok(floor) if floor.price_ton.is_finite() && floor.price_ton >= 0.0 => {
                info!(price_ton = floor.price_ton, item = ?floor.item_name, "floor price fetched");
                Some(floor)
            }
            Ok(floor) => {
                warn!(price_ton = floor.price_ton, "ignoring invalid floor price");
                None
            }
            Err(e) => {
                warn!(error = %e, "floor price fetch failed");
                None
            }
        }
    }
}

fn round_to(v: f64, places: i32) -> f64 {
    let m = 10f64.powi(places);
    (v * m).round() / m
}

#[cfg(test)]
pub(crate) mod fakes {
    //! Scripted port implementations shared by fetcher and dispatcher tests.

    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    };

    use async_trait::async_trait;

    use crate::{
        classifier::Handle,
        domain::{FloorPrice, PriceSourceKind},
        errors::Error,
        ports::{FloorPriceSource, PriceSource, RegistryEntry, UsernameRegistry},
        Result,
    };

    pub struct FakePrice {
        pub kind: PriceSourceKind,
        pub rate: Option<f64>,
        pub calls: AtomicUsize,
    }

    impl FakePrice {
        pub fn ok(kind: PriceSourceKind, rate: f64) -> Self {
            Self {
                kind,
                rate: Some(rate),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn down(kind: PriceSourceKind) -> Self {
            Self {
                kind,
                rate: None,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PriceSource for FakePrice {
        fn kind(&self) -> PriceSourceKind {
            self.kind
        }

        async fn ton_usd(&self) -> Result<f64> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.rate
                .ok_or_else(|| Error::Http("connection refused".to_string()))
        }
    }

    #[derive(Default)]
    pub struct FakeRegistry {
        pub entry: Option<RegistryEntry>,
        pub seen: Mutex<Vec<String>>,
    }

    impl FakeRegistry {
        pub fn answering(entry: RegistryEntry) -> Self {
            Self {
                entry: Some(entry),
                seen: Mutex::new(Vec::new()),
            }
        }

        pub fn lookups(&self) -> Vec<String> {
            self.seen.lock().map(|v| v.clone()).unwrap_or_default()
        }
    }

    #[async_trait]
    impl UsernameRegistry for FakeRegistry {
        async fn lookup(&self, handle: &Handle) -> Result<RegistryEntry> {
            if let Ok(mut seen) = self.seen.lock() {
                seen.push(handle.to_string());
            }
            self.entry
                .clone()
                .ok_or_else(|| Error::Http("timed out".to_string()))
        }
    }

    pub struct FakeFloor(pub Option<FloorPrice>);

    #[async_trait]
    impl FloorPriceSource for FakeFloor {
        async fn floor_price(&self) -> Result<FloorPrice> {
            self.0.clone().ok_or_else(|| Error::UpstreamStatus {
                source_name: "getgems",
                status: 503,
            })
        }
    }

    pub fn numbers_floor(price_ton: f64) -> FloorPrice {
        FloorPrice {
            price_ton,
            collection: "EQ-numbers".to_string(),
            item_name: Some("+888 0000 1234".to_string()),
            item_address: Some("EQ-item".to_string()),
        }
    }
}
