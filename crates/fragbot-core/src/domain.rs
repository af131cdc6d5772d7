use chrono::{DateTime, Utc};

/// Upstream that produced a TON/USD rate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PriceSourceKind {
    CoinGecko,
    Binance,
}

impl PriceSourceKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::CoinGecko => "CoinGecko",
            Self::Binance => "Binance",
        }
    }

    /// Public page for the pair, used for keyboard links.
    pub fn page_url(self) -> &'static str {
        match self {
            Self::CoinGecko => "https://www.coingecko.com/en/coins/toncoin",
            Self::Binance => "https://www.binance.com/en/price/the-open-network",
        }
    }
}

/// A TON/USD rate fetched for one request.
#[derive(Clone, Debug, PartialEq)]
pub struct PriceQuote {
    pub usd_per_ton: f64,
    pub source: PriceSourceKind,
    pub fetched_at: DateTime<Utc>,
}

/// Registration status of a handle, as reported to the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Availability {
    Available,
    Taken,
    Invalid,
    Unknown,
}

/// Marketplace state shown in the Fragment page header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarketState {
    Available,
    OnAuction,
    ForSale,
    Sold,
    Taken,
    /// Fragment redirected away: the name is not on the marketplace.
    NotListed,
}

impl MarketState {
    /// Parse the header status text (`"On auction"`, `"Sold"`, ...).
    pub fn from_status_text(text: &str) -> Option<Self> {
        match text.trim().to_lowercase().as_str() {
            "available" => Some(Self::Available),
            "on auction" => Some(Self::OnAuction),
            "for sale" => Some(Self::ForSale),
            "sold" => Some(Self::Sold),
            "taken" => Some(Self::Taken),
            "unavailable" => Some(Self::NotListed),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::OnAuction => "on auction",
            Self::ForSale => "for sale",
            Self::Sold => "sold",
            Self::Taken => "taken",
            Self::NotListed => "unavailable",
        }
    }

    pub fn availability(self) -> Availability {
        match self {
            Self::Available => Availability::Available,
            Self::OnAuction | Self::ForSale | Self::Sold | Self::Taken | Self::NotListed => {
                Availability::Taken
            }
        }
    }
}

/// Price as displayed by Fragment (kept as text, Fragment already formats it).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PriceTag {
    pub ton: String,
    pub usd: Option<String>,
}

/// A wallet shown on a Fragment page (owner or latest bidder).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WalletRef {
    pub name: String,
    pub link: String,
}

/// Details scraped from a Fragment username page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Listing {
    pub state: MarketState,
    /// Asking price, minimum/highest bid or final sale price depending on `state`.
    pub price: Option<PriceTag>,
    /// Auctions only: true once someone has placed a bid.
    pub has_bids: bool,
    pub buy_now: Option<String>,
    pub ends_in: Option<String>,
    pub owner: Option<WalletRef>,
}

impl Listing {
    pub fn bare(state: MarketState) -> Self {
        Self {
            state,
            price: None,
            has_bids: false,
            buy_now: None,
            ends_in: None,
            owner: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UsernameStatus {
    pub handle: String,
    pub availability: Availability,
    pub listing: Option<Listing>,
}

impl UsernameStatus {
    pub fn invalid(handle: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            availability: Availability::Invalid,
            listing: None,
        }
    }

    pub fn unknown(handle: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            availability: Availability::Unknown,
            listing: None,
        }
    }

    pub fn from_listing(handle: impl Into<String>, listing: Listing) -> Self {
        Self {
            handle: handle.into(),
            availability: listing.state.availability(),
            listing: Some(listing),
        }
    }
}

/// Cheapest fixed-price item of a marketplace collection.
#[derive(Clone, Debug, PartialEq)]
pub struct FloorPrice {
    pub price_ton: f64,
    pub collection: String,
    pub item_name: Option<String>,
    pub item_address: Option<String>,
}

/// TON has 9 decimals on chain.
pub fn nano_to_ton(nano: u128) -> f64 {
    nano as f64 / 1_000_000_000.0
}

/// URL button attached to an inline result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkButton {
    pub text: String,
    pub url: String,
}

impl LinkButton {
    pub fn new(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            url: url.into(),
        }
    }
}

/// Messenger-agnostic inline result (an "article" in Bot API terms).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlineResult {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Telegram HTML.
    pub message_html: String,
    pub thumbnail_url: Option<String>,
    pub keyboard: Vec<Vec<LinkButton>>,
}

/// Everything the host framework needs to answer one inline query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlineAnswer {
    pub results: Vec<InlineResult>,
    /// Seconds Telegram may cache the answer.
    pub cache_time: u32,
}
