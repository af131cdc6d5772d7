//! Fragment username pages (`https://fragment.com/username/{handle}`).
//!
//! Fragment has no public API; the page header carries the status and the
//! tables below it carry prices, bids and wallets.

use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use select::{
    document::Document,
    node::Node,
    predicate::{Class, Name, Predicate},
};
use tracing::debug;

use fragbot_core::{
    classifier::Handle,
    domain::{Listing, MarketState, PriceTag, WalletRef},
    errors::Error,
    formatting::format_integer,
    ports::{RegistryEntry, UsernameRegistry},
    Result,
};

use crate::map_transport;

const SOURCE: &str = "fragment";
pub const DEFAULT_BASE_URL: &str = "https://fragment.com";

#[derive(Clone, Debug)]
pub struct FragmentClient {
    http: reqwest::Client,
    base_url: String,
}

impl FragmentClient {
    /// `http` must not follow redirects (see [`crate::build_http_client`]).
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
impl UsernameRegistry for FragmentClient {
    async fn lookup(&self, handle: &Handle) -> Result<RegistryEntry> {
        let url = format!("{}/username/{}", self.base_url, handle);
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| map_transport(SOURCE, e))?;

        let status = resp.status();
        if status.is_redirection() {
            // Fragment bounces names it does not list back to the search page.
            debug!(handle = %handle, status = status.as_u16(), "fragment redirected");
            return Ok(RegistryEntry::Listed(Listing::bare(MarketState::NotListed)));
        }
        if !status.is_success() {
            return Err(Error::UpstreamStatus {
                source_name: SOURCE,
                status: status.as_u16(),
            });
        }

        let html = resp.text().await.map_err(|e| map_transport(SOURCE, e))?;
        Ok(parse_username_page(&html))
    }
}

pub fn parse_username_page(html: &str) -> RegistryEntry {
    let doc = Document::from(html);

    let Some(state) = doc
        .find(Class("tm-section-header-status"))
        .next()
        .and_then(|n| MarketState::from_status_text(&n.text()))
    else {
        return RegistryEntry::Unrecognized;
    };

    let mut listing = Listing::bare(state);
    match state {
        MarketState::Available => {
            listing.price = bid_section_price(&doc);
        }
        MarketState::OnAuction => {
            // A minimum-bid table is only shown until the first bid lands.
            let minimum = table_price(&doc, "Minimum Bid");
            listing.has_bids = minimum.is_none();
            listing.price = table_price(&doc, "Highest Bid").or(minimum);
            listing.buy_now = buy_now_amount(&doc);
            listing.ends_in = countdown(&doc);
            listing.owner = latest_bidder(&doc);
        }
        MarketState::ForSale => {
            // The asking price is the buy-now amount; no separate price row.
            listing.buy_now = buy_now_amount(&doc);
            listing.ends_in = countdown(&doc);
            listing.owner = latest_bidder(&doc);
        }
        MarketState::Sold => {
            let sale = table_with_header(&doc, "Sale Price");
            listing.price = sale.and_then(|t| first_cell_price(&t));
            listing.owner = sale.and_then(|t| t.find(wallet_link()).next().and_then(wallet_ref));
        }
        MarketState::Taken | MarketState::NotListed => {}
    }

    RegistryEntry::Listed(listing)
}

fn wallet_link() -> impl Predicate {
    Name("a").and(Class("tm-wallet"))
}

fn text_of(node: Node) -> Option<String> {
    let t = node.text().trim().to_string();
    (!t.is_empty()).then_some(t)
}

/// `"~ $28,350"` → `"28,350"`.
fn usd_amount(text: &str) -> Option<String> {
    static USD: OnceLock<Regex> = OnceLock::new();
    let re = USD.get_or_init(|| Regex::new(r"\$([0-9][0-9,.]*)").expect("valid regex"));
    re.captures(text).map(|c| c[1].to_string())
}

fn bid_section_price(doc: &Document) -> Option<PriceTag> {
    let ton = doc
        .find(Class("tm-section-bid").descendant(Class("table-cell-value")))
        .next()
        .and_then(text_of)?;
    let usd = doc
        .find(Class("tm-section-bid").descendant(Class("table-cell-desc")))
        .next()
        .and_then(|n| usd_amount(&n.text()));
    Some(PriceTag { ton, usd })
}

fn table_with_header<'a>(doc: &'a Document, header: &str) -> Option<Node<'a>> {
    doc.find(Name("table"))
        .find(|table| table.find(Name("th")).any(|th| th.text().contains(header)))
}

fn first_cell_price(table: &Node) -> Option<PriceTag> {
    let cell = table.find(Name("td")).next()?;
    let ton = cell
        .find(Class("table-cell-value"))
        .next()
        .and_then(text_of)?;
    let usd = cell
        .find(Class("table-cell-desc"))
        .next()
        .and_then(|n| usd_amount(&n.text()));
    Some(PriceTag { ton, usd })
}

fn table_price(doc: &Document, header: &str) -> Option<PriceTag> {
    table_with_header(doc, header).and_then(|t| first_cell_price(&t))
}

/// The "Buy it now" button carries the raw amount in `data-bid-amount`.
fn buy_now_amount(doc: &Document) -> Option<String> {
    let button = doc.find(Class("js-buy-now-btn")).next()?;
    let raw = button.attr("data-bid-amount")?.replace(',', "");
    let amount = raw.trim().parse::<u64>().ok()?;
    Some(
        button
            .find(Class("tm-amount"))
            .next()
            .and_then(text_of)
            .unwrap_or_else(|| format_integer(amount)),
    )
}

/// Countdown digits live in `data-val` attributes: `2d 3h 4m`, or `3h 4m` under a day.
fn countdown(doc: &Document) -> Option<String> {
    let timer = doc
        .find(Class("tm-section-countdown").descendant(Name("time")))
        .next()?;

    let digit = |class: &'static str| -> String {
        timer
            .find(Class(class))
            .next()
            .and_then(|n| n.attr("data-val"))
            .unwrap_or("0")
            .chars()
            .filter(char::is_ascii_digit)
            .collect()
    };
    let number = |s: String| s.parse::<u32>().unwrap_or(0);

    let days = number(digit("timer-d"));
    let hours = number(digit("timer-h0") + &digit("timer-h1"));
    let mins = number(digit("timer-m0") + &digit("timer-m1"));

    Some(if days == 0 {
        format!("{hours}h {mins}m")
    } else {
        format!("{days}d {hours}h {mins}m")
    })
}

fn latest_bidder(doc: &Document) -> Option<WalletRef> {
    let row = doc
        .find(
            Class("tm-table-wrap")
                .descendant(Name("tbody"))
                .descendant(Name("tr")),
        )
        .next()?;
    let last_cell = row.find(Name("td")).last()?;
    last_cell.find(wallet_link()).next().and_then(wallet_ref)
}

/// Wallet display name: a short name (`durov.t.me`) when Fragment shows one,
/// else the address abbreviated to `EQabc...vwxyz`.
fn wallet_ref(link: Node) -> Option<WalletRef> {
    let href = link.attr("href")?.to_string();

    let name = if let Some(short) = link.find(Name("span").and(Class("short"))).next() {
        short.text().trim().to_string()
    } else {
        let head = link
            .find(Name("span").and(Class("head")))
            .next()
            .map(|n| n.text().trim().to_string())
            .unwrap_or_default();
        let tail = link
            .find(Name("span").and(Class("tail")))
            .next()
            .map(|n| n.text().trim().to_string())
            .unwrap_or_default();
        if head.is_empty() && tail.is_empty() {
            "Unknown Owner".to_string()
        } else {
            let head: String = head.chars().take(5).collect();
            let tail_len = tail.chars().count();
            let tail: String = tail.chars().skip(tail_len.saturating_sub(5)).collect();
            format!("{head}...{tail}")
        }
    };

    Some(WalletRef { name, link: href })
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::test_client;

    const AUCTION_WITH_BIDS: &str = r#"
<html><body>
<div class="tm-section-header">
  <h2>@durov</h2><span class="tm-section-header-status tm-status-auction">On auction</span>
</div>
<section class="tm-section-countdown">
  <time class="tm-countdown-timer">
    <span class="digit timer-d" data-val="2 days"></span>
    <span class="digit timer-h0" data-val="0"></span><span class="digit timer-h1" data-val="3"></span>
    <span class="digit timer-m0" data-val="0"></span><span class="digit timer-m1" data-val="4"></span>
  </time>
</section>
<table class="table tm-table">
  <thead><tr><th>Highest Bid</th><th>Bid Step</th></tr></thead>
  <tbody><tr><td>
    <div class="table-cell-value tm-value icon-before icon-ton">5,250</div>
    <div class="table-cell-desc">~ $28,350</div>
  </td><td>5%</td></tr></tbody>
</table>
<button class="btn btn-primary js-buy-now-btn" data-bid-amount="100000">Buy for <span class="tm-amount">100,000</span></button>
<div class="tm-table-wrap"><table class="table tm-table">
  <thead><tr><th>Price</th><th>Date</th><th>Bidder</th></tr></thead>
  <tbody>
    <tr><td>5,250</td><td>today</td><td><a class="tm-wallet" href="https://tonviewer.com/EQlatest"><span class="short">pavel.t.me</span></a></td></tr>
    <tr><td>5,000</td><td>yesterday</td><td><a class="tm-wallet" href="https://tonviewer.com/EQolder"><span class="short">older.t.me</span></a></td></tr>
  </tbody>
</table></div>
</body></html>
"#;

    const AUCTION_WITHOUT_BIDS: &str = r#"
<html><body>
<span class="tm-section-header-status">On auction</span>
<table>
  <thead><tr><th>Minimum Bid</th></tr></thead>
  <tbody><tr><td>
    <div class="table-cell-value">10</div><div class="table-cell-desc">~ $54</div>
  </td></tr></tbody>
</table>
<section class="tm-section-countdown"><time>
  <span class="timer-d" data-val="0 days"></span>
  <span class="timer-h0" data-val="1"></span><span class="timer-h1" data-val="2"></span>
  <span class="timer-m0" data-val="3"></span><span class="timer-m1" data-val="0"></span>
</time></section>
</body></html>
"#;

    const SOLD: &str = r#"
<html><body>
<span class="tm-section-header-status">Sold</span>
<table>
  <thead><tr><th>Sale Price</th><th>Date</th><th>Buyer</th></tr></thead>
  <tbody><tr>
    <td><div class="table-cell-value">1,000</div></td>
    <td>2024</td>
    <td><a class="tm-wallet" href="https://tonviewer.com/EQbuyer"><span class="head">EQAbcdefgh</span><span class="tail">uvwxyz12345</span></a></td>
  </tr></tbody>
</table>
</body></html>
"#;

    const AVAILABLE: &str = r#"
<html><body>
<span class="tm-section-header-status">Available</span>
<section class="tm-section-bid">
  <div class="table-cell-value tm-value">20</div>
  <div class="table-cell-desc">~ $108</div>
</section>
</body></html>
"#;

    const FOR_SALE: &str = r#"
<html><body>
<span class="tm-section-header-status">For sale</span>
<section class="tm-section-bid">
  <div class="table-cell-value tm-value">500</div>
  <div class="table-cell-desc">~ $2,700</div>
  <button class="btn btn-primary js-buy-now-btn" data-bid-amount="500">Buy for <span class="tm-amount">500</span></button>
</section>
<section class="tm-section-countdown"><time>
  <span class="timer-d" data-val="5 days"></span>
  <span class="timer-h0" data-val="0"></span><span class="timer-h1" data-val="6"></span>
  <span class="timer-m0" data-val="1"></span><span class="timer-m1" data-val="5"></span>
</time></section>
<div class="tm-table-wrap"><table>
  <thead><tr><th>Price</th><th>Date</th><th>Seller</th></tr></thead>
  <tbody><tr><td>480</td><td>2024</td><td><a class="tm-wallet" href="https://tonviewer.com/EQseller"><span class="short">seller.t.me</span></a></td></tr></tbody>
</table></div>
</body></html>
"#;

    const TAKEN: &str = r#"
<html><body>
<span class="tm-section-header-status">Taken</span>
<section class="tm-section-bid"><div class="table-cell-value">1</div></section>
</body></html>
"#;

    fn listing(html: &str) -> Listing {
        match parse_username_page(html) {
            RegistryEntry::Listed(l) => l,
            other => panic!("expected listing, got {other:?}"),
        }
    }

    #[test]
    fn parses_auction_with_bids() {
        let l = listing(AUCTION_WITH_BIDS);
        assert_eq!(l.state, MarketState::OnAuction);
        assert!(l.has_bids);
        assert_eq!(
            l.price,
            Some(PriceTag {
                ton: "5,250".to_string(),
                usd: Some("28,350".to_string())
            })
        );
        assert_eq!(l.buy_now.as_deref(), Some("100,000"));
        assert_eq!(l.ends_in.as_deref(), Some("2d 3h 4m"));
        assert_eq!(
            l.owner,
            Some(WalletRef {
                name: "pavel.t.me".to_string(),
                link: "https://tonviewer.com/EQlatest".to_string()
            })
        );
    }

    #[test]
    fn parses_auction_without_bids() {
        let l = listing(AUCTION_WITHOUT_BIDS);
        assert!(!l.has_bids);
        assert_eq!(l.price.as_ref().map(|p| p.ton.as_str()), Some("10"));
        assert_eq!(l.ends_in.as_deref(), Some("12h 30m"));
        assert!(l.owner.is_none());
        assert!(l.buy_now.is_none());
    }

    #[test]
    fn auction_without_minimum_bid_table_has_bids() {
        let html = r#"<span class="tm-section-header-status">On auction</span>"#;
        let l = listing(html);
        assert!(l.has_bids);
        assert!(l.price.is_none());
    }

    #[test]
    fn parses_for_sale_as_buy_now_only() {
        let l = listing(FOR_SALE);
        assert_eq!(l.state, MarketState::ForSale);
        assert!(l.price.is_none());
        assert!(!l.has_bids);
        assert_eq!(l.buy_now.as_deref(), Some("500"));
        assert_eq!(l.ends_in.as_deref(), Some("5d 6h 15m"));
        assert_eq!(
            l.owner,
            Some(WalletRef {
                name: "seller.t.me".to_string(),
                link: "https://tonviewer.com/EQseller".to_string()
            })
        );
    }

    #[test]
    fn taken_page_carries_no_details() {
        assert_eq!(listing(TAKEN), Listing::bare(MarketState::Taken));
    }

    #[test]
    fn parses_sold_with_abbreviated_wallet() {
        let l = listing(SOLD);
        assert_eq!(l.state, MarketState::Sold);
        assert_eq!(l.price.as_ref().map(|p| p.ton.as_str()), Some("1,000"));
        let owner = l.owner.unwrap();
        assert_eq!(owner.name, "EQAbc...12345");
        assert_eq!(owner.link, "https://tonviewer.com/EQbuyer");
    }

    #[test]
    fn parses_available_price() {
        let l = listing(AVAILABLE);
        assert_eq!(l.state, MarketState::Available);
        assert_eq!(
            l.price,
            Some(PriceTag {
                ton: "20".to_string(),
                usd: Some("108".to_string())
            })
        );
    }

    #[test]
    fn page_without_status_is_unrecognized() {
        assert_eq!(
            parse_username_page("<html><body><h1>Maintenance</h1></body></html>"),
            RegistryEntry::Unrecognized
        );
    }

    #[tokio::test]
    async fn redirect_means_not_listed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/username/telegram"))
            .respond_with(ResponseTemplate::new(302).insert_header("Location", "/"))
            .mount(&server)
            .await;

        let client = FragmentClient::with_base_url(test_client(), server.uri());
        let handle = Handle::parse("telegram").unwrap();
        assert_eq!(
            client.lookup(&handle).await.unwrap(),
            RegistryEntry::Listed(Listing::bare(MarketState::NotListed))
        );
    }

    #[tokio::test]
    async fn fetches_and_parses_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/username/durov"))
            .respond_with(ResponseTemplate::new(200).set_body_string(AUCTION_WITH_BIDS))
            .mount(&server)
            .await;

        let client = FragmentClient::with_base_url(test_client(), server.uri());
        let handle = Handle::parse("durov").unwrap();
        match client.lookup(&handle).await.unwrap() {
            RegistryEntry::Listed(l) => assert_eq!(l.state, MarketState::OnAuction),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn server_error_is_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let client = FragmentClient::with_base_url(test_client(), server.uri());
        let handle = Handle::parse("durov").unwrap();
        assert!(matches!(
            client.lookup(&handle).await.unwrap_err(),
            Error::UpstreamStatus { status: 502, .. }
        ));
    }
}
