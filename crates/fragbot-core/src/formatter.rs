//! Inline result builders.
//!
//! Pure functions: the same inputs always produce the same results.

use crate::{
    domain::{
        Availability, FloorPrice, InlineResult, LinkButton, Listing, MarketState, PriceQuote,
        UsernameStatus,
    },
    formatting::{escape_html, format_number, DEFAULT_DECIMAL_PLACES, TON_DECIMAL_PLACES},
};

pub const FRAGMENT_THUMBNAIL_URL: &str =
    "https://storage.getblock.io/web/web/images/marketplace/Fragment/photo_2024-07-23_22-06-50.jpg";
pub const TON_THUMBNAIL_URL: &str =
    "https://pbs.twimg.com/profile_images/1602985148219260928/VC-Mraev_400x400.jpg";

fn article(
    id: &str,
    title: impl Into<String>,
    description: impl Into<String>,
    message_html: impl Into<String>,
    thumbnail_url: &str,
) -> InlineResult {
    InlineResult {
        id: id.to_string(),
        title: title.into(),
        description: description.into(),
        message_html: message_html.into(),
        thumbnail_url: Some(thumbnail_url.to_string()),
        keyboard: Vec::new(),
    }
}

// ============== Prices ==============

fn rate_text(quote: &PriceQuote) -> String {
    format!("${}", format_number(quote.usd_per_ton, TON_DECIMAL_PLACES))
}

fn price_keyboard(quote: &PriceQuote) -> Vec<Vec<LinkButton>> {
    vec![vec![LinkButton::new(
        format!("{}: {}", quote.source.label(), rate_text(quote)),
        quote.source.page_url(),
    )]]
}

pub fn price_unavailable_result() -> InlineResult {
    article(
        "price_error",
        "⚠️ Price Data Unavailable",
        "Unable to fetch current TON price. Please try again later.",
        "⚠️ <b>Price Data Unavailable</b>\n\nUnable to fetch current TON price. Please try again later.",
        TON_THUMBNAIL_URL,
    )
}

/// Both directions at once: `amount` USD in TON and `amount` TON in USD.
pub fn conversion_result(amount: f64, quote: Option<&PriceQuote>) -> InlineResult {
    let Some(quote) = quote else {
        return price_unavailable_result();
    };

    let rate = quote.usd_per_ton;
    let ton_for_usd = amount / rate;
    let usd_for_ton = amount * rate;
    // Same precision as the TON figure so sub-cent amounts are not shown as 0.
    let amount_text = format_number(amount, TON_DECIMAL_PLACES);

    let message = format!(
        "💵 ${amount_text} = <b>{} TON</b>\n💎 {amount_text} TON = <b>${}</b>",
        format_number(ton_for_usd, TON_DECIMAL_PLACES),
        format_number(usd_for_ton, DEFAULT_DECIMAL_PLACES),
    );

    let mut result = article(
        "price_conversion",
        format!("💱 USD ⇆ TON: {amount_text}"),
        format!("💎 1 TON = {}", rate_text(quote)),
        message,
        TON_THUMBNAIL_URL,
    );
    result.keyboard = price_keyboard(quote);
    result
}

pub fn ton_rate_result(quote: Option<&PriceQuote>) -> InlineResult {
    let Some(quote) = quote else {
        let mut result = price_unavailable_result();
        result.id = "ton_rate".to_string();
        result.title = "⚠️ TON Rate Unavailable".to_string();
        result.description = "Unable to fetch current TON price".to_string();
        return result;
    };

    let mut result = article(
        "ton_rate",
        format!("TON Rate: {}", rate_text(quote)),
        "Enter a number to convert between USD and TON",
        format!("💎 <b>Current TON Rate</b>\n1 TON = {}", rate_text(quote)),
        TON_THUMBNAIL_URL,
    );
    result.keyboard = price_keyboard(quote);
    result
}

// ============== Floor price ==============

/// `"+888 0123 4567"` → `"+88801234567"` for `t.me` links.
fn number_slug(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, ' ' | '(' | ')' | '-'))
        .collect()
}

fn floor_keyboard(floor: &FloorPrice) -> Vec<Vec<LinkButton>> {
    let mut rows = Vec::new();
    if let Some(name) = floor.item_name.as_deref().filter(|n| !n.trim().is_empty()) {
        rows.push(vec![LinkButton::new(
            format!("📲 {name}"),
            format!("https://t.me/{}", number_slug(name)),
        )]);
    }
    if let Some(address) = floor.item_address.as_deref().filter(|a| !a.is_empty()) {
        rows.push(vec![
            LinkButton::new(
                "🔍 getgems.io",
                format!(
                    "https://getgems.io/collection/{}/{address}",
                    floor.collection
                ),
            ),
            LinkButton::new("🛒 marketapp.ws", format!("https://marketapp.ws/{address}")),
        ]);
    }
    rows
}

pub fn floor_price_result(floor: Option<&FloorPrice>, quote: Option<&PriceQuote>) -> InlineResult {
    let Some(floor) = floor else {
        return article(
            "number_floor_price",
            "Number Floor Price Unavailable",
            "Unable to fetch the current floor price for Fragment numbers",
            "⚠️ <b>Fragment Numbers Floor Price Unavailable</b>\n\nUnable to fetch the current floor price for Fragment numbers. Please try again later.",
            FRAGMENT_THUMBNAIL_URL,
        );
    };

    let ton_text = format_number(floor.price_ton, DEFAULT_DECIMAL_PLACES);
    let usd_text = quote
        .map(|q| format!(" (≈ ${:.2})", floor.price_ton * q.usd_per_ton))
        .unwrap_or_default();

    let mut result = article(
        "number_floor_price",
        "Number Floor Price",
        format!("💎 {ton_text} TON{usd_text}"),
        format!("📱 <b>Number Floor Price</b>\n💎 <b>{ton_text} TON</b>{usd_text}"),
        FRAGMENT_THUMBNAIL_URL,
    );
    result.keyboard = floor_keyboard(floor);
    result
}

// ============== Usernames ==============

pub fn welcome_result() -> InlineResult {
    article(
        "empty_query",
        "Enter a username",
        "Type a username to retrieve Fragment information",
        "Please enter a valid Telegram username to retrieve Fragment information.",
        FRAGMENT_THUMBNAIL_URL,
    )
}

pub fn invalid_username_result() -> InlineResult {
    article(
        "invalid",
        "Invalid Username Format",
        "Query must be at least 4 characters and start with a letter",
        "Usernames must start with a letter, be at least 4 characters long, and can contain letters, numbers, and underscores.",
        FRAGMENT_THUMBNAIL_URL,
    )
}

pub fn username_error_result(handle: &str) -> InlineResult {
    article(
        "error",
        "Error checking username",
        format!("Could not check '{handle}' on Fragment"),
        format!(
            "Error checking username <code>{}</code> on Fragment. Please try again later.",
            escape_html(handle)
        ),
        FRAGMENT_THUMBNAIL_URL,
    )
}

fn state_emoji(state: MarketState) -> &'static str {
    match state {
        MarketState::NotListed => "❌",
        MarketState::Sold => "🔴",
        MarketState::Taken => "🟠",
        MarketState::Available | MarketState::OnAuction | MarketState::ForSale => "🟢",
    }
}

fn fragment_url(handle: &str) -> String {
    format!("https://fragment.com/username/{handle}")
}

/// Owner names like `"durov.t.me"` link to a Telegram profile.
fn telegram_button(name: &str) -> Option<LinkButton> {
    if !name.contains("t.me") {
        return None;
    }
    let username = name.replace(".t.me", "");
    Some(LinkButton::new(
        format!("📲 @{username}"),
        format!("https://t.me/{username}"),
    ))
}

fn listing_keyboard(handle: &str, listing: &Listing) -> Vec<Vec<LinkButton>> {
    let mut rows = Vec::new();

    if let Some(price) = &listing.price {
        let text = match listing.state {
            MarketState::Sold => format!("💰 {} TON", price.ton),
            _ => format!(
                "💎 {} TON (≈ ${})",
                price.ton,
                price.usd.as_deref().unwrap_or("?")
            ),
        };
        rows.push(vec![LinkButton::new(text, fragment_url(handle))]);
    }

    if let Some(bin) = &listing.buy_now {
        rows.push(vec![LinkButton::new(
            format!("💰 BIN: {bin} TON"),
            fragment_url(handle),
        )]);
    }

    if let Some(owner) = &listing.owner {
        let emoji = if listing.has_bids { "🥇" } else { "👤" };
        let mut row = vec![LinkButton::new(
            format!("{emoji} {}", owner.name),
            owner.link.clone(),
        )];
        if let Some(tg) = telegram_button(&owner.name) {
            row.push(tg);
        }
        rows.push(row);
    }

    rows
}

fn listing_result(handle: &str, listing: &Listing) -> InlineResult {
    let emoji = state_emoji(listing.state);
    let label = listing.state.label();

    let mut message = format!("{emoji} @{} is <b>{label}</b>", escape_html(handle));
    if listing.state == MarketState::OnAuction {
        let bids = if listing.has_bids { "with" } else { "without" };
        message.push_str(&format!(" <b>{bids}</b> bids"));
    }
    if matches!(listing.state, MarketState::OnAuction | MarketState::ForSale) {
        if let Some(ends_in) = &listing.ends_in {
            message.push_str(&format!("\n⏱️ Ends in: <b>{}</b>", escape_html(ends_in)));
        }
    }

    let mut result = article(
        "result",
        format!("{emoji} @{handle} is {label}"),
        format!("Fragment information for @{handle}"),
        message,
        FRAGMENT_THUMBNAIL_URL,
    );
    result.keyboard = listing_keyboard(handle, listing);
    result
}

pub fn username_result(status: &UsernameStatus) -> InlineResult {
    match (status.availability, &status.listing) {
        (Availability::Invalid, _) => invalid_username_result(),
        (Availability::Unknown, _) | (_, None) => username_error_result(&status.handle),
        (Availability::Available | Availability::Taken, Some(listing)) => {
            listing_result(&status.handle, listing)
        }
    }
}
