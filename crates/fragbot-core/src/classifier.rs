//! Inline query classification.
//!
//! Rules, first match wins:
//! 1. blank text → [`QueryKind::GeneralInfo`]
//! 2. digits with `,`/`.` separators that parse as a non-negative number →
//!    [`QueryKind::Conversion`]
//! 3. anything else → [`QueryKind::UsernameCheck`] with the lowercased,
//!    `@`-stripped candidate.
//!
//! Non-empty text that is not a valid handle is still routed to the username
//! path; [`Handle::parse`] rejects it there and the checker answers `Invalid`
//! without touching the network.

use std::{fmt, sync::OnceLock};

use regex::Regex;

#[derive(Clone, Debug, PartialEq)]
pub enum QueryKind {
    Conversion(f64),
    UsernameCheck(String),
    GeneralInfo,
}

pub fn classify(raw: &str) -> QueryKind {
    if raw.trim().is_empty() {
        return QueryKind::GeneralInfo;
    }

    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if let Some(amount) = parse_amount(&compact) {
        return QueryKind::Conversion(amount);
    }

    QueryKind::UsernameCheck(compact.to_lowercase().replace('@', ""))
}

/// Parse `"100"`, `"2.5"` or `"2,5"`. Commas are decimal separators.
pub fn parse_amount(s: &str) -> Option<f64> {
    if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit() || c == ',' || c == '.') {
        return None;
    }
    if !s.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    let v = s.replace(',', ".").parse::<f64>().ok()?;
    (v.is_finite() && v >= 0.0).then_some(v)
}

/// A syntactically valid Telegram username (lowercase, no `@`).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Handle(String);

impl Handle {
    /// At least 4 characters, starts with a letter, does not end with `_`.
    pub fn parse(candidate: &str) -> Option<Self> {
        static PATTERN: OnceLock<Regex> = OnceLock::new();
        let re =
            PATTERN.get_or_init(|| Regex::new(r"^[a-z][a-z0-9_]{2,}[a-z0-9]$").expect("valid regex"));
        re.is_match(candidate).then(|| Self(candidate.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
