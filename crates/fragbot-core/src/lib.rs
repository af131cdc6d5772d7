//! Core of the Fragment inline bot.
//!
//! This crate is framework-agnostic. Telegram and the HTTP price/registry/marketplace
//! APIs live behind ports (traits) implemented in adapter crates.

pub mod classifier;
pub mod config;
pub mod dispatcher;
pub mod domain;
pub mod errors;
pub mod fetchers;
pub mod formatter;
pub mod formatting;
pub mod logging;
pub mod ports;

pub use errors::{Error, Result};
