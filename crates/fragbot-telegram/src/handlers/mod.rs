//! Telegram update handlers.
//!
//! Inline queries go through the core dispatcher; private messages only know `/start`.

use std::sync::Arc;

use teloxide::{
    prelude::*,
    types::{InlineQuery, Message},
};

use crate::router::AppState;

mod commands;
mod inline;

pub async fn handle_inline_query(
    bot: Bot,
    q: InlineQuery,
    state: Arc<AppState>,
) -> ResponseResult<()> {
    inline::handle_inline_query(bot, q, state).await
}

pub async fn handle_message(bot: Bot, msg: Message, _state: Arc<AppState>) -> ResponseResult<()> {
    match msg.text() {
        Some(text) if text.starts_with('/') => commands::handle_command(bot, msg).await,
        _ => Ok(()),
    }
}
