use std::sync::Arc;

use teloxide::{dispatching::Dispatcher, dptree, prelude::*};
use tracing::{info, warn};

use fragbot_core::{config::Config, dispatcher::InlineDispatcher};

use crate::handlers;
use crate::InlineAnswerer;

#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<InlineDispatcher>,
    pub answerer: InlineAnswerer,
}

pub async fn run_polling(cfg: Arc<Config>, dispatcher: Arc<InlineDispatcher>) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.telegram_bot_token.clone());

    match bot.get_me().await {
        Ok(me) => info!(username = %me.username(), "bot started"),
        Err(e) => warn!(error = %e, "get_me failed; starting anyway"),
    }

    let state = Arc::new(AppState {
        dispatcher,
        answerer: InlineAnswerer::new(bot.clone()),
    });

    let handler = dptree::entry()
        .branch(Update::filter_inline_query().endpoint(handlers::handle_inline_query))
        .branch(Update::filter_message().endpoint(handlers::handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .build()
        .dispatch()
        .await;

    Ok(())
}
