use std::sync::Arc;

use teloxide::{prelude::*, types::InlineQuery};
use tracing::{info, warn};

use crate::router::AppState;

pub async fn handle_inline_query(
    _bot: Bot,
    q: InlineQuery,
    state: Arc<AppState>,
) -> ResponseResult<()> {
    let answer = state.dispatcher.dispatch(&q.query).await;
    info!(
        user_id = q.from.id.0,
        query = %q.query,
        results = answer.results.len(),
        cache_time = answer.cache_time,
        "inline query"
    );

    // A failed answer only affects this query; keep polling.
    if let Err(e) = state.answerer.answer(&q.id, &answer).await {
        warn!(error = %e, query_id = %q.id, "answer_inline_query failed");
    }
    Ok(())
}
