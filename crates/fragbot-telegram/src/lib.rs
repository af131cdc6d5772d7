//! Telegram adapter (teloxide).
//!
//! Turns the framework-agnostic `InlineAnswer` built by `fragbot-core` into
//! Bot API inline query results and sends them.

use reqwest::Url;
use teloxide::{
    prelude::*,
    types::{
        InlineKeyboardButton, InlineKeyboardMarkup, InlineQueryResult, InlineQueryResultArticle,
        InputMessageContent, InputMessageContentText, ParseMode,
    },
};
use tokio::time::sleep;
use tracing::warn;

pub mod handlers;
pub mod router;

use fragbot_core::{
    domain::{InlineAnswer, InlineResult, LinkButton},
    errors::Error,
    Result,
};

#[derive(Clone)]
pub struct InlineAnswerer {
    bot: Bot,
}

impl InlineAnswerer {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    fn map_err(e: teloxide::RequestError) -> Error {
        Error::External(format!("telegram error: {e}"))
    }

    async fn with_retry<T, Fut>(&self, mut op: impl FnMut() -> Fut) -> Result<T>
    where
        Fut: std::future::IntoFuture<Output = std::result::Result<T, teloxide::RequestError>>,
        Fut::IntoFuture: Send,
    {
        const MAX_RETRIES: usize = 1;
        let mut attempts = 0usize;
        loop {
            match op().await {
                Ok(v) => return Ok(v),
                Err(e) => match e {
                    teloxide::RequestError::RetryAfter(d) if attempts < MAX_RETRIES => {
                        attempts += 1;
                        sleep(d).await;
                        continue;
                    }
                    other => return Err(Self::map_err(other)),
                },
            }
        }
    }

    pub async fn answer(&self, query_id: &str, answer: &InlineAnswer) -> Result<()> {
        let results = to_inline_results(answer);
        self.with_retry(|| {
            self.bot
                .answer_inline_query(query_id.to_string(), results.clone())
                .cache_time(answer.cache_time)
        })
        .await?;
        Ok(())
    }
}

pub fn to_inline_results(answer: &InlineAnswer) -> Vec<InlineQueryResult> {
    answer
        .results
        .iter()
        .map(|r| InlineQueryResult::Article(to_article(r)))
        .collect()
}

pub fn to_article(result: &InlineResult) -> InlineQueryResultArticle {
    let content = InputMessageContentText::new(result.message_html.clone())
        .parse_mode(ParseMode::Html)
        .disable_web_page_preview(true);

    let mut article = InlineQueryResultArticle::new(
        result.id.clone(),
        result.title.clone(),
        InputMessageContent::Text(content),
    )
    .description(result.description.clone());

    if let Some(markup) = to_keyboard(&result.keyboard) {
        article = article.reply_markup(markup);
    }
    if let Some(thumb) = result.thumbnail_url.as_deref().and_then(parse_url) {
        article = article.thumb_url(thumb);
    }
    article
}

/// Buttons with unparseable URLs are dropped; rows left empty are dropped too.
fn to_keyboard(rows: &[Vec<LinkButton>]) -> Option<InlineKeyboardMarkup> {
    let rows: Vec<Vec<InlineKeyboardButton>> = rows
        .iter()
        .map(|row| {
            row.iter()
                .filter_map(|b| {
                    parse_url(&b.url).map(|u| InlineKeyboardButton::url(b.text.clone(), u))
                })
                .collect::<Vec<_>>()
        })
        .filter(|row| !row.is_empty())
        .collect();

    if rows.is_empty() {
        None
    } else {
        Some(InlineKeyboardMarkup::new(rows))
    }
}

fn parse_url(raw: &str) -> Option<Url> {
    match Url::parse(raw) {
        Ok(u) => Some(u),
        Err(e) => {
            warn!(url = raw, error = %e, "dropping invalid url");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use teloxide::types::InlineKeyboardButtonKind;

    use super::*;

    fn result(keyboard: Vec<Vec<LinkButton>>) -> InlineResult {
        InlineResult {
            id: "ton_rate".to_string(),
            title: "TON Rate: $5".to_string(),
            description: "Source: CoinGecko".to_string(),
            message_html: "<b>1 TON</b> = <b>$5</b>".to_string(),
            thumbnail_url: Some("https://example.com/ton.png".to_string()),
            keyboard,
        }
    }

    #[test]
    fn article_carries_html_content() {
        let article = to_article(&result(Vec::new()));
        assert_eq!(article.id, "ton_rate");
        assert_eq!(article.title, "TON Rate: $5");
        assert_eq!(article.description.as_deref(), Some("Source: CoinGecko"));
        assert!(article.reply_markup.is_none());
        assert_eq!(
            article.thumb_url.as_ref().map(Url::as_str),
            Some("https://example.com/ton.png")
        );

        match article.input_message_content {
            InputMessageContent::Text(text) => {
                assert_eq!(text.message_text, "<b>1 TON</b> = <b>$5</b>");
                assert_eq!(text.parse_mode, Some(ParseMode::Html));
                assert_eq!(text.disable_web_page_preview, Some(true));
            }
            other => panic!("unexpected content: {other:?}"),
        }
    }

    #[test]
    fn keyboard_keeps_rows_and_skips_bad_urls() {
        let article = to_article(&result(vec![
            vec![
                LinkButton::new("Fragment", "https://fragment.com/username/durov"),
                LinkButton::new("broken", "not a url"),
            ],
            vec![LinkButton::new("also broken", "::")],
            vec![LinkButton::new("Owner", "https://tonviewer.com/EQabc")],
        ]));

        let markup = article.reply_markup.expect("keyboard");
        assert_eq!(markup.inline_keyboard.len(), 2);
        assert_eq!(markup.inline_keyboard[0].len(), 1);
        let button = &markup.inline_keyboard[0][0];
        assert_eq!(button.text, "Fragment");
        match &button.kind {
            InlineKeyboardButtonKind::Url(u) => {
                assert_eq!(u.as_str(), "https://fragment.com/username/durov")
            }
            other => panic!("unexpected button kind: {other:?}"),
        }
        assert_eq!(markup.inline_keyboard[1][0].text, "Owner");
    }

    #[test]
    fn answer_preserves_result_order() {
        let mut second = result(Vec::new());
        second.id = "number_floor_price".to_string();
        let answer = InlineAnswer {
            results: vec![result(Vec::new()), second],
            cache_time: 5,
        };

        let ids: Vec<String> = to_inline_results(&answer)
            .into_iter()
            .map(|r| match r {
                InlineQueryResult::Article(a) => a.id,
                other => panic!("unexpected result: {other:?}"),
            })
            .collect();
        assert_eq!(ids, vec!["ton_rate", "number_floor_price"]);
    }
}
