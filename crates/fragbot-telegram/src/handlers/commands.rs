use teloxide::{
    prelude::*,
    types::{InlineKeyboardButton, InlineKeyboardMarkup, ParseMode},
};
use tracing::info;

use fragbot_core::formatting::escape_html;

fn parse_command(text: &str) -> (String, String) {
    // Telegram may send `/cmd@botname arg1 ...`
    let mut parts = text.trim().splitn(2, char::is_whitespace);
    let first = parts.next().unwrap_or("").trim();
    let rest = parts.next().unwrap_or("").trim().to_string();

    let cmd = first
        .trim_start_matches('/')
        .split('@')
        .next()
        .unwrap_or("")
        .to_lowercase();

    (cmd, rest)
}

fn start_message_html(bot_username: &str) -> String {
    let bot = escape_html(bot_username);
    format!(
        "Hi I'm @{bot}\n\
You can use me inline for various things:\n\
- Check usernames on Fragment\n\
- Get the floor price of numbers\n\
- Get the current TON price\n\
- Convert between TON and USD\n\n\
Examples:\n\
<code>@{bot} username</code> Check username availability\n\
<code>@{bot} 100</code> Convert to TON/USD, vice versa\n\
<code>@{bot}</code> Number Floor price &amp; TON price"
    )
}

fn try_it_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new([[InlineKeyboardButton::switch_inline_query_current_chat(
        "➡️ Try it out",
        "",
    )]])
}

pub async fn handle_command(bot: Bot, msg: Message) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };

    let (cmd, _arg) = parse_command(text);
    match cmd.as_str() {
        "start" | "help" => {
            info!(user_id = ?msg.from().map(|u| u.id.0), "start command");
            let me = bot.get_me().await?;
            bot.send_message(msg.chat.id, start_message_html(me.username()))
                .parse_mode(ParseMode::Html)
                .reply_markup(try_it_keyboard())
                .await?;
            Ok(())
        }
        _ => Ok(()),
    }
}
