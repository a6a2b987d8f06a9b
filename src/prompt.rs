//! Prompt composition for free-text messages.

use std::fmt::Write;

use chrono::{NaiveDate, Utc};

/// Display name of the bot.
pub const BOT_NAME: &str = "Мия 1";

/// System message sent with every completion request.
pub const SYSTEM_PERSONA: &str = "Ты — Мия 1, дружелюбный и внимательный ИИ-ассистент в Telegram. \
    Отвечай на языке собеседника, по умолчанию на русском. \
    Пиши кратко и по делу, без выдуманных фактов. \
    Если тебе дали информацию из интернета, опирайся на неё и не придумывай лишнего.";

/// Reply for free-text messages when no completion credential is configured.
pub const BASIC_MODE_NOTICE: &str = "🤖 Сейчас я работаю в базовом режиме: ИИ-модель не подключена, \
    поэтому я не могу ответить на этот вопрос.\n\n\
    Команды /start, /help и /about по-прежнему доступны.";

/// Builds the user prompt from the question and optional search context.
pub fn build_prompt(message: &str, sender_name: &str, search_context: &str) -> String {
    compose_prompt(message, sender_name, search_context, Utc::now().date_naive())
}

fn compose_prompt(
    message: &str,
    sender_name: &str,
    search_context: &str,
    today: NaiveDate,
) -> String {
    let mut prompt = format!(
        "Ты — {BOT_NAME}, ИИ-ассистент. Сегодня {} (UTC).",
        today.format("%Y-%m-%d")
    );

    let _ = write!(prompt, "\n\nВопрос от пользователя {sender_name}:\n{message}");

    if !search_context.is_empty() {
        let _ = write!(
            prompt,
            "\n\nАктуальная информация из интернета:\n{search_context}\n\n\
             Используй эту информацию в ответе, если она относится к вопросу."
        );
    }

    prompt
}
