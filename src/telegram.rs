//! Telegram Bot API: inbound update parsing and outbound replies.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::endpoint;
use crate::error::{BotError, Result};
use crate::types::{DEFAULT_SENDER_NAME, InboundMessage};

const SEND_TIMEOUT: Duration = Duration::from_secs(10);
const TYPING_TIMEOUT: Duration = Duration::from_secs(5);

/// Telegram rejects longer message texts.
pub const MAX_MESSAGE_CHARS: usize = 4096;

/// Webhook update payload. Every level is optional so partial updates still parse.
#[derive(Debug, Default, Deserialize)]
pub struct Update {
    pub message: Option<UpdateMessage>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMessage {
    pub chat: Option<Chat>,
    pub text: Option<String>,
    pub from: Option<Sender>,
}

#[derive(Debug, Deserialize)]
pub struct Chat {
    pub id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct Sender {
    pub first_name: Option<String>,
}

impl Update {
    /// Extracts the chat message, or `None` when the chat id or the text is missing.
    pub fn into_inbound(self) -> Option<InboundMessage> {
        let message = self.message?;
        let chat_id = message.chat.and_then(|chat| chat.id).filter(|id| *id != 0)?;
        let text = message.text.filter(|text| !text.is_empty())?;
        let sender_name = message
            .from
            .and_then(|sender| sender.first_name)
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SENDER_NAME.to_string());

        Some(InboundMessage {
            chat_id,
            text,
            sender_name,
        })
    }
}

/// Form body of `sendMessage`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundReply {
    pub chat_id: i64,
    pub text: String,
    pub parse_mode: &'static str,
}

impl OutboundReply {
    /// Builds an HTML-formatted reply, cut to Telegram's length limit.
    pub fn html(chat_id: i64, text: &str) -> Self {
        let text = if text.chars().count() > MAX_MESSAGE_CHARS {
            text.chars().take(MAX_MESSAGE_CHARS).collect()
        } else {
            text.to_string()
        };
        Self {
            chat_id,
            text,
            parse_mode: "HTML",
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatAction {
    chat_id: i64,
    action: &'static str,
}

/// Escapes text so Telegram's HTML parse mode shows it verbatim, stopping before
/// any character or entity that would exceed `max_chars`.
///
/// Entities are never split, so the result always parses as HTML.
pub fn escape_html_within(text: &str, max_chars: usize) -> String {
    let mut escaped = String::with_capacity(text.len().min(max_chars));
    let mut count = 0;
    for c in text.chars() {
        let entity = match c {
            '&' => Some("&amp;"),
            '<' => Some("&lt;"),
            '>' => Some("&gt;"),
            _ => None,
        };
        let width = entity.map_or(1, str::len);
        if count + width > max_chars {
            break;
        }
        count += width;
        match entity {
            Some(entity) => escaped.push_str(entity),
            None => escaped.push(c),
        }
    }
    escaped
}

/// Outbound side of the messaging platform.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Delivers a reply. Failures propagate.
    async fn send_message(&self, reply: &OutboundReply) -> Result<()>;

    /// Shows the typing indicator. Callers treat failures as best-effort.
    async fn send_typing(&self, chat_id: i64) -> Result<()>;
}

pub struct TelegramClient {
    client: reqwest::Client,
    api_url: Url,
    token: Option<String>,
}

impl TelegramClient {
    pub fn new(client: reqwest::Client, api_url: Url, token: Option<String>) -> Self {
        Self {
            client,
            api_url,
            token,
        }
    }

    fn method_url(&self, method: &str) -> Result<String> {
        let token = self
            .token
            .as_deref()
            .filter(|token| !token.is_empty())
            .ok_or_else(|| BotError::Config("telegram bot token not configured".to_string()))?;
        Ok(endpoint(&self.api_url, &format!("bot{token}/{method}")))
    }

    async fn post_form<T: Serialize + Sync>(
        &self,
        method: &str,
        form: &T,
        timeout: Duration,
    ) -> Result<()> {
        let response = self
            .client
            .post(self.method_url(method)?)
            .timeout(timeout)
            .form(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response
                .text()
                .await
                .unwrap_or_else(|e| format!("Failed to read error response: {e}"));
            return Err(BotError::TelegramApi { status, message });
        }

        debug!("Telegram {method} succeeded");
        Ok(())
    }
}

#[async_trait]
impl ChatTransport for TelegramClient {
    async fn send_message(&self, reply: &OutboundReply) -> Result<()> {
        self.post_form("sendMessage", reply, SEND_TIMEOUT).await
    }

    async fn send_typing(&self, chat_id: i64) -> Result<()> {
        let action = ChatAction {
            chat_id,
            action: "typing",
        };
        self.post_form("sendChatAction", &action, TYPING_TIMEOUT)
            .await
    }
}
