//! Webhook request handling: one inbound update in, one chat reply out.

use std::collections::BTreeMap;
use std::sync::Arc;

use log::{debug, error, info, warn};
use serde::Serialize;
use serde_json::json;

use crate::commands::{basic_reply, dispatch_command};
use crate::completion::{CompletionProvider, OpenAiClient};
use crate::config::Config;
use crate::error::Result;
use crate::prompt::build_prompt;
use crate::search::{DuckDuckGoClient, SearchProvider, should_use_search};
use crate::telegram::{
    ChatTransport, MAX_MESSAGE_CHARS, OutboundReply, TelegramClient, Update, escape_html_within,
};
use crate::types::InboundMessage;

/// HTTP-shaped inbound request.
#[derive(Debug, Clone)]
pub struct WebhookRequest {
    pub method: String,
    pub body: String,
}

/// HTTP-shaped response envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
    pub is_base64_encoded: bool,
}

impl WebhookResponse {
    fn json(status_code: u16, body: &serde_json::Value) -> Self {
        let headers = BTreeMap::from([("Content-Type".to_string(), "application/json".to_string())]);
        Self {
            status_code,
            headers,
            body: body.to_string(),
            is_base64_encoded: false,
        }
    }

    fn acknowledged() -> Self {
        Self::json(200, &json!({"ok": true}))
    }

    fn error(status_code: u16, message: &str) -> Self {
        Self::json(status_code, &json!({"error": message}))
    }

    fn preflight() -> Self {
        let headers = [
            ("Access-Control-Allow-Origin", "*"),
            ("Access-Control-Allow-Methods", "POST, OPTIONS"),
            ("Access-Control-Allow-Headers", "Content-Type"),
            ("Access-Control-Max-Age", "86400"),
        ]
        .into_iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect();
        Self {
            status_code: 200,
            headers,
            body: String::new(),
            is_base64_encoded: false,
        }
    }
}

pub struct RequestRouter {
    config: Config,
    transport: Arc<dyn ChatTransport>,
    search: Arc<dyn SearchProvider>,
    completion: Option<Arc<dyn CompletionProvider>>,
}

impl RequestRouter {
    pub fn new(
        config: Config,
        transport: Arc<dyn ChatTransport>,
        search: Arc<dyn SearchProvider>,
        completion: Option<Arc<dyn CompletionProvider>>,
    ) -> Self {
        Self {
            config,
            transport,
            search,
            completion,
        }
    }

    /// Wires the real provider clients; completion is enabled only with an API key.
    pub fn from_config(config: Config) -> Self {
        let client = reqwest::Client::new();

        let transport = Arc::new(TelegramClient::new(
            client.clone(),
            config.telegram_api_url.clone(),
            config.telegram_token.clone(),
        ));
        let search = Arc::new(DuckDuckGoClient::new(
            client.clone(),
            config.search_api_url.clone(),
        ));
        let completion = config.openai_api_key.clone().map(|api_key| {
            Arc::new(OpenAiClient::new(
                api_key,
                client.clone(),
                config.openai_api_url.clone(),
            )) as Arc<dyn CompletionProvider>
        });

        Self::new(config, transport, search, completion)
    }

    /// Handles one webhook request. Once a chat id is known the status is always 200
    /// so the platform does not redeliver the update.
    pub async fn handle(&self, request: WebhookRequest) -> WebhookResponse {
        let method = request.method.to_ascii_uppercase();

        if method == "OPTIONS" {
            return WebhookResponse::preflight();
        }

        if method != "POST" {
            debug!("Rejecting {method} request");
            return WebhookResponse::error(405, "Method not allowed");
        }

        if self.config.telegram_token().is_none() {
            error!("Rejecting update: TELEGRAM_BOT_TOKEN is not configured");
            return WebhookResponse::error(500, "Bot token not configured");
        }

        let body = if request.body.trim().is_empty() {
            "{}"
        } else {
            request.body.as_str()
        };

        // Failures before the chat id is known cannot be reported to anyone.
        let update: Update = match serde_json::from_str(body) {
            Ok(update) => update,
            Err(e) => {
                warn!("Ignoring malformed update: {e}");
                return WebhookResponse::acknowledged();
            }
        };

        let Some(inbound) = update.into_inbound() else {
            debug!("Update has no chat id or text, acknowledging");
            return WebhookResponse::acknowledged();
        };

        info!("Received message in chat {}", inbound.chat_id);
        debug!(
            "Message from {} in chat {}: {}",
            inbound.sender_name, inbound.chat_id, inbound.text
        );

        self.respond(&inbound).await;

        WebhookResponse::acknowledged()
    }

    /// Composes the reply and makes exactly one delivery attempt.
    async fn respond(&self, inbound: &InboundMessage) {
        let text = match self.reply_for(inbound).await {
            Ok(text) => text,
            Err(e) => {
                error!(
                    "Error processing message in chat {} ({}): {}",
                    inbound.chat_id,
                    e.reason(),
                    e
                );
                e.user_message()
            }
        };

        let reply = OutboundReply::html(inbound.chat_id, &text);
        match self.transport.send_message(&reply).await {
            Ok(()) => {
                info!("Replied in chat {}", reply.chat_id);
                debug!("Reply to chat {}: {}", reply.chat_id, reply.text);
            }
            Err(e) => error!(
                "Failed to deliver reply to chat {} ({}): {}",
                reply.chat_id,
                e.reason(),
                e
            ),
        }
    }

    async fn reply_for(&self, inbound: &InboundMessage) -> Result<String> {
        if inbound.is_command() {
            return Ok(dispatch_command(&inbound.text).to_string());
        }

        let Some(completion) = &self.completion else {
            debug!("No completion credential, answering in basic mode");
            return Ok(basic_reply(&inbound.text).to_string());
        };

        self.show_typing(inbound.chat_id).await;

        let search_context = if should_use_search(&inbound.text) {
            self.search.search(&inbound.text).await.into_context()
        } else {
            String::new()
        };

        let prompt = build_prompt(&inbound.text, &inbound.sender_name, &search_context);
        let answer = completion.complete(&prompt).await?;

        Ok(escape_html_within(&answer, MAX_MESSAGE_CHARS))
    }

    async fn show_typing(&self, chat_id: i64) {
        if let Err(e) = self.transport.send_typing(chat_id).await {
            debug!(
                "Failed to show typing indicator in chat {chat_id} ({}): {e}",
                e.reason()
            );
        }
    }
}
