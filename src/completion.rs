use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::endpoint;
use crate::error::{BotError, Result};
use crate::prompt::SYSTEM_PERSONA;
use crate::types::MessageRole;

const COMPLETIONS_PATH: &str = "v1/chat/completions";
const COMPLETION_TIMEOUT: Duration = Duration::from_secs(30);

pub const COMPLETION_MODEL: &str = "gpt-4o-mini";
const TEMPERATURE: f32 = 0.7;

// Telegram caps messages at 4096 characters; 800 tokens stays well under it
const MAX_TOKENS: u32 = 800;

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'static str,
    messages: Vec<Message<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: MessageRole,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Language-model backend answering a composed prompt.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

pub struct OpenAiClient {
    api_key: String,
    client: reqwest::Client,
    api_url: Url,
}

impl OpenAiClient {
    pub fn new(api_key: String, client: reqwest::Client, api_url: Url) -> Self {
        Self {
            api_key,
            client,
            api_url,
        }
    }
}

#[async_trait]
impl CompletionProvider for OpenAiClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        debug!(
            "Sending request to completion API with a {} character prompt",
            prompt.len()
        );

        let request = CompletionRequest {
            model: COMPLETION_MODEL,
            messages: vec![
                Message {
                    role: MessageRole::System,
                    content: SYSTEM_PERSONA,
                },
                Message {
                    role: MessageRole::User,
                    content: prompt,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let response = self
            .client
            .post(endpoint(&self.api_url, COMPLETIONS_PATH))
            .timeout(COMPLETION_TIMEOUT)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response
                .text()
                .await
                .unwrap_or_else(|e| format!("Failed to read error response: {e}"));
            return Err(BotError::CompletionApi { status, message });
        }

        let api_response: CompletionResponse = response.json().await?;

        let reply = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| BotError::CompletionResponse("No choices in response".to_string()))?
            .message
            .content
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| BotError::CompletionResponse("Empty message content".to_string()))?;

        debug!("Received response from completion API");
        Ok(reply)
    }
}
