use std::fmt;

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Telegram API error ({status}): {message}")]
    TelegramApi {
        status: reqwest::StatusCode,
        message: String,
    },

    #[error("Search API error ({status})")]
    SearchApi { status: reqwest::StatusCode },

    #[error("Completion API error ({status}): {message}")]
    CompletionApi {
        status: reqwest::StatusCode,
        message: String,
    },

    #[error("Completion response error: {0}")]
    CompletionResponse(String),

    #[error("HTTP request error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Why an outbound call did not produce a usable result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    Timeout,
    Network,
    Status(StatusCode),
    Decode,
    Empty,
    Unconfigured,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Timeout => f.write_str("timeout"),
            FailureReason::Network => f.write_str("network"),
            FailureReason::Status(status) => write!(f, "status {}", status.as_u16()),
            FailureReason::Decode => f.write_str("decode"),
            FailureReason::Empty => f.write_str("empty"),
            FailureReason::Unconfigured => f.write_str("unconfigured"),
        }
    }
}

impl BotError {
    /// Returns a user-friendly error message suitable for sending back to the chat
    pub fn user_message(&self) -> String {
        match self {
            BotError::Config(_) | BotError::Url(_) => {
                "😔 У меня проблема с настройками. Пожалуйста, сообщи администратору бота.".to_string()
            }
            BotError::CompletionApi { status, .. } => match *status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    "😔 Не удалось авторизоваться в ИИ-сервисе. Пожалуйста, сообщи администратору бота.".to_string()
                }
                StatusCode::TOO_MANY_REQUESTS => {
                    "😔 Слишком много запросов. Попробуй ещё раз через пару минут.".to_string()
                }
                _ => REPHRASE_APOLOGY.to_string(),
            },
            BotError::CompletionResponse(_) | BotError::Json(_) | BotError::Reqwest(_) => {
                REPHRASE_APOLOGY.to_string()
            }
            BotError::TelegramApi { .. } | BotError::SearchApi { .. } | BotError::Io(_) => {
                "😔 Проблемы со связью. Попробуй ещё раз чуть позже.".to_string()
            }
        }
    }

    /// Reason code for logging degraded or failed outbound calls.
    pub fn reason(&self) -> FailureReason {
        match self {
            BotError::Config(_) | BotError::Url(_) => {
                FailureReason::Unconfigured
            }
            BotError::TelegramApi { status, .. }
            | BotError::SearchApi { status }
            | BotError::CompletionApi { status, .. } => FailureReason::Status(*status),
            BotError::CompletionResponse(_) => FailureReason::Empty,
            BotError::Json(_) => FailureReason::Decode,
            BotError::Reqwest(e) if e.is_timeout() => FailureReason::Timeout,
            BotError::Reqwest(e) if e.is_decode() => FailureReason::Decode,
            BotError::Reqwest(_) | BotError::Io(_) => FailureReason::Network,
        }
    }
}

/// Sent when the completion provider could not produce an answer.
pub const REPHRASE_APOLOGY: &str =
    "😔 Извини, не получилось сформулировать ответ. Попробуй переформулировать вопрос.";

pub type Result<T> = std::result::Result<T, BotError>;
