//! Recording fakes and local stub servers shared by the unit tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::StatusCode;
use url::Url;

use crate::completion::CompletionProvider;
use crate::error::{BotError, Result};
use crate::search::{SearchOutcome, SearchProvider};
use crate::telegram::{ChatTransport, OutboundReply};

/// Cloneable log of values seen by a fake or a stub handler.
#[derive(Debug)]
pub struct Captured<T>(Arc<Mutex<Vec<T>>>);

impl<T> Clone for Captured<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T> Default for Captured<T> {
    fn default() -> Self {
        Self(Arc::new(Mutex::new(Vec::new())))
    }
}

impl<T> Captured<T> {
    pub fn push(&self, value: T) {
        self.0.lock().expect("capture lock poisoned").push(value);
    }

    /// Drains everything captured so far.
    pub fn take(&self) -> Vec<T> {
        std::mem::take(&mut *self.0.lock().expect("capture lock poisoned"))
    }
}

/// Serves `router` on an ephemeral local port and returns its base URL.
pub async fn spawn_stub(router: axum::Router) -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub listener");
    let addr = listener.local_addr().expect("stub address");
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    Url::parse(&format!("http://{addr}")).expect("stub url")
}

#[derive(Default)]
pub struct RecordingTransport {
    pub sent: Captured<OutboundReply>,
    pub typing: Captured<i64>,
    send_fails: AtomicBool,
    typing_fails: AtomicBool,
}

impl RecordingTransport {
    pub fn fail_sends(&self) {
        self.send_fails.store(true, Ordering::SeqCst);
    }

    pub fn fail_typing(&self) {
        self.typing_fails.store(true, Ordering::SeqCst);
    }
}

fn unavailable() -> BotError {
    BotError::TelegramApi {
        status: StatusCode::BAD_GATEWAY,
        message: "stub failure".to_string(),
    }
}

#[async_trait]
impl ChatTransport for RecordingTransport {
    async fn send_message(&self, reply: &OutboundReply) -> Result<()> {
        self.sent.push(reply.clone());
        if self.send_fails.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        Ok(())
    }

    async fn send_typing(&self, chat_id: i64) -> Result<()> {
        self.typing.push(chat_id);
        if self.typing_fails.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        Ok(())
    }
}

pub struct StubSearch {
    pub queries: Captured<String>,
    context: String,
}

impl StubSearch {
    /// Answers every query with `context`; an empty string means no context.
    pub fn returning(context: &str) -> Self {
        Self {
            queries: Captured::default(),
            context: context.to_string(),
        }
    }
}

#[async_trait]
impl SearchProvider for StubSearch {
    async fn search(&self, query: &str) -> SearchOutcome {
        self.queries.push(query.to_string());
        if self.context.is_empty() {
            SearchOutcome::NoContext(crate::error::FailureReason::Empty)
        } else {
            SearchOutcome::Context(self.context.clone())
        }
    }
}

pub struct StubCompletion {
    pub prompts: Captured<String>,
    answer: Option<String>,
}

impl StubCompletion {
    pub fn answering(answer: &str) -> Self {
        Self {
            prompts: Captured::default(),
            answer: Some(answer.to_string()),
        }
    }

    pub fn failing() -> Self {
        Self {
            prompts: Captured::default(),
            answer: None,
        }
    }
}

#[async_trait]
impl CompletionProvider for StubCompletion {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.prompts.push(prompt.to_string());
        self.answer.clone().ok_or_else(|| BotError::CompletionApi {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "stub failure".to_string(),
        })
    }
}
