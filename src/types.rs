//! Common types used throughout the miyabot webhook.

use serde::{Deserialize, Serialize};

/// Role of a message in a chat-completion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Persona instructions
    System,
    /// The composed prompt
    User,
}

/// Sender name used when the update carries no `from.first_name`.
pub const DEFAULT_SENDER_NAME: &str = "друг";

/// A chat message extracted from an inbound webhook update.
///
/// Lives only for the duration of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub chat_id: i64,
    pub text: String,
    pub sender_name: String,
}

impl InboundMessage {
    /// True when the text starts with the command marker.
    pub fn is_command(&self) -> bool {
        self.text.starts_with('/')
    }
}
