//! Conversation messages and the ordered history they live in.
//!
//! Timestamps are real `DateTime<Utc>` values in memory and RFC 3339 strings
//! on disk; the conversion happens only through serde at the store boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::text::last_number_in;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    /// Stored sessions written without a timestamp load with the current time.
    #[serde(default = "now")]
    pub timestamp: DateTime<Utc>,
}

fn now() -> DateTime<Utc> {
    Utc::now()
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self::at(role, content, Utc::now())
    }

    pub fn at(role: Role, content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn model(content: impl Into<String>) -> Self {
        Self::new(Role::Model, content)
    }
}

/// Append-only conversation, oldest message first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationHistory {
    messages: Vec<ChatMessage>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Most recent message with the given role.
    pub fn last_with_role(&self, role: Role) -> Option<&ChatMessage> {
        self.messages.iter().rev().find(|m| m.role == role)
    }

    /// Most recent user message, trimmed.
    pub fn last_user_message(&self) -> Option<&str> {
        self.last_with_role(Role::User).map(|m| m.content.trim())
    }

    /// Last numeric literal of the most recent message (any role) that has one.
    pub fn last_number(&self) -> Option<f64> {
        self.messages
            .iter()
            .rev()
            .find_map(|m| last_number_in(&m.content))
    }
}

impl From<Vec<ChatMessage>> for ConversationHistory {
    fn from(messages: Vec<ChatMessage>) -> Self {
        Self { messages }
    }
}

impl FromIterator<ChatMessage> for ConversationHistory {
    fn from_iter<I: IntoIterator<Item = ChatMessage>>(iter: I) -> Self {
        Self {
            messages: iter.into_iter().collect(),
        }
    }
}
