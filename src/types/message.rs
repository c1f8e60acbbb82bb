//! Conversation Messages
//!
//! Role-tagged message sequences as the caller submits them. Provider-specific
//! role vocabularies are applied later by the history adapter; these types
//! stay provider-neutral.

use serde::{Deserialize, Serialize};

/// Who produced a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person being mentored
    Requester,
    /// The mentor side (model output, or the synthetic opening prompt)
    Responder,
}

/// One turn of a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn requester(content: impl Into<String>) -> Self {
        Self {
            role: Role::Requester,
            content: content.into(),
        }
    }

    pub fn responder(content: impl Into<String>) -> Self {
        Self {
            role: Role::Responder,
            content: content.into(),
        }
    }
}

/// Ordered message sequence for one request.
///
/// Owned by exactly one request; created at the boundary and discarded at
/// response time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub messages: Vec<Message>,
}

impl Conversation {
    pub fn new(messages: Vec<Message>) -> Self {
        Self { messages }
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The most recent message, if any
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }
}
