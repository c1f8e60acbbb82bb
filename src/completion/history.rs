//! Conversation History Adapter
//!
//! Normalizes a role-tagged message sequence into the vocabulary and ordering
//! constraints a provider requires. Pure and stateless: identical inputs
//! always produce identical outputs.
//!
//! Rules, in order:
//! 1. The final message is split off as the standalone current turn.
//! 2. If the remaining history opens on a Responder turn, that entry is a
//!    synthetic opening prompt and is dropped - it is never forwarded.
//! 3. Roles are remapped to the provider vocabulary, order preserved.

use super::provider::{RoleVocabulary, WireMessage};
use crate::types::{Conversation, PathwiseError, Result, Role};

/// A conversation adapted to one provider's vocabulary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdaptedConversation {
    /// Prior exchanges, opening on the requester's turn
    pub history: Vec<WireMessage>,
    /// The requester's current turn, submitted separately from the history
    pub current_turn: String,
}

impl AdaptedConversation {
    /// History plus the current turn as the final requester entry - the full
    /// ordered sequence a provider request carries.
    pub fn into_wire_messages(self, vocabulary: &RoleVocabulary) -> Vec<WireMessage> {
        let mut messages = self.history;
        messages.push(WireMessage::new(vocabulary.requester, self.current_turn));
        messages
    }
}

/// Adapt a conversation for one provider.
///
/// Fails only when the conversation is empty: there is no current turn to
/// submit.
pub fn adapt(conversation: &Conversation, vocabulary: &RoleVocabulary) -> Result<AdaptedConversation> {
    let Some((current, rest)) = conversation.messages.split_last() else {
        return Err(PathwiseError::Conversation(
            "conversation has no current turn".to_string(),
        ));
    };

    let history = match rest.first() {
        Some(seed) if seed.role == Role::Responder => &rest[1..],
        _ => rest,
    };

    let history = history
        .iter()
        .map(|message| WireMessage::new(vocabulary.tag(message.role), message.content.clone()))
        .collect();

    Ok(AdaptedConversation {
        history,
        current_turn: current.content.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::provider::CHAT_VOCABULARY;
    use crate::types::Message;

    #[test]
    fn test_adapt_strips_seed_and_current_turn() {
        let conversation = Conversation::new(vec![
            Message::responder("Hi"),
            Message::requester("A"),
            Message::responder("B"),
            Message::requester("C"),
        ]);

        let adapted = adapt(&conversation, &CHAT_VOCABULARY).unwrap();

        assert_eq!(
            adapted.history,
            vec![
                WireMessage::new("user", "A"),
                WireMessage::new("assistant", "B"),
            ]
        );
        assert_eq!(adapted.current_turn, "C");
    }

    #[test]
    fn test_adapt_without_seed_keeps_history_intact() {
        let conversation = Conversation::new(vec![
            Message::requester("A"),
            Message::responder("B"),
            Message::requester("C"),
        ]);

        let adapted = adapt(&conversation, &CHAT_VOCABULARY).unwrap();

        assert_eq!(adapted.history.len(), 2);
        assert_eq!(adapted.history[0].role, "user");
        assert_eq!(adapted.current_turn, "C");
    }

    #[test]
    fn test_adapt_first_turn_yields_empty_history() {
        // Opening exchange: synthetic seed plus the requester's first message
        let conversation = Conversation::new(vec![
            Message::responder("What brings you here?"),
            Message::requester("I want a new job."),
        ]);

        let adapted = adapt(&conversation, &CHAT_VOCABULARY).unwrap();

        assert!(adapted.history.is_empty());
        assert_eq!(adapted.current_turn, "I want a new job.");
    }

    #[test]
    fn test_adapt_rejects_empty_conversation() {
        let conversation = Conversation::default();
        assert!(adapt(&conversation, &CHAT_VOCABULARY).is_err());
    }

    #[test]
    fn test_adapt_is_deterministic() {
        let conversation = Conversation::new(vec![
            Message::responder("Hi"),
            Message::requester("A"),
            Message::requester("B"),
        ]);

        let first = adapt(&conversation, &CHAT_VOCABULARY).unwrap();
        let second = adapt(&conversation, &CHAT_VOCABULARY).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_into_wire_messages_appends_current_turn() {
        let conversation = Conversation::new(vec![
            Message::responder("Hi"),
            Message::requester("A"),
            Message::responder("B"),
            Message::requester("C"),
        ]);

        let messages = adapt(&conversation, &CHAT_VOCABULARY)
            .unwrap()
            .into_wire_messages(&CHAT_VOCABULARY);

        assert_eq!(messages.len(), 3);
        assert_eq!(messages[2], WireMessage::new("user", "C"));
        // History handed to a provider always opens on the requester's turn
        assert_eq!(messages[0].role, "user");
    }
}
