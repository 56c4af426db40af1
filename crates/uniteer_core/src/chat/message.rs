//! Direct-message record and chat errors.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Chat-level errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatError {
    /// Message content is blank after trim.
    EmptyMessage,
    /// Sender or recipient id is blank after trim.
    InvalidMember,
    /// Outgoing message was not sent by the book owner.
    NotSender { expected: String, actual: String },
    /// Channel name is not a lowercase slug.
    InvalidChannel(String),
    /// Channel hub state cannot be accessed.
    ChannelUnavailable(String),
}

impl Display for ChatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyMessage => write!(f, "message content must not be blank"),
            Self::InvalidMember => write!(f, "message sender and recipient must not be blank"),
            Self::NotSender { expected, actual } => write!(
                f,
                "outgoing message must be sent by `{expected}`, got `{actual}`"
            ),
            Self::InvalidChannel(value) => write!(f, "channel name is invalid: {value}"),
            Self::ChannelUnavailable(details) => write!(f, "channel unavailable: {details}"),
        }
    }
}

impl Error for ChatError {}

/// One direct message between two members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub sender_id: String,
    pub recipient_id: String,
    pub content: String,
    /// Unix epoch milliseconds assigned by the sender.
    pub sent_at_ms: i64,
}

impl ChatMessage {
    /// Builds a message with a fresh id.
    ///
    /// # Errors
    /// - `InvalidMember` when sender or recipient is blank.
    /// - `EmptyMessage` when content is blank.
    pub fn new(
        sender_id: &str,
        recipient_id: &str,
        content: &str,
        sent_at_ms: i64,
    ) -> Result<Self, ChatError> {
        let sender_id = sender_id.trim();
        let recipient_id = recipient_id.trim();
        if sender_id.is_empty() || recipient_id.is_empty() {
            return Err(ChatError::InvalidMember);
        }
        if content.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        Ok(Self {
            id: Uuid::new_v4(),
            sender_id: sender_id.to_string(),
            recipient_id: recipient_id.to_string(),
            content: content.to_string(),
            sent_at_ms,
        })
    }

    /// The other side of the conversation as seen by `me`.
    ///
    /// Returns `None` when `me` is not part of this message.
    pub fn counterpart(&self, me: &str) -> Option<&str> {
        if self.sender_id == me {
            Some(self.recipient_id.as_str())
        } else if self.recipient_id == me {
            Some(self.sender_id.as_str())
        } else {
            None
        }
    }
}

/// Current wall-clock time in Unix epoch milliseconds.
pub fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::{ChatError, ChatMessage};

    #[test]
    fn counterpart_depends_on_viewer() {
        let message = ChatMessage::new("alice", "bob", "hi", 1).unwrap();
        assert_eq!(message.counterpart("alice"), Some("bob"));
        assert_eq!(message.counterpart("bob"), Some("alice"));
        assert_eq!(message.counterpart("carol"), None);
    }

    #[test]
    fn new_rejects_blank_input() {
        assert_eq!(
            ChatMessage::new("alice", "bob", "  \n", 1),
            Err(ChatError::EmptyMessage)
        );
        assert_eq!(
            ChatMessage::new(" ", "bob", "hi", 1),
            Err(ChatError::InvalidMember)
        );
    }
}
