//! Per-member conversation state for one signed-in user.
//!
//! # Responsibility
//! - Group direct messages by counterpart and keep them in send order.
//! - Track unread counts and the currently selected conversation.
//!
//! # Invariants
//! - A message id is recorded at most once, whichever path delivered it.
//! - Messages not involving the owner are dropped.
//! - Only messages from the counterpart count as unread, and never while
//!   their conversation is selected.

use crate::chat::channel::MessageChannel;
use crate::chat::message::{now_ms, ChatError, ChatMessage};
use log::debug;
use std::collections::{BTreeMap, HashSet};
use uuid::Uuid;

#[derive(Debug, Default)]
struct Conversation {
    messages: Vec<ChatMessage>,
    unread: usize,
}

/// Conversations of one member, keyed by counterpart id.
#[derive(Debug)]
pub struct ConversationBook {
    me: String,
    conversations: BTreeMap<String, Conversation>,
    selected: Option<String>,
    seen: HashSet<Uuid>,
}

impl ConversationBook {
    pub fn new(me: impl Into<String>) -> Self {
        Self {
            me: me.into().trim().to_string(),
            conversations: BTreeMap::new(),
            selected: None,
            seen: HashSet::new(),
        }
    }

    pub fn me(&self) -> &str {
        &self.me
    }

    /// Records a message the owner sent.
    ///
    /// Returns `false` when the id was already recorded.
    ///
    /// # Errors
    /// - `NotSender` when the owner is not the sender.
    /// - `EmptyMessage` when content is blank.
    pub fn record_outgoing(&mut self, message: ChatMessage) -> Result<bool, ChatError> {
        if message.sender_id != self.me {
            return Err(ChatError::NotSender {
                expected: self.me.clone(),
                actual: message.sender_id,
            });
        }
        if message.content.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        Ok(self.record(message))
    }

    /// Records a message delivered by the channel.
    ///
    /// Echoes of the owner's own messages are merged without raising unread.
    /// Returns `false` when the message was dropped or already recorded.
    pub fn record_incoming(&mut self, message: ChatMessage) -> bool {
        self.record(message)
    }

    /// Opens the conversation with `member` and clears its unread count.
    pub fn select(&mut self, member: &str) {
        let member = member.trim().to_string();
        self.conversations.entry(member.clone()).or_default().unread = 0;
        self.selected = Some(member);
    }

    /// Closes the open conversation; later incoming messages count as unread.
    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn unread(&self, member: &str) -> usize {
        self.conversations
            .get(member.trim())
            .map_or(0, |conversation| conversation.unread)
    }

    pub fn total_unread(&self) -> usize {
        self.conversations
            .values()
            .map(|conversation| conversation.unread)
            .sum()
    }

    /// Messages exchanged with `member`, oldest first.
    pub fn messages(&self, member: &str) -> &[ChatMessage] {
        self.conversations
            .get(member.trim())
            .map(|conversation| conversation.messages.as_slice())
            .unwrap_or(&[])
    }

    /// Counterpart ids with at least one message or an open selection.
    pub fn members(&self) -> impl Iterator<Item = &str> + '_ {
        self.conversations.keys().map(String::as_str)
    }

    /// Builds, records and publishes one outgoing message.
    pub fn send<C>(
        &mut self,
        channel: &C,
        channel_name: &str,
        recipient: &str,
        content: &str,
    ) -> Result<ChatMessage, ChatError>
    where
        C: MessageChannel + ?Sized,
    {
        let message = ChatMessage::new(&self.me, recipient, content, now_ms())?;
        self.record_outgoing(message.clone())?;
        channel.publish(channel_name, &message)?;
        Ok(message)
    }

    fn record(&mut self, message: ChatMessage) -> bool {
        let Some(counterpart) = message.counterpart(&self.me).map(str::to_string) else {
            debug!("event=chat_record module=chat status=ignored reason=not_participant");
            return false;
        };
        if !self.seen.insert(message.id) {
            return false;
        }

        let from_counterpart = message.sender_id != self.me;
        let is_selected = self.selected.as_deref() == Some(counterpart.as_str());
        let conversation = self.conversations.entry(counterpart).or_default();
        if from_counterpart && !is_selected {
            conversation.unread += 1;
        }

        let position = conversation
            .messages
            .partition_point(|existing| existing.sent_at_ms <= message.sent_at_ms);
        conversation.messages.insert(position, message);
        true
    }
}
