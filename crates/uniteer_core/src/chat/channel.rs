//! Real-time message fan-out.
//!
//! # Responsibility
//! - Define the publish/subscribe seam a hosted push service plugs into.
//! - Provide an in-process hub for tests and single-process hosts.
//!
//! # Invariants
//! - Handlers run outside the hub lock, so a handler may publish or
//!   unsubscribe without deadlocking.
//! - Delivery is best effort; nothing is queued for late subscribers.

use crate::chat::message::{ChatError, ChatMessage};
use log::debug;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// Channel every member listens on for direct messages.
pub const CHAT_CHANNEL: &str = "chat";

/// Handle returned by `subscribe`, used to unsubscribe later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Callback invoked for every message published on a channel.
pub type MessageHandler = Arc<dyn Fn(&ChatMessage) + Send + Sync>;

/// Publish/subscribe transport for chat messages.
pub trait MessageChannel {
    /// Delivers `message` to current subscribers; returns how many ran.
    fn publish(&self, channel: &str, message: &ChatMessage) -> Result<usize, ChatError>;
    fn subscribe(&self, channel: &str, handler: MessageHandler)
        -> Result<SubscriptionId, ChatError>;
    /// Returns `false` when the subscription was already gone.
    fn unsubscribe(&self, id: SubscriptionId) -> Result<bool, ChatError>;
}

#[derive(Default)]
struct HubState {
    next_id: u64,
    channels: BTreeMap<String, Vec<(SubscriptionId, MessageHandler)>>,
}

/// In-process `MessageChannel`.
#[derive(Default)]
pub struct LocalChannelHub {
    state: Mutex<HubState>,
}

impl LocalChannelHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live subscriptions on `channel`.
    pub fn subscriber_count(&self, channel: &str) -> Result<usize, ChatError> {
        let state = self.lock()?;
        Ok(state.channels.get(channel.trim()).map_or(0, Vec::len))
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HubState>, ChatError> {
        self.state
            .lock()
            .map_err(|_| ChatError::ChannelUnavailable("hub lock poisoned".to_string()))
    }
}

impl MessageChannel for LocalChannelHub {
    fn publish(&self, channel: &str, message: &ChatMessage) -> Result<usize, ChatError> {
        let channel = normalize_channel(channel)?;
        let handlers: Vec<MessageHandler> = {
            let state = self.lock()?;
            state
                .channels
                .get(channel)
                .map(|subs| subs.iter().map(|(_, handler)| Arc::clone(handler)).collect())
                .unwrap_or_default()
        };

        for handler in &handlers {
            handler(message);
        }
        debug!(
            "event=chat_publish module=chat status=ok channel={} delivered={}",
            channel,
            handlers.len()
        );
        Ok(handlers.len())
    }

    fn subscribe(
        &self,
        channel: &str,
        handler: MessageHandler,
    ) -> Result<SubscriptionId, ChatError> {
        let channel = normalize_channel(channel)?;
        let mut state = self.lock()?;
        state.next_id += 1;
        let id = SubscriptionId(state.next_id);
        state
            .channels
            .entry(channel.to_string())
            .or_default()
            .push((id, handler));
        Ok(id)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> Result<bool, ChatError> {
        let mut state = self.lock()?;
        let mut removed = false;
        state.channels.retain(|_, subs| {
            let before = subs.len();
            subs.retain(|(sub_id, _)| *sub_id != id);
            removed |= subs.len() != before;
            !subs.is_empty()
        });
        Ok(removed)
    }
}

fn normalize_channel(value: &str) -> Result<&str, ChatError> {
    let trimmed = value.trim();
    if !is_valid_channel_name(trimmed) {
        return Err(ChatError::InvalidChannel(trimmed.to_string()));
    }
    Ok(trimmed)
}

fn is_valid_channel_name(value: &str) -> bool {
    if value.is_empty() {
        return false;
    }
    value
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
}
