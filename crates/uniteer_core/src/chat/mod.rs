//! Direct-message conversations.
//!
//! # Responsibility
//! - Keep per-counterpart message history and unread counters.
//! - Abstract the real-time push transport behind `MessageChannel`.

pub mod channel;
pub mod conversation;
pub mod message;
