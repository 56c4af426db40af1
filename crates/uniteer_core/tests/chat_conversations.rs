use std::sync::{Arc, Mutex};
use uniteer_core::{
    ChatError, ChatMessage, ConversationBook, LocalChannelHub, MessageChannel, CHAT_CHANNEL,
};

fn message(from: &str, to: &str, content: &str, at: i64) -> ChatMessage {
    ChatMessage::new(from, to, content, at).unwrap()
}

#[test]
fn messages_are_grouped_by_counterpart() {
    let mut book = ConversationBook::new("alice");
    book.record_outgoing(message("alice", "bob", "hi bob", 1))
        .unwrap();
    book.record_incoming(message("bob", "alice", "hi alice", 2));
    book.record_incoming(message("carol", "alice", "ping", 3));

    assert_eq!(book.messages("bob").len(), 2);
    assert_eq!(book.messages("carol").len(), 1);
    assert!(book.messages("alice").is_empty());
    assert_eq!(book.members().collect::<Vec<_>>(), vec!["bob", "carol"]);
}

#[test]
fn unread_counts_follow_selection() {
    let mut book = ConversationBook::new("alice");
    book.record_incoming(message("bob", "alice", "one", 1));
    book.record_incoming(message("bob", "alice", "two", 2));
    book.record_incoming(message("carol", "alice", "three", 3));
    assert_eq!(book.unread("bob"), 2);
    assert_eq!(book.total_unread(), 3);

    book.select("bob");
    assert_eq!(book.unread("bob"), 0);
    book.record_incoming(message("bob", "alice", "four", 4));
    assert_eq!(book.unread("bob"), 0);
    assert_eq!(book.total_unread(), 1);

    book.select("carol");
    book.record_incoming(message("bob", "alice", "five", 5));
    assert_eq!(book.unread("bob"), 1);
    assert_eq!(book.selected(), Some("carol"));
}

#[test]
fn cleared_selection_counts_unread_again() {
    let mut book = ConversationBook::new("alice");
    book.select("bob");
    book.record_incoming(message("bob", "alice", "seen", 1));
    assert_eq!(book.unread("bob"), 0);

    book.clear_selection();
    assert_eq!(book.selected(), None);
    book.record_incoming(message("bob", "alice", "missed", 2));
    assert_eq!(book.unread("bob"), 1);
    assert_eq!(book.total_unread(), 1);
}

#[test]
fn duplicates_and_foreign_messages_are_dropped() {
    let mut book = ConversationBook::new("alice");
    let incoming = message("bob", "alice", "hello", 1);

    assert!(book.record_incoming(incoming.clone()));
    assert!(!book.record_incoming(incoming));
    assert!(!book.record_incoming(message("bob", "carol", "not for alice", 2)));

    assert_eq!(book.messages("bob").len(), 1);
    assert_eq!(book.unread("bob"), 1);
    assert!(book.messages("carol").is_empty());
}

#[test]
fn own_echo_does_not_raise_unread() {
    let mut book = ConversationBook::new("alice");
    let sent = message("alice", "bob", "from my phone", 1);

    assert!(book.record_incoming(sent.clone()));
    assert!(!book.record_outgoing(sent).unwrap());
    assert_eq!(book.unread("bob"), 0);
    assert_eq!(book.messages("bob").len(), 1);
}

#[test]
fn send_publishes_and_peer_receives() {
    let hub = LocalChannelHub::new();
    let bob = Arc::new(Mutex::new(ConversationBook::new("bob")));
    let inbox = Arc::clone(&bob);
    hub.subscribe(
        CHAT_CHANNEL,
        Arc::new(move |message: &ChatMessage| {
            inbox.lock().unwrap().record_incoming(message.clone());
        }),
    )
    .unwrap();

    let mut alice = ConversationBook::new("alice");
    let sent = alice.send(&hub, CHAT_CHANNEL, "bob", "lunch?").unwrap();

    assert_eq!(alice.messages("bob"), &[sent.clone()]);
    let bob = bob.lock().unwrap();
    assert_eq!(bob.messages("alice"), &[sent]);
    assert_eq!(bob.unread("alice"), 1);
}

#[test]
fn send_rejects_blank_content() {
    let hub = LocalChannelHub::new();
    let mut alice = ConversationBook::new("alice");

    assert_eq!(
        alice.send(&hub, CHAT_CHANNEL, "bob", "   "),
        Err(ChatError::EmptyMessage)
    );
    assert!(alice.messages("bob").is_empty());
}

#[test]
fn hub_handlers_run_on_other_threads() {
    let hub = Arc::new(LocalChannelHub::new());
    let received = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&received);
    hub.subscribe(
        CHAT_CHANNEL,
        Arc::new(move |message: &ChatMessage| {
            sink.lock().unwrap().push(message.content.clone());
        }),
    )
    .unwrap();

    let publisher = Arc::clone(&hub);
    std::thread::spawn(move || {
        let message = message("bob", "alice", "from thread", 1);
        publisher.publish(CHAT_CHANNEL, &message).unwrap();
    })
    .join()
    .unwrap();

    assert_eq!(*received.lock().unwrap(), vec!["from thread".to_string()]);
}
