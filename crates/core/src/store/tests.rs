use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{TimeZone, Utc};
use colloquy_backend::{ErrorKind, ExchangeRecord};
use colloquy_test_backend::{ScriptedReply, TestBackend};
use tokio::sync::watch;
use tokio::time::timeout;

use crate::StoreBuilder;
use crate::transcript::{SEND_FAILURE_TEXT, Sender};

fn record(id: &str, minute: u32) -> ExchangeRecord {
    ExchangeRecord {
        id: id.to_owned(),
        user_message: format!("q-{id}"),
        ai_response: format!("a-{id}"),
        timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, minute, 0).unwrap(),
    }
}

fn idle_counter() -> (watch::Sender<u32>, watch::Receiver<u32>) {
    watch::channel(0)
}

async fn wait_for_idle(idle_rx: &mut watch::Receiver<u32>, count: u32) {
    timeout(Duration::from_millis(500), idle_rx.wait_for(|n| *n >= count))
        .await
        .expect("store did not settle in time")
        .unwrap();
}

#[tokio::test]
async fn test_send_success_appends_pair() {
    let backend = TestBackend::default();
    backend.push_reply(ScriptedReply::reply("hello"));

    let busy_log = Arc::new(Mutex::new(Vec::new()));
    let (idle_tx, mut idle_rx) = idle_counter();

    let store = StoreBuilder::with_backend(backend.clone())
        .load_recent_on_start(false)
        .on_busy_changed({
            let busy_log = Arc::clone(&busy_log);
            move |busy| busy_log.lock().unwrap().push(busy)
        })
        .on_idle(move || idle_tx.send_modify(|n| *n += 1))
        .build();

    store.submit_text("hi");
    wait_for_idle(&mut idle_rx, 1).await;

    let snapshot = store.snapshot().await.unwrap();
    assert!(!snapshot.busy);

    let [echo, reply] = snapshot.messages.as_slice() else {
        panic!("expected exactly two messages: {:?}", snapshot.messages);
    };
    assert_eq!((echo.sender, echo.text.as_str()), (Sender::User, "hi"));
    assert_eq!((reply.sender, reply.text.as_str()), (Sender::Bot, "hello"));
    // The pair shares a base id, and optimistic messages carry no
    // timestamp.
    assert_eq!(echo.id, "local:1_user");
    assert_eq!(reply.id, "local:1_bot");
    assert_eq!(echo.timestamp, None);

    assert_eq!(*busy_log.lock().unwrap(), [true, false]);
    assert_eq!(backend.sent_messages(), ["hi"]);
}

#[tokio::test]
async fn test_send_failure_appends_fallback() {
    let backend = TestBackend::default();
    backend.push_reply(ScriptedReply::Failure(ErrorKind::Transport));

    let (idle_tx, mut idle_rx) = idle_counter();
    let store = StoreBuilder::with_backend(backend.clone())
        .load_recent_on_start(false)
        .on_idle(move || idle_tx.send_modify(|n| *n += 1))
        .build();

    store.submit_text("hi");
    wait_for_idle(&mut idle_rx, 1).await;

    let snapshot = store.snapshot().await.unwrap();
    assert!(!snapshot.busy);

    let texts: Vec<_> = snapshot
        .messages
        .iter()
        .map(|msg| (msg.sender, msg.text.as_str()))
        .collect();
    assert_eq!(
        texts,
        [(Sender::User, "hi"), (Sender::Bot, SEND_FAILURE_TEXT)]
    );
}

#[tokio::test]
async fn test_blank_submissions_are_noops() {
    let backend = TestBackend::default();
    let busy_log = Arc::new(Mutex::new(Vec::new()));

    let store = StoreBuilder::with_backend(backend.clone())
        .load_recent_on_start(false)
        .on_busy_changed({
            let busy_log = Arc::clone(&busy_log);
            move |busy| busy_log.lock().unwrap().push(busy)
        })
        .build();

    store.submit_text("");
    store.submit_text("   ");
    store.set_draft("   ");
    store.submit();

    let snapshot = store.snapshot().await.unwrap();
    assert!(snapshot.messages.is_empty());
    assert!(!snapshot.busy);
    // An unsubmittable draft is left alone.
    assert_eq!(snapshot.draft, "   ");

    assert!(busy_log.lock().unwrap().is_empty());
    assert!(backend.sent_messages().is_empty());
    assert_eq!(backend.fetch_calls(), 0);
}

#[tokio::test]
async fn test_initial_load_builds_transcript() {
    let backend = TestBackend::default();
    // The history endpoint serves newest first.
    backend.set_history([record("b", 20), record("a", 10)]);

    let (idle_tx, mut idle_rx) = idle_counter();
    let store = StoreBuilder::with_backend(backend.clone())
        .on_idle(move || idle_tx.send_modify(|n| *n += 1))
        .build();
    wait_for_idle(&mut idle_rx, 1).await;

    let snapshot = store.snapshot().await.unwrap();
    assert!(!snapshot.busy);

    let ids: Vec<_> =
        snapshot.messages.iter().map(|msg| msg.id.as_str()).collect();
    assert_eq!(ids, ["a_user", "a_bot", "b_user", "b_bot"]);
    assert_eq!(snapshot.messages[0].text, "q-a");
    assert_eq!(snapshot.messages[0].sender, Sender::User);
    assert_eq!(snapshot.messages[0].timestamp, Some(record("a", 10).timestamp));
    assert_eq!(backend.fetch_calls(), 1);
}

#[tokio::test]
async fn test_failed_load_is_silent_and_store_stays_usable() {
    let backend = TestBackend::default();
    backend.fail_fetch(ErrorKind::Transport);
    backend.push_reply(ScriptedReply::reply("still here"));

    let (idle_tx, mut idle_rx) = idle_counter();
    let store = StoreBuilder::with_backend(backend.clone())
        .on_idle(move || idle_tx.send_modify(|n| *n += 1))
        .build();
    wait_for_idle(&mut idle_rx, 1).await;

    // No error message lands in the transcript and the busy flag is
    // back down.
    let snapshot = store.snapshot().await.unwrap();
    assert!(snapshot.messages.is_empty());
    assert!(!snapshot.busy);

    // There is no error state: the next send goes through normally.
    store.submit_text("anyone?");
    wait_for_idle(&mut idle_rx, 2).await;

    let snapshot = store.snapshot().await.unwrap();
    let texts: Vec<_> = snapshot
        .messages
        .iter()
        .map(|msg| msg.text.as_str())
        .collect();
    assert_eq!(texts, ["anyone?", "still here"]);
}

#[tokio::test]
async fn test_overlapping_submissions_are_serialized() {
    let backend = TestBackend::default();
    backend.push_reply(ScriptedReply::reply("first"));
    backend.push_reply(ScriptedReply::reply("second"));

    let (idle_tx, mut idle_rx) = idle_counter();
    let store = StoreBuilder::with_backend(backend.clone())
        .load_recent_on_start(false)
        .on_idle(move || idle_tx.send_modify(|n| *n += 1))
        .build();

    // The second submission arrives while the first is in flight; it
    // must wait its turn instead of interleaving.
    store.submit_text("one");
    store.submit_text("two");
    wait_for_idle(&mut idle_rx, 1).await;

    let snapshot = store.snapshot().await.unwrap();
    let texts: Vec<_> = snapshot
        .messages
        .iter()
        .map(|msg| (msg.sender, msg.text.as_str()))
        .collect();
    assert_eq!(
        texts,
        [
            (Sender::User, "one"),
            (Sender::Bot, "first"),
            (Sender::User, "two"),
            (Sender::Bot, "second"),
        ]
    );
    assert_eq!(backend.sent_messages(), ["one", "two"]);
}

#[tokio::test]
async fn test_draft_submit_clears_draft() {
    let backend = TestBackend::default();
    backend.push_reply(ScriptedReply::reply("sure"));

    let (idle_tx, mut idle_rx) = idle_counter();
    let store = StoreBuilder::with_backend(backend)
        .load_recent_on_start(false)
        .on_idle(move || idle_tx.send_modify(|n| *n += 1))
        .build();

    store.set_draft("help me");
    store.submit();
    wait_for_idle(&mut idle_rx, 1).await;

    let snapshot = store.snapshot().await.unwrap();
    assert_eq!(snapshot.draft, "");

    let texts: Vec<_> = snapshot
        .messages
        .iter()
        .map(|msg| msg.text.as_str())
        .collect();
    assert_eq!(texts, ["help me", "sure"]);
}

#[tokio::test]
async fn test_greeting_and_replyless_backend() {
    let backend = TestBackend::default();
    backend.push_reply(ScriptedReply::Accepted);

    let (idle_tx, mut idle_rx) = idle_counter();
    let store = StoreBuilder::with_backend(backend)
        .load_recent_on_start(false)
        .with_greeting("Hello! how can I help you today?")
        .on_idle(move || idle_tx.send_modify(|n| *n += 1))
        .build();

    store.submit_text("log this");
    wait_for_idle(&mut idle_rx, 1).await;

    let snapshot = store.snapshot().await.unwrap();
    assert!(!snapshot.busy);

    // An accepted-without-reply send keeps the echo but fabricates
    // neither a bot reply nor a failure message.
    let ids: Vec<_> =
        snapshot.messages.iter().map(|msg| msg.id.as_str()).collect();
    assert_eq!(ids, ["greeting_bot", "local:1_user"]);
    assert_eq!(snapshot.messages[0].sender, Sender::Bot);
}

#[tokio::test]
async fn test_shutdown_drops_later_commands() {
    let backend = TestBackend::default();
    let store = StoreBuilder::with_backend(backend.clone())
        .load_recent_on_start(false)
        .build();

    store.shutdown();
    store.submit_text("late");

    assert!(store.snapshot().await.is_none());
    assert!(backend.sent_messages().is_empty());
}
