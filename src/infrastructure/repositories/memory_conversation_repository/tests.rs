use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use tokio::time::timeout;

use crate::domain::clock::ManualClock;
use crate::domain::models::message::{Handle, IncomingMessage};
use crate::domain::repositories::conversation_repository::ConversationRepository;
use crate::infrastructure::config::RepositoryConfig;

use super::MemoryConversationRepository;

const QUIET_PERIOD: Duration = Duration::from_millis(100);

fn setup_repository() -> (MemoryConversationRepository, Arc<ManualClock>) {
    setup_repository_with(RepositoryConfig::default())
}

fn setup_repository_with(config: RepositoryConfig) -> (MemoryConversationRepository, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(1_700_000_000_000));
    let repository = MemoryConversationRepository::new(&config, clock.clone());
    (repository, clock)
}

#[tokio::test]
async fn concrete_icon_merge_scenario() {
    let (repository, clock) = setup_repository();

    let first = IncomingMessage::new("Alice", "hi").with_id("m1");
    assert!(repository.add_message("g1", first).await);

    let messages = repository.get_messages("g1").await;
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].sender_name, "Alice");
    assert_eq!(messages[0].text, "hi");
    assert_eq!(messages[0].icon_ref, None);

    clock.advance(50);
    let with_icon = IncomingMessage::new("Alice", "hi").with_id("m1").with_icon("ICON_A");
    assert!(repository.add_message("g1", with_icon.clone()).await);

    let messages = repository.get_messages("g1").await;
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].icon_ref, Some(Handle::from("ICON_A")));

    clock.advance(50);
    assert!(!repository.add_message("g1", with_icon).await);
    assert_eq!(repository.get_messages("g1").await.len(), 1);
}

#[tokio::test]
async fn id_dedup_is_idempotent_across_time() {
    let (repository, clock) = setup_repository();
    let message = IncomingMessage::new("Bob", "see you").with_id("m7");

    assert!(repository.add_message("c", message.clone()).await);
    clock.advance(60_000);
    assert!(!repository.add_message("c", message).await);
    assert_eq!(repository.get_messages("c").await.len(), 1);
}

#[tokio::test]
async fn recency_window_collapses_only_close_repeats() {
    let (repository, clock) = setup_repository();

    assert!(repository.add_message("c", IncomingMessage::new("Bob", "ping")).await);
    clock.advance(1_499);
    assert!(!repository.add_message("c", IncomingMessage::new("Bob", "ping")).await);
    assert_eq!(repository.get_messages("c").await.len(), 1);

    // Window is measured from the stored message, not the suppressed repeat.
    clock.advance(1);
    assert!(repository.add_message("c", IncomingMessage::new("Bob", "ping")).await);
    assert_eq!(repository.get_messages("c").await.len(), 2);
}

#[tokio::test]
async fn different_text_inside_window_is_new() {
    let (repository, clock) = setup_repository();

    repository.add_message("c", IncomingMessage::new("Bob", "one")).await;
    clock.advance(10);
    assert!(repository.add_message("c", IncomingMessage::new("Bob", "two")).await);
    assert_eq!(repository.get_messages("c").await.len(), 2);
}

#[tokio::test]
async fn message_history_keeps_most_recent() {
    let config = RepositoryConfig {
        max_messages_per_chat: 5,
        ..Default::default()
    };
    let (repository, clock) = setup_repository_with(config);

    for i in 0..12 {
        clock.advance(10);
        repository
            .add_message("c", IncomingMessage::new("Bob", &format!("message {i}")))
            .await;
        let expected = (i + 1).min(5);
        assert_eq!(repository.get_messages("c").await.len(), expected);
    }

    let texts: Vec<_> = repository
        .get_messages("c")
        .await
        .into_iter()
        .map(|message| message.text)
        .collect();
    assert_eq!(
        texts,
        vec!["message 7", "message 8", "message 9", "message 10", "message 11"]
    );
}

#[tokio::test]
async fn timestamps_are_non_decreasing() {
    let (repository, clock) = setup_repository();

    for i in 0..4 {
        repository
            .add_message("c", IncomingMessage::new("Bob", &format!("m{i}")).with_id(&format!("id{i}")))
            .await;
        if i % 2 == 1 {
            clock.advance(700);
        }
    }

    let timestamps: Vec<_> = repository
        .get_messages("c")
        .await
        .into_iter()
        .map(|message| message.timestamp)
        .collect();
    assert!(timestamps.windows(2).all(|pair| pair[0] <= pair[1]));
}

#[tokio::test]
async fn conversations_stay_bounded() {
    let (repository, _clock) = setup_repository();

    for i in 0..45 {
        repository
            .add_message(&format!("c{i}"), IncomingMessage::new("Bob", "hello"))
            .await;
        assert!(repository.conversation_ids().await.len() <= 30);
    }

    assert_eq!(repository.conversation_ids().await.len(), 30);
}

#[tokio::test]
async fn lru_evicts_first_untouched_conversation() {
    let (repository, _clock) = setup_repository();

    for i in 1..=31 {
        repository
            .add_message(&format!("c{i}"), IncomingMessage::new("Bob", "hello"))
            .await;
    }

    let ids = repository.conversation_ids().await;
    assert_eq!(ids.len(), 30);
    assert!(!ids.contains(&"c1".to_string()));
    assert!((2..=31).all(|i| ids.contains(&format!("c{i}"))));
    assert!(repository.get_messages("c1").await.is_empty());
}

#[tokio::test]
async fn read_touch_protects_from_eviction() {
    let (repository, _clock) = setup_repository();

    for i in 1..=30 {
        repository
            .add_message(&format!("c{i}"), IncomingMessage::new("Bob", "hello"))
            .await;
    }
    assert_eq!(repository.get_messages("c1").await.len(), 1);

    repository
        .add_message("c31", IncomingMessage::new("Bob", "hello"))
        .await;

    let ids = repository.conversation_ids().await;
    assert!(ids.contains(&"c1".to_string()));
    assert!(!ids.contains(&"c2".to_string()));
}

#[tokio::test]
async fn reads_of_unknown_conversations_are_empty() {
    let (repository, _clock) = setup_repository();

    assert!(repository.get_messages("nope").await.is_empty());
    assert_eq!(repository.get_group_name("nope").await, None);
    assert_eq!(repository.get_action_ref("nope").await, None);
    assert_eq!(repository.get_conversation("nope").await, None);
    repository.remove_chat("nope").await;
    assert!(repository.conversation_ids().await.is_empty());
}

#[tokio::test]
async fn metadata_updates_and_removal() {
    let (repository, clock) = setup_repository();

    let first = IncomingMessage::new("Alice", "hi")
        .with_group_name("Friends")
        .with_action_ref("intent-1");
    repository.add_message("g1", first).await;

    clock.advance(5_000);
    let second = IncomingMessage::new("Bob", "hey").with_action_ref("intent-2");
    repository.add_message("g1", second).await;

    assert_eq!(repository.get_group_name("g1").await.as_deref(), Some("Friends"));
    assert_eq!(
        repository.get_action_ref("g1").await,
        Some(Handle::from("intent-2"))
    );

    let snapshot = repository.get_conversation("g1").await.expect("conversation");
    assert_eq!(snapshot.metadata.conversation_id, "g1");
    assert_eq!(snapshot.messages.len(), 2);

    repository.remove_chat("g1").await;
    assert!(repository.get_messages("g1").await.is_empty());
    assert_eq!(repository.get_group_name("g1").await, None);
    assert_eq!(repository.get_action_ref("g1").await, None);
}

#[tokio::test]
async fn action_ref_change_on_duplicate_notifies() {
    let (repository, clock) = setup_repository();

    repository
        .add_message("g1", IncomingMessage::new("Alice", "hi").with_action_ref("intent-1"))
        .await;
    clock.advance(200);

    let repeat = IncomingMessage::new("Alice", "hi").with_action_ref("intent-2");
    assert!(repository.add_message("g1", repeat).await);
    assert_eq!(repository.get_messages("g1").await.len(), 1);
}

#[tokio::test]
async fn clear_drops_everything() {
    let (repository, _clock) = setup_repository();

    repository.add_message("a", IncomingMessage::new("A", "1")).await;
    repository.add_message("b", IncomingMessage::new("B", "2")).await;
    repository.clear().await;

    assert!(repository.conversation_ids().await.is_empty());
}

#[tokio::test]
async fn feed_replays_current_snapshot_on_subscribe() {
    let (repository, _clock) = setup_repository();
    repository
        .add_message("g1", IncomingMessage::new("Alice", "hi").with_id("m1"))
        .await;

    let mut feed = repository.get_messages_feed("g1");
    let first = feed.next().await.expect("initial snapshot");
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].text, "hi");

    assert!(timeout(QUIET_PERIOD, feed.next()).await.is_err());
}

#[tokio::test]
async fn feed_emits_on_change_for_its_conversation_only() {
    let (repository, clock) = setup_repository();
    let mut feed = repository.get_messages_feed("g1");

    assert!(feed.next().await.expect("initial snapshot").is_empty());

    repository.add_message("other", IncomingMessage::new("Bob", "x")).await;
    assert!(timeout(QUIET_PERIOD, feed.next()).await.is_err());

    repository.add_message("g1", IncomingMessage::new("Alice", "hi")).await;
    let update = timeout(QUIET_PERIOD, feed.next())
        .await
        .expect("update should arrive")
        .expect("feed is open");
    assert_eq!(update.len(), 1);

    clock.advance(100);
    assert!(!repository.add_message("g1", IncomingMessage::new("Alice", "hi")).await);
    assert!(timeout(QUIET_PERIOD, feed.next()).await.is_err());
}

#[tokio::test]
async fn feed_does_not_emit_on_removal() {
    let (repository, _clock) = setup_repository();
    repository.add_message("g1", IncomingMessage::new("Alice", "hi")).await;

    let mut feed = repository.get_messages_feed("g1");
    feed.next().await.expect("initial snapshot");

    repository.remove_chat("g1").await;
    assert!(timeout(QUIET_PERIOD, feed.next()).await.is_err());
}

#[tokio::test]
async fn lagging_feed_resyncs_from_snapshot() {
    let config = RepositoryConfig {
        feed_buffer_size: 1,
        ..Default::default()
    };
    let (repository, clock) = setup_repository_with(config);
    let mut feed = repository.get_messages_feed("g1");
    assert!(feed.next().await.expect("initial snapshot").is_empty());

    for i in 0..3 {
        clock.advance(10);
        repository
            .add_message("g1", IncomingMessage::new("Alice", &format!("m{i}")))
            .await;
    }

    let resynced = feed.next().await.expect("resync snapshot");
    assert_eq!(resynced.len(), 3);
}

#[tokio::test]
async fn publishing_without_subscribers_does_not_block() {
    let config = RepositoryConfig {
        feed_buffer_size: 1,
        ..Default::default()
    };
    let (repository, clock) = setup_repository_with(config);

    for i in 0..50 {
        clock.advance(10);
        assert!(
            repository
                .add_message("g1", IncomingMessage::new("Alice", &format!("m{i}")))
                .await
        );
    }
    assert_eq!(repository.get_messages("g1").await.len(), 20);
}

#[tokio::test]
async fn concurrent_writers_stay_within_limits() {
    let (repository, _clock) = setup_repository();
    let repository = Arc::new(repository);

    let mut handles = Vec::new();
    for worker in 0..16 {
        let repository = repository.clone();
        handles.push(tokio::spawn(async move {
            for i in 0..40 {
                let conversation_id = format!("c{}", (worker * 7 + i) % 45);
                let message = IncomingMessage::new("Bob", &format!("w{worker}-{i}"))
                    .with_id(&format!("w{worker}-{i}"));
                repository.add_message(&conversation_id, message).await;
            }
        }));
    }
    for handle in handles {
        handle.await.expect("worker finished");
    }

    let ids = repository.conversation_ids().await;
    assert!(ids.len() <= 30);
    for id in ids {
        let messages = repository.get_messages(&id).await;
        assert!(messages.len() <= 20);

        let mut seen = std::collections::HashSet::new();
        assert!(messages.iter().all(|m| seen.insert(m.id.clone())));
    }
}
