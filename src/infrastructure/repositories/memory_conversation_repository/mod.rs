use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

mod dedup;
mod feed;
mod store;

#[cfg(test)]
mod tests;

use self::dedup::Disposition;
use self::feed::ChangeBus;
use self::store::ConversationStore;
use crate::domain::clock::{Clock, SystemClock};
use crate::domain::models::conversation::ConversationSnapshot;
use crate::domain::models::message::{ActionRef, IncomingMessage, MessageRecord};
use crate::domain::repositories::conversation_repository::{ConversationRepository, MessageFeed};
use crate::infrastructure::config::RepositoryConfig;

/// In-memory conversation repository.
///
/// A single lock covers the whole dedup/evict/append sequence as well as every read,
/// so callers always observe complete mutations. Nothing inside the lock awaits I/O.
pub struct MemoryConversationRepository {
    store: Arc<Mutex<ConversationStore>>,
    bus: ChangeBus,
    clock: Arc<dyn Clock>,
    duplicate_window_millis: i64,
}

impl MemoryConversationRepository {
    /// Create a repository from a validated config
    pub fn new(config: &RepositoryConfig, clock: Arc<dyn Clock>) -> Self {
        let store = ConversationStore::new(
            config.max_chat_history_size,
            config.max_messages_per_chat,
        );

        Self {
            store: Arc::new(Mutex::new(store)),
            bus: ChangeBus::new(config.feed_buffer_size),
            clock,
            duplicate_window_millis: config.duplicate_window_millis,
        }
    }

    /// Default limits on the wall clock
    pub fn with_defaults() -> Self {
        Self::new(&RepositoryConfig::default(), Arc::new(SystemClock))
    }
}

#[async_trait]
impl ConversationRepository for MemoryConversationRepository {
    async fn add_message(&self, conversation_id: &str, message: IncomingMessage) -> bool {
        let mut store = self.store.lock().await;
        let now = self.clock.now_millis();

        let outcome = dedup::apply(
            &mut store,
            conversation_id,
            &message,
            now,
            self.duplicate_window_millis,
        );

        match outcome.disposition {
            Disposition::Appended => {}
            Disposition::IdMatch => tracing::debug!(
                "Message {:?} in {} matched by id (content changed: {})",
                message.id,
                conversation_id,
                outcome.content_changed
            ),
            Disposition::RecentRepeat => tracing::debug!(
                "Repeated message in {} suppressed (icon refreshed: {})",
                conversation_id,
                outcome.content_changed
            ),
        }

        let should_notify = outcome.should_notify();
        if should_notify {
            self.bus.publish(conversation_id);
        }

        tracing::debug!(
            "add_message {}: new_entry={}, notify={}, conversations={}",
            conversation_id,
            outcome.new_entry(),
            should_notify,
            store.len()
        );

        should_notify
    }

    async fn get_messages(&self, conversation_id: &str) -> Vec<MessageRecord> {
        let mut store = self.store.lock().await;
        store.promote(conversation_id);
        store.snapshot(conversation_id)
    }

    fn get_messages_feed(&self, conversation_id: &str) -> MessageFeed {
        feed::message_feed(
            self.store.clone(),
            self.bus.subscribe(),
            conversation_id.to_string(),
        )
    }

    async fn get_group_name(&self, conversation_id: &str) -> Option<String> {
        let mut store = self.store.lock().await;
        store.promote(conversation_id);
        store.get_group_name(conversation_id)
    }

    async fn get_action_ref(&self, conversation_id: &str) -> Option<ActionRef> {
        let mut store = self.store.lock().await;
        store.promote(conversation_id);
        store.get_action_ref(conversation_id)
    }

    async fn get_conversation(&self, conversation_id: &str) -> Option<ConversationSnapshot> {
        let mut store = self.store.lock().await;
        store.promote(conversation_id);
        store.conversation_snapshot(conversation_id)
    }

    async fn conversation_ids(&self) -> Vec<String> {
        self.store.lock().await.ids_by_recency()
    }

    async fn remove_chat(&self, conversation_id: &str) {
        if self.store.lock().await.remove(conversation_id) {
            tracing::info!("Removed conversation {}", conversation_id);
        }
    }

    async fn clear(&self) {
        let mut store = self.store.lock().await;
        let dropped = store.len();
        store.clear();
        tracing::info!("Cleared {} conversation(s)", dropped);
    }
}
