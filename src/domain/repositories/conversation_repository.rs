use std::pin::Pin;

use async_trait::async_trait;
use futures_util::Stream;

use crate::domain::models::conversation::ConversationSnapshot;
use crate::domain::models::message::{ActionRef, IncomingMessage, MessageRecord};

/// Live view of one conversation's history.
///
/// Yields the current snapshot on first poll, then a fresh snapshot every time the
/// conversation changes. Dropping the stream unsubscribes.
pub type MessageFeed = Pin<Box<dyn Stream<Item = Vec<MessageRecord>> + Send>>;

/// Repository interface for recent conversation history.
///
/// Every operation is serialized against every other one. Unknown conversation ids
/// are not errors: reads return empty values and removals do nothing.
#[async_trait]
pub trait ConversationRepository: Send + Sync {
    /// Record an incoming message. Returns whether the visible history or its
    /// metadata changed, i.e. whether the notification should be re-rendered.
    async fn add_message(&self, conversation_id: &str, message: IncomingMessage) -> bool;

    /// Snapshot of a conversation's messages, oldest first
    async fn get_messages(&self, conversation_id: &str) -> Vec<MessageRecord>;

    /// Subscribe to a conversation's history
    fn get_messages_feed(&self, conversation_id: &str) -> MessageFeed;

    async fn get_group_name(&self, conversation_id: &str) -> Option<String>;

    async fn get_action_ref(&self, conversation_id: &str) -> Option<ActionRef>;

    /// Metadata and messages read under one lock acquisition
    async fn get_conversation(&self, conversation_id: &str) -> Option<ConversationSnapshot>;

    /// Conversation ids, least recently touched first. Does not touch anything.
    async fn conversation_ids(&self) -> Vec<String>;

    /// Drop a conversation with its metadata. Subscribers are not notified.
    async fn remove_chat(&self, conversation_id: &str);

    /// Drop every conversation
    async fn clear(&self);
}
