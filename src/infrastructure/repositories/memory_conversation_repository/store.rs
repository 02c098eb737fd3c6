use std::collections::HashMap;

use crate::domain::models::conversation::{ConversationEntry, ConversationSnapshot};
use crate::domain::models::message::{ActionRef, MessageRecord};

/// Bounded conversation map with least-recently-used eviction
pub(super) struct ConversationStore {
    conversations: HashMap<String, (ConversationEntry, u64)>,
    capacity: usize,
    max_messages: usize,
    access_counter: u64,
}

impl ConversationStore {
    /// Create a store holding at most `capacity` conversations of `max_messages` each
    pub(super) fn new(capacity: usize, max_messages: usize) -> Self {
        Self {
            conversations: HashMap::with_capacity(capacity),
            capacity,
            max_messages,
            access_counter: 0,
        }
    }

    fn next_access(&mut self) -> u64 {
        self.access_counter += 1;
        self.access_counter
    }

    /// Mark a conversation as most recently used, creating it if absent.
    ///
    /// Returns the id of the conversation evicted to make room, if any. The victim's
    /// history and metadata are discarded without notifying anyone.
    pub(super) fn touch(&mut self, conversation_id: &str) -> Option<String> {
        let access = self.next_access();

        if let Some((_, last_access)) = self.conversations.get_mut(conversation_id) {
            *last_access = access;
            return None;
        }

        let mut evicted = None;
        if self.conversations.len() >= self.capacity {
            if let Some(victim) = self.least_recently_used() {
                self.conversations.remove(&victim);
                tracing::debug!("Evicted least recently used conversation {}", victim);
                evicted = Some(victim);
            }
        }

        self.conversations.insert(
            conversation_id.to_string(),
            (ConversationEntry::new(conversation_id), access),
        );
        tracing::debug!("Created conversation {}", conversation_id);

        evicted
    }

    /// Mark an existing conversation as most recently used. Never creates one.
    pub(super) fn promote(&mut self, conversation_id: &str) -> bool {
        let access = self.next_access();
        match self.conversations.get_mut(conversation_id) {
            Some((_, last_access)) => {
                *last_access = access;
                true
            }
            None => false,
        }
    }

    fn least_recently_used(&self) -> Option<String> {
        self.conversations
            .iter()
            .min_by_key(|(_, (_, last_access))| *last_access)
            .map(|(key, _)| key.clone())
    }

    fn entry(&self, conversation_id: &str) -> Option<&ConversationEntry> {
        self.conversations.get(conversation_id).map(|(entry, _)| entry)
    }

    fn entry_mut(&mut self, conversation_id: &str) -> Option<&mut ConversationEntry> {
        self.conversations
            .get_mut(conversation_id)
            .map(|(entry, _)| entry)
    }

    /// Append a message, dropping the oldest past the per-conversation cap.
    /// Returns the resulting history length.
    pub(super) fn append_message(&mut self, conversation_id: &str, record: MessageRecord) -> usize {
        let max_messages = self.max_messages;
        match self.entry_mut(conversation_id) {
            Some(entry) => entry.push_capped(record, max_messages),
            None => {
                debug_assert!(false, "append to untouched conversation {conversation_id}");
                0
            }
        }
    }

    /// In-place replacement for merge-updates. Out-of-range indexes are ignored.
    pub(super) fn replace_message_at(
        &mut self,
        conversation_id: &str,
        index: usize,
        record: MessageRecord,
    ) {
        let replaced = self
            .entry_mut(conversation_id)
            .is_some_and(|entry| entry.replace_at(index, record));
        debug_assert!(
            replaced,
            "replace_message_at({conversation_id}, {index}) out of range"
        );
    }

    pub(super) fn find_by_id(&self, conversation_id: &str, message_id: &str) -> Option<usize> {
        self.entry(conversation_id)?.position_of(message_id)
    }

    pub(super) fn message_at(&self, conversation_id: &str, index: usize) -> Option<&MessageRecord> {
        self.entry(conversation_id)?.get(index)
    }

    /// Index and content of the newest message
    pub(super) fn last_message(&self, conversation_id: &str) -> Option<(usize, &MessageRecord)> {
        let entry = self.entry(conversation_id)?;
        let last = entry.last_message()?;
        Some((entry.message_count() - 1, last))
    }

    pub(super) fn snapshot(&self, conversation_id: &str) -> Vec<MessageRecord> {
        self.entry(conversation_id)
            .map(ConversationEntry::snapshot)
            .unwrap_or_default()
    }

    pub(super) fn conversation_snapshot(&self, conversation_id: &str) -> Option<ConversationSnapshot> {
        self.entry(conversation_id).map(ConversationSnapshot::from)
    }

    pub(super) fn set_group_name(&mut self, conversation_id: &str, group_name: Option<&str>) -> bool {
        self.entry_mut(conversation_id)
            .is_some_and(|entry| entry.metadata.set_group_name(group_name))
    }

    pub(super) fn get_group_name(&self, conversation_id: &str) -> Option<String> {
        self.entry(conversation_id)?.metadata.group_name.clone()
    }

    pub(super) fn set_action_ref(
        &mut self,
        conversation_id: &str,
        action_ref: Option<&ActionRef>,
    ) -> bool {
        self.entry_mut(conversation_id)
            .is_some_and(|entry| entry.metadata.set_action_ref(action_ref))
    }

    pub(super) fn get_action_ref(&self, conversation_id: &str) -> Option<ActionRef> {
        self.entry(conversation_id)?.metadata.action_ref.clone()
    }

    /// Remove a conversation regardless of its position in the eviction order
    pub(super) fn remove(&mut self, conversation_id: &str) -> bool {
        self.conversations.remove(conversation_id).is_some()
    }

    pub(super) fn clear(&mut self) {
        self.conversations.clear();
    }

    pub(super) fn len(&self) -> usize {
        self.conversations.len()
    }

    /// Ids ordered from least to most recently used
    pub(super) fn ids_by_recency(&self) -> Vec<String> {
        let mut ordered: Vec<_> = self
            .conversations
            .iter()
            .map(|(key, (_, last_access))| (*last_access, key.clone()))
            .collect();
        ordered.sort_unstable_by_key(|(last_access, _)| *last_access);
        ordered.into_iter().map(|(_, key)| key).collect()
    }
}
