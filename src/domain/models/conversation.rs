use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::message::{merge_handle, ActionRef, MessageRecord};

/// Per-conversation metadata kept alongside the message history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationMetadata {
    pub conversation_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_ref: Option<ActionRef>,
}

impl ConversationMetadata {
    pub fn new(conversation_id: &str) -> Self {
        Self {
            conversation_id: conversation_id.to_string(),
            group_name: None,
            action_ref: None,
        }
    }

    /// Overwrite the group name with a non-empty value.
    ///
    /// A missing or empty name leaves the stored one in place. Returns whether
    /// the stored value changed.
    pub fn set_group_name(&mut self, group_name: Option<&str>) -> bool {
        let Some(name) = group_name.filter(|name| !name.is_empty()) else {
            return false;
        };

        if self.group_name.as_deref() == Some(name) {
            return false;
        }

        self.group_name = Some(name.to_string());
        true
    }

    /// Replace the action reference wholesale when a different one arrives
    pub fn set_action_ref(&mut self, action_ref: Option<&ActionRef>) -> bool {
        merge_handle(&mut self.action_ref, action_ref)
    }
}

/// One conversation: metadata plus chronologically ordered history
#[derive(Debug, Clone)]
pub struct ConversationEntry {
    pub metadata: ConversationMetadata,
    messages: VecDeque<MessageRecord>,
}

impl ConversationEntry {
    pub fn new(conversation_id: &str) -> Self {
        Self {
            metadata: ConversationMetadata::new(conversation_id),
            messages: VecDeque::new(),
        }
    }

    /// Append a message, dropping the oldest ones beyond `max_messages`
    pub fn push_capped(&mut self, record: MessageRecord, max_messages: usize) -> usize {
        self.messages.push_back(record);
        while self.messages.len() > max_messages {
            self.messages.pop_front();
        }
        self.messages.len()
    }

    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.messages
            .iter()
            .position(|message| message.id.as_deref() == Some(id))
    }

    pub fn get(&self, index: usize) -> Option<&MessageRecord> {
        self.messages.get(index)
    }

    pub fn replace_at(&mut self, index: usize, record: MessageRecord) -> bool {
        match self.messages.get_mut(index) {
            Some(slot) => {
                *slot = record;
                true
            }
            None => false,
        }
    }

    pub fn last_message(&self) -> Option<&MessageRecord> {
        self.messages.back()
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    pub fn snapshot(&self) -> Vec<MessageRecord> {
        self.messages.iter().cloned().collect()
    }
}

/// Consistent read of a conversation's metadata and history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSnapshot {
    pub metadata: ConversationMetadata,
    pub messages: Vec<MessageRecord>,
}

impl From<&ConversationEntry> for ConversationSnapshot {
    fn from(entry: &ConversationEntry) -> Self {
        Self {
            metadata: entry.metadata.clone(),
            messages: entry.snapshot(),
        }
    }
}
