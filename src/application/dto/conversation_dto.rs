use serde::{Deserialize, Serialize};

use crate::application::services::removal_policy::RemovalReason;
use crate::domain::models::conversation::ConversationSnapshot;
use crate::domain::models::message::{Handle, IncomingMessage, MessageRecord};

/// Empty upstream values mean "not provided"
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}

/// DTO for one normalized incoming message
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMessageDto {
    pub conversation_id: String,
    pub sender_name: String,
    pub text: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sticker_ref: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_ref: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_ref: Option<String>,
}

impl AddMessageDto {
    /// Split into the conversation id and the domain descriptor
    pub fn into_incoming(self) -> (String, IncomingMessage) {
        let incoming = IncomingMessage {
            id: non_empty(self.message_id),
            sender_name: self.sender_name,
            text: self.text,
            sticker_ref: non_empty(self.sticker_ref).map(Handle::from),
            icon_ref: non_empty(self.icon_ref).map(Handle::from),
            group_name: non_empty(self.group_name),
            action_ref: non_empty(self.action_ref).map(Handle::from),
        };
        (self.conversation_id, incoming)
    }
}

/// DTO for a stored message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRecordDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub sender_name: String,
    pub text: String,
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sticker_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_ref: Option<String>,
}

impl From<MessageRecord> for MessageRecordDto {
    fn from(record: MessageRecord) -> Self {
        Self {
            id: record.id,
            sender_name: record.sender_name,
            text: record.text,
            timestamp: record.timestamp,
            sticker_ref: record.sticker_ref.map(|handle| handle.as_str().to_string()),
            icon_ref: record.icon_ref.map(|handle| handle.as_str().to_string()),
        }
    }
}

/// DTO for a conversation with its history
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationDto {
    pub conversation_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_ref: Option<String>,
    pub messages: Vec<MessageRecordDto>,
    pub message_count: usize,
}

impl From<ConversationSnapshot> for ConversationDto {
    fn from(snapshot: ConversationSnapshot) -> Self {
        let messages: Vec<MessageRecordDto> = snapshot
            .messages
            .into_iter()
            .map(MessageRecordDto::from)
            .collect();

        Self {
            conversation_id: snapshot.metadata.conversation_id,
            group_name: snapshot.metadata.group_name,
            action_ref: snapshot
                .metadata
                .action_ref
                .map(|handle| handle.as_str().to_string()),
            message_count: messages.len(),
            messages,
        }
    }
}

/// DTO describing why the source app's notification went away
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceRemovedDto {
    pub conversation_id: String,
    pub reason: RemovalReason,
    #[serde(default)]
    pub source_in_foreground: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_name: Option<String>,
}

/// What the renderer should show when a message was likely retracted upstream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetractionNoticeDto {
    pub conversation_id: String,
    pub sender_name: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_ref: Option<String>,
}
