use serde::{Deserialize, Serialize};

/// Opaque reference to a resource resolved outside the core: a sticker image,
/// a sender avatar, or a launcher that re-opens the native conversation.
///
/// Handles are only ever compared for equality; their content is never inspected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Handle(String);

impl Handle {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Handle {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Handle {
    fn from(value: String) -> Self {
        Self(value)
    }
}

pub type StickerRef = Handle;
pub type IconRef = Handle;
pub type ActionRef = Handle;

/// Replace `slot` with `incoming` when the incoming value is present and differs.
///
/// An absent incoming value never clears what is already stored.
pub(crate) fn merge_handle(slot: &mut Option<Handle>, incoming: Option<&Handle>) -> bool {
    match incoming {
        Some(value) if slot.as_ref() != Some(value) => {
            *slot = Some(value.clone());
            true
        }
        _ => false,
    }
}

/// A message as held in conversation history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub sender_name: String,

    pub text: String,

    /// Arrival time in epoch milliseconds
    pub timestamp: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sticker_ref: Option<StickerRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_ref: Option<IconRef>,
}

impl MessageRecord {
    /// Build the record stored for a genuinely new message
    pub fn from_incoming(incoming: &IncomingMessage, timestamp: i64) -> Self {
        Self {
            id: incoming.id.clone(),
            sender_name: incoming.sender_name.clone(),
            text: incoming.text.clone(),
            timestamp,
            sticker_ref: incoming.sticker_ref.clone(),
            icon_ref: incoming.icon_ref.clone(),
        }
    }

    /// Attach an avatar that arrived after the message was first stored
    pub fn merge_icon(&mut self, icon_ref: Option<&IconRef>) -> bool {
        merge_handle(&mut self.icon_ref, icon_ref)
    }

    /// Attach a sticker that arrived after the message was first stored
    pub fn merge_sticker(&mut self, sticker_ref: Option<&StickerRef>) -> bool {
        merge_handle(&mut self.sticker_ref, sticker_ref)
    }
}

/// Normalized message descriptor handed over by the event source.
///
/// Field decoding happens upstream; nothing here is validated against the
/// originating platform's payload format.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncomingMessage {
    pub id: Option<String>,
    pub sender_name: String,
    pub text: String,
    pub sticker_ref: Option<StickerRef>,
    pub icon_ref: Option<IconRef>,
    pub group_name: Option<String>,
    pub action_ref: Option<ActionRef>,
}

impl IncomingMessage {
    pub fn new(sender_name: &str, text: &str) -> Self {
        Self {
            sender_name: sender_name.to_string(),
            text: text.to_string(),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn with_sticker(mut self, sticker_ref: impl Into<StickerRef>) -> Self {
        self.sticker_ref = Some(sticker_ref.into());
        self
    }

    pub fn with_icon(mut self, icon_ref: impl Into<IconRef>) -> Self {
        self.icon_ref = Some(icon_ref.into());
        self
    }

    pub fn with_group_name(mut self, group_name: &str) -> Self {
        self.group_name = Some(group_name.to_string());
        self
    }

    pub fn with_action_ref(mut self, action_ref: impl Into<ActionRef>) -> Self {
        self.action_ref = Some(action_ref.into());
        self
    }
}
