use std::sync::Arc;

use serde::Serialize;

use crate::application::dto::conversation_dto::{
    AddMessageDto, ConversationDto, MessageRecordDto, RetractionNoticeDto, SourceRemovedDto,
};
use crate::application::errors::ApplicationError;
use crate::application::services::removal_policy::{self, RemovalDecision};
use crate::domain::models::message::ActionRef;
use crate::domain::repositories::conversation_repository::{ConversationRepository, MessageFeed};
use crate::infrastructure::logging::logger;

pub const RETRACTION_NOTICE_TEXT: &str = "Message retraction detected";

/// Result of handling a source notification removal
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RemovalOutcome {
    Deleted,
    Retained,
    RetractionNotice(RetractionNoticeDto),
}

/// Service for recording and reading conversation history
pub struct ConversationService {
    repository: Arc<dyn ConversationRepository>,
}

impl ConversationService {
    /// Create a new ConversationService
    pub fn new(repository: Arc<dyn ConversationRepository>) -> Self {
        Self { repository }
    }

    /// Record an incoming message. Returns whether the notification needs re-rendering.
    pub async fn add_message(&self, dto: AddMessageDto) -> Result<bool, ApplicationError> {
        if dto.conversation_id.trim().is_empty() {
            return Err(ApplicationError::ValidationError(
                "Conversation id must not be empty".to_string(),
            ));
        }

        let (conversation_id, incoming) = dto.into_incoming();
        Ok(self.repository.add_message(&conversation_id, incoming).await)
    }

    pub async fn get_messages(&self, conversation_id: &str) -> Vec<MessageRecordDto> {
        self.repository
            .get_messages(conversation_id)
            .await
            .into_iter()
            .map(MessageRecordDto::from)
            .collect()
    }

    pub fn get_messages_feed(&self, conversation_id: &str) -> MessageFeed {
        logger::debug(&format!(
            "ConversationService: Subscribing to {}",
            conversation_id
        ));
        self.repository.get_messages_feed(conversation_id)
    }

    pub async fn get_conversation(
        &self,
        conversation_id: &str,
    ) -> Result<ConversationDto, ApplicationError> {
        self.repository
            .get_conversation(conversation_id)
            .await
            .map(ConversationDto::from)
            .ok_or_else(|| {
                ApplicationError::NotFound(format!("Conversation not found: {}", conversation_id))
            })
    }

    pub async fn get_group_name(&self, conversation_id: &str) -> Option<String> {
        self.repository.get_group_name(conversation_id).await
    }

    pub async fn get_action_ref(&self, conversation_id: &str) -> Option<ActionRef> {
        self.repository.get_action_ref(conversation_id).await
    }

    pub async fn remove_chat(&self, conversation_id: &str) {
        self.repository.remove_chat(conversation_id).await;
    }

    /// React to the source app's notification being taken down
    pub async fn handle_source_removed(
        &self,
        dto: SourceRemovedDto,
    ) -> Result<RemovalOutcome, ApplicationError> {
        if dto.conversation_id.trim().is_empty() {
            return Err(ApplicationError::ValidationError(
                "Conversation id must not be empty".to_string(),
            ));
        }

        let decision = removal_policy::decide(dto.reason, dto.source_in_foreground);
        logger::debug(&format!(
            "ConversationService: {:?} removal for {} -> {:?}",
            dto.reason, dto.conversation_id, decision
        ));

        match decision {
            RemovalDecision::Delete => {
                self.repository.remove_chat(&dto.conversation_id).await;
                Ok(RemovalOutcome::Deleted)
            }
            RemovalDecision::Retain => Ok(RemovalOutcome::Retained),
            RemovalDecision::RetainWithNotice => {
                let notice = self.build_retraction_notice(dto).await;
                logger::info(&format!(
                    "Possible retraction in {}, keeping history",
                    notice.conversation_id
                ));
                Ok(RemovalOutcome::RetractionNotice(notice))
            }
        }
    }

    async fn build_retraction_notice(&self, dto: SourceRemovedDto) -> RetractionNoticeDto {
        let snapshot = self.repository.get_conversation(&dto.conversation_id).await;

        let (group_name, action_ref, last_message) = match snapshot {
            Some(snapshot) => (
                snapshot.metadata.group_name,
                snapshot.metadata.action_ref,
                snapshot.messages.into_iter().last(),
            ),
            None => (None, None, None),
        };

        let sender_name = dto
            .sender_name
            .filter(|name| !name.is_empty())
            .or_else(|| last_message.as_ref().map(|m| m.sender_name.clone()))
            .unwrap_or_default();

        RetractionNoticeDto {
            conversation_id: dto.conversation_id,
            sender_name,
            text: RETRACTION_NOTICE_TEXT.to_string(),
            group_name,
            icon_ref: last_message
                .and_then(|message| message.icon_ref)
                .map(|handle| handle.as_str().to_string()),
            action_ref: action_ref.map(|handle| handle.as_str().to_string()),
        }
    }

    /// Drop all history, e.g. when the listener shuts down
    pub async fn reset(&self) {
        logger::info("ConversationService: Resetting all conversation history");
        self.repository.clear().await;
    }
}
