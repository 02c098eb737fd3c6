use std::path::Path;

use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::domain::errors::DomainError;

pub const DEFAULT_MAX_CHAT_HISTORY_SIZE: usize = 30;
pub const DEFAULT_MAX_MESSAGES_PER_CHAT: usize = 20;
pub const DEFAULT_DUPLICATE_WINDOW_MILLIS: i64 = 1_500;
pub const DEFAULT_FEED_BUFFER_SIZE: usize = 64;

/// Capacity and timing settings for the conversation repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RepositoryConfig {
    /// Conversations kept before the least recently used one is evicted
    pub max_chat_history_size: usize,

    /// Messages kept per conversation before the oldest is dropped
    pub max_messages_per_chat: usize,

    /// Same-text messages without an id arriving closer together than this are
    /// treated as one upstream event
    pub duplicate_window_millis: i64,

    /// Change tokens buffered per feed subscriber
    pub feed_buffer_size: usize,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            max_chat_history_size: DEFAULT_MAX_CHAT_HISTORY_SIZE,
            max_messages_per_chat: DEFAULT_MAX_MESSAGES_PER_CHAT,
            duplicate_window_millis: DEFAULT_DUPLICATE_WINDOW_MILLIS,
            feed_buffer_size: DEFAULT_FEED_BUFFER_SIZE,
        }
    }
}

impl RepositoryConfig {
    pub fn from_yaml_str(raw: &str) -> Result<Self, DomainError> {
        let config: Self = serde_yaml::from_str(raw)
            .map_err(|error| DomainError::InvalidData(format!("Invalid YAML config: {}", error)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, DomainError> {
        let config: Self = serde_json::from_str(raw)
            .map_err(|error| DomainError::InvalidData(format!("Invalid JSON config: {}", error)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file. `.json` files are parsed as JSON, anything else as YAML.
    pub async fn load(path: &Path) -> Result<Self, DomainError> {
        let raw = fs::read_to_string(path).await.map_err(|error| {
            if error.kind() == std::io::ErrorKind::NotFound {
                DomainError::NotFound(format!("Config file not found: {:?}", path))
            } else {
                DomainError::InternalError(format!("Failed to read config {:?}: {}", path, error))
            }
        })?;

        let is_json = path
            .extension()
            .and_then(|extension| extension.to_str())
            .is_some_and(|extension| extension.eq_ignore_ascii_case("json"));

        let config = if is_json {
            Self::from_json_str(&raw)?
        } else {
            Self::from_yaml_str(&raw)?
        };

        tracing::info!("Loaded repository config from {:?}", path);
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.max_chat_history_size == 0 {
            return Err(DomainError::InvalidData(
                "maxChatHistorySize must be at least 1".to_string(),
            ));
        }
        if self.max_messages_per_chat == 0 {
            return Err(DomainError::InvalidData(
                "maxMessagesPerChat must be at least 1".to_string(),
            ));
        }
        if self.duplicate_window_millis <= 0 {
            return Err(DomainError::InvalidData(
                "duplicateWindowMillis must be positive".to_string(),
            ));
        }
        if self.feed_buffer_size == 0 {
            return Err(DomainError::InvalidData(
                "feedBufferSize must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
