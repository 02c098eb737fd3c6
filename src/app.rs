use std::path::Path;
use std::sync::Arc;

use crate::application::services::conversation_service::ConversationService;
use crate::domain::clock::{Clock, SystemClock};
use crate::domain::errors::DomainError;
use crate::domain::repositories::conversation_repository::ConversationRepository;
use crate::infrastructure::config::RepositoryConfig;
use crate::infrastructure::logging::logger;

mod bootstrap;

/// Everything the event listener and the renderer share, built once at startup
pub struct AppState {
    pub config: RepositoryConfig,
    pub conversation_repository: Arc<dyn ConversationRepository>,
    pub conversation_service: Arc<ConversationService>,
}

impl AppState {
    pub fn new(config: RepositoryConfig) -> Result<Self, DomainError> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: RepositoryConfig, clock: Arc<dyn Clock>) -> Result<Self, DomainError> {
        config.validate()?;
        tracing::info!(
            "Initializing conversation repository ({} conversations x {} messages)",
            config.max_chat_history_size,
            config.max_messages_per_chat
        );

        let repositories = bootstrap::build_repositories(&config, clock);
        let services = bootstrap::build_services(&repositories);

        Ok(Self {
            config,
            conversation_repository: repositories.conversation_repository,
            conversation_service: services.conversation_service,
        })
    }

    /// Build from a config file, falling back to defaults when the file does not exist
    pub async fn from_config_file(config_path: &Path) -> Result<Self, DomainError> {
        let config = match RepositoryConfig::load(config_path).await {
            Ok(config) => config,
            Err(DomainError::NotFound(message)) => {
                logger::warn(&format!("{}, using default limits", message));
                RepositoryConfig::default()
            }
            Err(error) => return Err(error),
        };

        Self::new(config)
    }
}
