use std::sync::Arc;

use crate::application::services::conversation_service::ConversationService;
use crate::domain::clock::Clock;
use crate::domain::repositories::conversation_repository::ConversationRepository;
use crate::infrastructure::config::RepositoryConfig;
use crate::infrastructure::repositories::memory_conversation_repository::MemoryConversationRepository;

pub(super) struct AppRepositories {
    pub conversation_repository: Arc<dyn ConversationRepository>,
}

pub(super) struct AppServices {
    pub conversation_service: Arc<ConversationService>,
}

pub(super) fn build_repositories(config: &RepositoryConfig, clock: Arc<dyn Clock>) -> AppRepositories {
    let conversation_repository: Arc<dyn ConversationRepository> =
        Arc::new(MemoryConversationRepository::new(config, clock));

    AppRepositories {
        conversation_repository,
    }
}

pub(super) fn build_services(repositories: &AppRepositories) -> AppServices {
    let conversation_service = Arc::new(ConversationService::new(
        repositories.conversation_repository.clone(),
    ));

    AppServices {
        conversation_service,
    }
}
