use std::path::Path;

pub mod app;
pub mod application;
pub mod domain;
pub mod infrastructure;

pub use app::AppState;
use domain::errors::DomainError;
use infrastructure::logging::logger;

/// Start logging and build the shared state from `config_path`
pub async fn start(log_dir: &Path, config_path: &Path) -> Result<AppState, DomainError> {
    if let Err(error) = logger::init_logger(log_dir) {
        eprintln!("Failed to initialize logger: {}", error);
    }

    tracing::info!("Starting notibridge conversation repository");

    let state = AppState::from_config_file(config_path).await?;
    tracing::info!("Conversation repository is ready");
    Ok(state)
}
