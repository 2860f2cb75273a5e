use crate::core::AppConfig;

/// Shared state for the relay API. The relay is stateless per
/// request, so this only carries configuration.
pub struct AppState {
    pub config: AppConfig,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }
}
