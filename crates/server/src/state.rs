use faceswap_core::{Config, SanitizedConfig, SwapOrchestrator};
use std::sync::Arc;

/// Shared application state
pub struct AppState {
    config: Config,
    orchestrator: Arc<SwapOrchestrator>,
}

impl AppState {
    pub fn new(config: Config, orchestrator: Arc<SwapOrchestrator>) -> Self {
        Self {
            config,
            orchestrator,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn orchestrator(&self) -> &SwapOrchestrator {
        self.orchestrator.as_ref()
    }
}
