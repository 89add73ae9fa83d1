//! Shared application state for the server.

use std::sync::Arc;

use deadman::config::SwitchConfig;
use deadman::countdown::CountdownController;

/// Shared state accessible from all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Configuration loaded at startup; every arm request uses it.
    pub config: Arc<SwitchConfig>,
    /// The single countdown for this process.
    pub controller: Arc<CountdownController>,
}

impl AppState {
    pub fn new(config: SwitchConfig, controller: CountdownController) -> Self {
        Self {
            config: Arc::new(config),
            controller: Arc::new(controller),
        }
    }
}
