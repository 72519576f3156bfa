use std::sync::Arc;

use llmapi::providers::generate_fn;
use llmapi::GenerateFn;

use crate::config::ServerConfig;

/// Shared state handed to every handler via `State<AppState>`.
///
/// Read-only: requests share nothing but configuration and the provider
/// call.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// Performs one `generateContent` call against the provider.
    pub generate: GenerateFn,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self::with_generator(config, generate_fn())
    }

    pub fn with_generator(config: ServerConfig, generate: GenerateFn) -> Self {
        Self {
            config: Arc::new(config),
            generate,
        }
    }
}
