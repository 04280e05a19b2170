use std::sync::Arc;

use fragments_core::FragmentService;
use fragments_store::Backend;

use crate::auth::{provider_for, AuthProvider};
use crate::config::ServerConfig;

/// Shared by every request handler.
#[derive(Clone)]
pub struct AppState {
    pub service: FragmentService,
    pub auth: Arc<dyn AuthProvider>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(config: ServerConfig, backend: Arc<Backend>) -> Self {
        let auth = provider_for(&config.auth);
        Self::with_auth(config, backend, auth)
    }

    pub fn with_auth(
        config: ServerConfig,
        backend: Arc<Backend>,
        auth: Arc<dyn AuthProvider>,
    ) -> Self {
        Self {
            service: FragmentService::new(backend),
            auth,
            config: Arc::new(config),
        }
    }
}
