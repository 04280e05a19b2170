use std::sync::Arc;

use tokio::net::TcpListener;

use fragments_store::Backend;

use crate::config::ServerConfig;
use crate::error::ServerResult;
use crate::router::build_router;
use crate::state::AppState;

/// The fragments HTTP server.
pub struct FragmentsServer {
    state: AppState,
    backend: Arc<Backend>,
}

impl FragmentsServer {
    /// Open the configured storage backend.
    pub async fn new(config: ServerConfig) -> ServerResult<Self> {
        let backend = Arc::new(Backend::init(&config.storage).await?);
        Ok(Self::with_backend(config, backend))
    }

    pub fn with_backend(config: ServerConfig, backend: Arc<Backend>) -> Self {
        let state = AppState::new(config, Arc::clone(&backend));
        Self { state, backend }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.state.config
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(self.state.clone())
    }

    /// Serve until Ctrl-C, then shut the backend down.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router();
        let bind_addr = self.state.config.bind_addr;
        let listener = TcpListener::bind(bind_addr).await?;
        tracing::info!(
            %bind_addr,
            backend = self.backend.kind(),
            api_url = %self.state.config.api_url,
            "fragments server listening"
        );
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        self.backend.shutdown().await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
