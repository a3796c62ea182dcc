//! Tandem HTTP server.
//!
//! Serves an editor page and `POST /api/compile`, which runs the pipeline
//! on the submitted source and answers with the artifact as a download or
//! with the merged diagnostics.

pub mod error;
pub mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use tandem_core::Pipeline;

pub use error::{ServerError, ServerResult};
pub use routes::{AppState, CompileBody, create_router};

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

/// Provision the pipeline, then serve until Ctrl+C.
pub async fn serve(pipeline: Arc<Pipeline>, config: ServerConfig) -> ServerResult<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|_| ServerError::InvalidAddress(format!("{}:{}", config.host, config.port)))?;

    // Requests must never race the first provisioning.
    pipeline.provision().await?;

    let state = Arc::new(AppState { pipeline });
    let app = create_router(state);

    tracing::info!("Starting tandem server at http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Received shutdown signal");
            let _ = shutdown_tx.send(());
        }
    });

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.await;
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 3000);
    }
}
