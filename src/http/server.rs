//! Status server setup.
//!
//! # Responsibilities
//! - Serve `/metrics`, `/status` and `/healthz`
//! - Read only published state; never touch the controller
//! - Stop on the shutdown broadcast

use axum::{routing::get, Router};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::http::handlers::{get_healthz, get_metrics, get_status};
use crate::observability::metrics::MetricsExporter;
use crate::publish::SnapshotStore;

/// State shared with handlers.
#[derive(Clone)]
pub struct AppState {
    pub snapshots: SnapshotStore,
    pub metrics: Option<MetricsExporter>,
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind status server on {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },

    #[error("status server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// HTTP server exposing controller state.
pub struct StatusServer {
    router: Router,
}

impl StatusServer {
    pub fn new(state: AppState) -> Self {
        Self {
            router: Self::build_router(state),
        }
    }

    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/metrics", get(get_metrics))
            .route("/status", get(get_status))
            .route("/healthz", get(get_healthz))
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }

    /// Bind the listening socket before the loop starts, so a bad address
    /// fails startup.
    pub async fn bind(address: &str) -> Result<TcpListener, ServerError> {
        TcpListener::bind(address).await.map_err(|source| ServerError::Bind {
            address: address.to_string(),
            source,
        })
    }

    /// Serve until the shutdown broadcast fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Status server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("Status server stopped");
        Ok(())
    }
}
