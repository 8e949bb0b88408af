//! Stand-in for the downstream signal combiner.
//!
//! Accepts `POST /switch/{receiver}` for the configured receiver labels and
//! reports the current selection on `GET /active`.

use std::sync::Arc;

use arc_swap::ArcSwap;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use clap::Parser;

#[derive(Parser)]
#[command(name = "mock-switch")]
#[command(about = "Development endpoint that accepts receiver switch notifications", long_about = None)]
struct Args {
    #[arg(long, default_value = "0.0.0.0:8080")]
    bind: String,

    /// Receiver selected at startup.
    #[arg(long, default_value = "FM1")]
    active: String,

    /// Receivers this endpoint accepts.
    #[arg(long, value_delimiter = ',', default_value = "FM1,FM2")]
    receivers: Vec<String>,
}

#[derive(Clone)]
struct SwitchState {
    active: Arc<ArcSwap<String>>,
    receivers: Arc<Vec<String>>,
}

async fn switch(Path(receiver): Path<String>, State(state): State<SwitchState>) -> (StatusCode, String) {
    if !state.receivers.contains(&receiver) {
        tracing::warn!(receiver = %receiver, "Rejected switch to unknown receiver");
        return (StatusCode::BAD_REQUEST, "Invalid".to_string());
    }
    let old = state.active.swap(Arc::new(receiver.clone()));
    tracing::info!(from = %old, to = %receiver, "Switch applied");
    (StatusCode::OK, format!("Active receiver: {receiver}"))
}

async fn active(State(state): State<SwitchState>) -> String {
    state.active.load().to_string()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();
    let state = SwitchState {
        active: Arc::new(ArcSwap::from_pointee(args.active.clone())),
        receivers: Arc::new(args.receivers),
    };

    let app = Router::new()
        .route("/switch/{receiver}", post(switch))
        .route("/active", get(active))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&args.bind).await?;
    tracing::info!(address = %listener.local_addr()?, active = %args.active, "Mock switch listening");
    axum::serve(listener, app).await?;
    Ok(())
}
