//! Status HTTP layer.
//!
//! # Data Flow
//! ```text
//! GET /status  → SnapshotStore::load (one whole tick) → JSON
//! GET /metrics → MetricsExporter::render (read side of the tick gate) → text
//! GET /healthz → static liveness document
//! ```
//!
//! # Design Decisions
//! - Read-only: handlers never reach the controller, only published state
//! - Runs on its own task; a slow scrape cannot delay a tick beyond the gate

pub mod handlers;
pub mod server;

pub use server::{AppState, ServerError, StatusServer};
