//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (gauges and counters via the `metrics` facade)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → /metrics endpoint (Prometheus scrape, see http/)
//! ```
//!
//! # Design Decisions
//! - Metric calls are no-ops until a recorder is installed
//! - Receiver labels, not roles, appear in metric labels

pub mod logging;
pub mod metrics;
