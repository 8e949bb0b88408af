//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Overrides → Validate → Metrics → Status server → Polling loop
//!
//! Shutdown (shutdown.rs):
//!     Signal received → broadcast → loop, notifier worker, server exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Fail fast: configuration and bind errors are fatal before the first tick
//! - The loop has no deadline of its own; only a signal stops it

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
pub use signals::wait_for_signal;
