//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Switch notification attempt fails or times out:
//!     → backoff.rs (jittered exponential delay)
//!     → next attempt, until the attempt budget is spent
//! ```
//!
//! # Design Decisions
//! - Every downstream call has a deadline
//! - Jitter avoids lockstep retries from multiple controllers

pub mod backoff;

pub use backoff::Backoff;
