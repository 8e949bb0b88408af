//! Failover decision subsystem.
//!
//! # Data Flow
//! ```text
//! Readings (one per receiver, per tick)
//!     → dwell.rs (classify: bad / dead zone / good, track onset)
//!     → controller.rs (hold times + debounce → maybe Transition)
//!     → caller publishes and notifies
//! ```
//!
//! # Design Decisions
//! - Time is a `Duration` since the loop's clock origin, supplied by the caller
//! - Dwell timers run for both receivers, regardless of which is active
//! - The controller performs no I/O; publishing and notification live outside

pub mod controller;
pub mod dwell;
pub mod receiver;

pub use controller::{ControllerState, FailoverController, Policy, TransitionCounts};
pub use dwell::{Condition, DwellTimers, Thresholds};
pub use receiver::{Readings, Receiver, ReceiverLabels, Transition};
