//! Signal sampling subsystem.
//!
//! # Data Flow
//! ```text
//! Polling loop tick (every poll_interval)
//!     → quality.rs asks the SignalSource for each receiver
//!     → failed / non-finite samples become missing readings
//!     → Readings handed to the failover controller
//! ```
//!
//! # Design Decisions
//! - Sources are replaceable: real front ends, scripted traces, or simulated.rs
//! - Blockage injection lives only in the simulated source
//! - No clamping; the controller only compares against thresholds

pub mod quality;
pub mod simulated;
pub mod source;

pub use quality::QualitySampler;
pub use simulated::SimulatedSource;
pub use source::{FnSource, SampleError, SignalSource};
