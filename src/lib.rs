//! RSSI failover controller for a primary/backup receiver pair.

pub mod config;
pub mod failover;
pub mod http;
pub mod lifecycle;
pub mod notify;
pub mod observability;
pub mod publish;
pub mod resilience;
pub mod sampler;
pub mod service;

pub use config::FailoverConfig;
pub use failover::FailoverController;
pub use lifecycle::Shutdown;
pub use service::FailoverService;
