//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, defaults for missing fields)
//!     → CLI / environment overrides (main.rs)
//!     → validation.rs (semantic checks)
//!     → FailoverConfig (validated, immutable for the process lifetime)
//! ```
//!
//! # Design Decisions
//! - Config is fixed at startup; there is no hot reload
//! - All fields have defaults matching the reference deployment
//! - Any validation error is fatal before the loop begins

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{read_config, ConfigError};
pub use schema::FailoverConfig;
pub use schema::{
    LogFormat, NotifierConfig, ObservabilityConfig, PolicyConfig, SamplerConfig, SimulationConfig,
};
pub use validation::{validate_config, ValidationError};
