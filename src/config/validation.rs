//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Reject policies whose dead zone is empty
//! - Validate value ranges (durations, probabilities, addresses)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: FailoverConfig → Result<(), Vec<ValidationError>>
//! - Runs before the polling loop starts

use std::net::SocketAddr;

use rand_distr::Normal;
use thiserror::Error;

use crate::config::schema::FailoverConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },

    #[error("good margin {good_margin} dBm must be above bad threshold {bad_threshold} dBm")]
    EmptyDeadZone { bad_threshold: f64, good_margin: f64 },

    #[error("{field} must be a non-negative number of seconds, got {value}")]
    InvalidDuration { field: &'static str, value: f64 },

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("unknown receiver '{0}' (expected primary, backup or a configured label)")]
    UnknownReceiver(String),

    #[error("receiver labels must be non-empty and distinct")]
    BadLabels,

    #[error("invalid {field} '{value}'")]
    Address { field: &'static str, value: String },

    #[error("simulation.{0}")]
    Simulation(&'static str),
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &FailoverConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(policy_errors) = config.policy.to_policy() {
        errors.extend(policy_errors);
    }

    let labels = &config.receivers;
    if labels.primary.trim().is_empty()
        || labels.backup.trim().is_empty()
        || labels.primary.eq_ignore_ascii_case(&labels.backup)
    {
        errors.push(ValidationError::BadLabels);
    } else if labels.resolve(&config.active_default).is_none() {
        errors.push(ValidationError::UnknownReceiver(config.active_default.clone()));
    }

    if config.sampler.poll_interval_ms == 0 {
        errors.push(ValidationError::Zero {
            field: "sampler.poll_interval_ms",
        });
    }

    let notifier = &config.notifier;
    if notifier.enabled {
        if notifier.timeout_ms == 0 {
            errors.push(ValidationError::Zero {
                field: "notifier.timeout_ms",
            });
        }
        if notifier.max_attempts == 0 {
            errors.push(ValidationError::Zero {
                field: "notifier.max_attempts",
            });
        }
        if reqwest::Url::parse(&notifier.url).is_err() {
            errors.push(ValidationError::Address {
                field: "notifier.url",
                value: notifier.url.clone(),
            });
        }
    }

    let obs = &config.observability;
    if obs.metrics_enabled && obs.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::Address {
            field: "observability.metrics_address",
            value: obs.metrics_address.clone(),
        });
    }

    let sim = &config.simulation;
    if !(0.0..=1.0).contains(&sim.blockage_probability) {
        errors.push(ValidationError::Simulation("blockage_probability must be within [0, 1]"));
    }
    if !(sim.blockage_min_secs > 0.0 && sim.blockage_min_secs <= sim.blockage_max_secs)
        || !sim.blockage_max_secs.is_finite()
    {
        errors.push(ValidationError::Simulation(
            "blockage durations must satisfy 0 < min <= max",
        ));
    }
    if Normal::new(0.0, sim.noise_std_db).is_err() {
        errors.push(ValidationError::Simulation("noise_std_db must be a finite, non-negative number"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
