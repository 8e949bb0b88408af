//! Configuration schema definitions.
//!
//! Every section derives Serde traits and has defaults, so an empty file
//! (or no file at all) yields the reference configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::validation::ValidationError;
use crate::failover::{Policy, ReceiverLabels, Thresholds};

/// Root configuration for the failover controller.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FailoverConfig {
    /// Receiver active at startup: "primary", "backup", or a receiver label.
    pub active_default: String,

    /// Operator-facing receiver names.
    pub receivers: ReceiverLabels,

    /// Thresholds, hold times and debounce.
    pub policy: PolicyConfig,

    /// Polling cadence.
    pub sampler: SamplerConfig,

    /// Downstream switch notification.
    pub notifier: NotifierConfig,

    /// Logging and metrics.
    pub observability: ObservabilityConfig,

    /// Development signal generator.
    pub simulation: SimulationConfig,
}

impl Default for FailoverConfig {
    fn default() -> Self {
        Self {
            active_default: "primary".to_string(),
            receivers: ReceiverLabels::default(),
            policy: PolicyConfig::default(),
            sampler: SamplerConfig::default(),
            notifier: NotifierConfig::default(),
            observability: ObservabilityConfig::default(),
            simulation: SimulationConfig::default(),
        }
    }
}

/// Failover policy, in dBm and seconds.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Below this a receiver is bad.
    pub bad_threshold_dbm: f64,

    /// Above this a receiver is good. Must exceed `bad_threshold_dbm`.
    pub good_margin_dbm: f64,

    /// Continuous bad time before failing away from the primary.
    pub bad_hold_secs: f64,

    /// Continuous good time before failing back to the primary.
    pub good_hold_secs: f64,

    /// Minimum time between any two switches.
    pub debounce_secs: f64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            bad_threshold_dbm: -65.0,
            good_margin_dbm: -60.0,
            bad_hold_secs: 1.5,
            good_hold_secs: 5.0,
            debounce_secs: 0.2,
        }
    }
}

impl PolicyConfig {
    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            bad_threshold: self.bad_threshold_dbm,
            good_margin: self.good_margin_dbm,
        }
    }

    /// Convert to the controller's policy, rejecting unusable values.
    pub fn to_policy(&self) -> Result<Policy, Vec<ValidationError>> {
        let mut errors = Vec::new();

        for (name, value) in [
            ("policy.bad_threshold_dbm", self.bad_threshold_dbm),
            ("policy.good_margin_dbm", self.good_margin_dbm),
        ] {
            if !value.is_finite() {
                errors.push(ValidationError::NotFinite { field: name });
            }
        }
        if errors.is_empty() && self.good_margin_dbm <= self.bad_threshold_dbm {
            errors.push(ValidationError::EmptyDeadZone {
                bad_threshold: self.bad_threshold_dbm,
                good_margin: self.good_margin_dbm,
            });
        }

        let mut hold = |field: &'static str, secs: f64| {
            Duration::try_from_secs_f64(secs)
                .map_err(|_| errors.push(ValidationError::InvalidDuration { field, value: secs }))
                .ok()
        };
        let bad_hold = hold("policy.bad_hold_secs", self.bad_hold_secs);
        let good_hold = hold("policy.good_hold_secs", self.good_hold_secs);
        let debounce = hold("policy.debounce_secs", self.debounce_secs);

        match (bad_hold, good_hold, debounce) {
            (Some(bad_hold), Some(good_hold), Some(debounce)) if errors.is_empty() => Ok(Policy {
                thresholds: self.thresholds(),
                bad_hold,
                good_hold,
                debounce,
            }),
            _ => Err(errors),
        }
    }
}

/// Sampling cadence.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Polling interval in milliseconds.
    pub poll_interval_ms: u64,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 250,
        }
    }
}

impl SamplerConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Switch notifier configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NotifierConfig {
    /// Send switch notifications downstream.
    pub enabled: bool,

    /// Base URL of the switch endpoint; `/switch/{label}` is appended.
    pub url: String,

    /// Per-attempt timeout in milliseconds.
    pub timeout_ms: u64,

    /// Attempts per decision, including the first.
    pub max_attempts: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            url: "http://gnuradio:8080".to_string(),
            timeout_ms: 2000,
            max_attempts: 3,
            base_delay_ms: 100,
            max_delay_ms: 1000,
        }
    }
}

impl NotifierConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Pretty for terminals, JSON for log shippers.
    pub log_format: LogFormat,

    /// Serve `/metrics` and `/status`.
    pub metrics_enabled: bool,

    /// Status server bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9100".to_string(),
        }
    }
}

/// Parameters of the simulated signal source.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Mean level of the primary.
    pub primary_base_dbm: f64,

    /// Mean level of the backup.
    pub backup_base_dbm: f64,

    /// Standard deviation of receiver noise.
    pub noise_std_db: f64,

    /// Chance per primary sample that a blockage starts.
    pub blockage_probability: f64,

    pub blockage_min_secs: f64,

    pub blockage_max_secs: f64,

    /// Keep the backup just above the good margin.
    pub backup_floor: bool,

    /// Fixed RNG seed for reproducible runs.
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            primary_base_dbm: -45.0,
            backup_base_dbm: -48.0,
            noise_std_db: 2.2,
            blockage_probability: 0.01,
            blockage_min_secs: 4.0,
            blockage_max_secs: 10.0,
            backup_floor: true,
            seed: None,
        }
    }
}
