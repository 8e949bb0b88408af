//! Receiver identity, readings and transition events.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// One of the two redundant receivers.
///
/// The set is fixed at compile time; human-facing names come from
/// [`ReceiverLabels`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Receiver {
    Primary,
    Backup,
}

impl Receiver {
    /// Every receiver, primary first.
    pub const ALL: [Receiver; 2] = [Receiver::Primary, Receiver::Backup];

    /// Stable slot index, used for per-receiver arrays.
    pub const fn index(self) -> usize {
        match self {
            Receiver::Primary => 0,
            Receiver::Backup => 1,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Receiver::Primary => "primary",
            Receiver::Backup => "backup",
        }
    }
}

impl fmt::Display for Receiver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operator-facing names of the receivers ("FM1", "FM2", ...).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ReceiverLabels {
    pub primary: String,
    pub backup: String,
}

impl Default for ReceiverLabels {
    fn default() -> Self {
        Self {
            primary: "FM1".to_string(),
            backup: "FM2".to_string(),
        }
    }
}

impl ReceiverLabels {
    pub fn label(&self, receiver: Receiver) -> &str {
        match receiver {
            Receiver::Primary => &self.primary,
            Receiver::Backup => &self.backup,
        }
    }

    /// Resolve a role name ("primary"/"backup") or a configured label.
    /// Matching is case-insensitive.
    pub fn resolve(&self, name: &str) -> Option<Receiver> {
        let name = name.trim();
        Receiver::ALL.into_iter().find(|r| {
            name.eq_ignore_ascii_case(r.as_str()) || name.eq_ignore_ascii_case(self.label(*r))
        })
    }
}

/// The readings taken for both receivers in one tick.
///
/// `None` means the source could not produce a value this tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Readings {
    values: [Option<f64>; 2],
    /// Time the readings were taken, relative to the controller's clock origin.
    pub at: Duration,
}

impl Readings {
    pub fn new(at: Duration) -> Self {
        Self { values: [None; 2], at }
    }

    /// Readings with both values present.
    pub fn both(primary: f64, backup: f64, at: Duration) -> Self {
        Self {
            values: [Some(primary), Some(backup)],
            at,
        }
    }

    pub fn set(&mut self, receiver: Receiver, value: Option<f64>) {
        self.values[receiver.index()] = value;
    }

    pub fn get(&self, receiver: Receiver) -> Option<f64> {
        self.values[receiver.index()]
    }
}

/// A change of the active receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Transition {
    pub from: Receiver,
    pub to: Receiver,
    /// Controller time at which the switch was recorded.
    #[serde(serialize_with = "serialize_secs")]
    pub at: Duration,
}

impl Transition {
    /// True for primary → backup.
    pub fn is_failover(&self) -> bool {
        self.from == Receiver::Primary && self.to == Receiver::Backup
    }
}

fn serialize_secs<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64())
}
