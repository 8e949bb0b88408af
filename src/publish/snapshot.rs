//! Per-tick state snapshots.

use std::sync::Arc;

use arc_swap::ArcSwap;
use serde::Serialize;

use crate::failover::{FailoverController, Readings, Receiver, ReceiverLabels, Transition, TransitionCounts};

/// What observers see of one receiver.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReceiverStatus {
    pub role: Receiver,
    pub label: String,
    /// Latest reading in dBm; absent when sampling failed this tick.
    pub rssi_dbm: Option<f64>,
    pub active: bool,
    /// Seconds continuously below the bad threshold.
    pub bad_for_secs: Option<f64>,
    /// Seconds continuously above the good margin.
    pub good_for_secs: Option<f64>,
}

/// Immutable view of the controller after one tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    pub elapsed_secs: f64,
    pub active: String,
    pub receivers: Vec<ReceiverStatus>,
    pub transitions: TransitionCounts,
    pub last_transition: Option<Transition>,
    /// The switch made on this tick.
    #[serde(skip)]
    pub transition: Option<Transition>,
}

impl Snapshot {
    /// Capture the controller state together with the readings and the
    /// transition, if any, that produced it.
    pub fn capture(
        tick: u64,
        controller: &FailoverController,
        readings: &Readings,
        transition: Option<Transition>,
        labels: &ReceiverLabels,
    ) -> Self {
        let state = controller.state();
        let now = readings.at;
        let receivers = Receiver::ALL
            .into_iter()
            .map(|role| {
                let dwell = state.dwell(role);
                ReceiverStatus {
                    role,
                    label: labels.label(role).to_string(),
                    rssi_dbm: readings.get(role),
                    active: state.active() == role,
                    bad_for_secs: dwell.bad_for(now).map(|d| d.as_secs_f64()),
                    good_for_secs: dwell.good_for(now).map(|d| d.as_secs_f64()),
                }
            })
            .collect();

        Self {
            tick,
            elapsed_secs: now.as_secs_f64(),
            active: labels.label(state.active()).to_string(),
            receivers,
            transitions: state.counts(),
            last_transition: state.last_transition(),
            transition,
        }
    }

    /// Snapshot before the first tick: no readings yet.
    pub fn initial(active: Receiver, labels: &ReceiverLabels) -> Self {
        Self {
            tick: 0,
            elapsed_secs: 0.0,
            active: labels.label(active).to_string(),
            receivers: Receiver::ALL
                .into_iter()
                .map(|role| ReceiverStatus {
                    role,
                    label: labels.label(role).to_string(),
                    rssi_dbm: None,
                    active: role == active,
                    bad_for_secs: None,
                    good_for_secs: None,
                })
                .collect(),
            transitions: TransitionCounts::default(),
            last_transition: None,
            transition: None,
        }
    }

    pub fn receiver(&self, role: Receiver) -> &ReceiverStatus {
        &self.receivers[role.index()]
    }
}

/// Latest snapshot, swapped in whole once per tick.
///
/// Readers on other tasks never observe a partially updated tick.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    inner: Arc<ArcSwap<Snapshot>>,
}

impl SnapshotStore {
    pub fn new(initial: Snapshot) -> Self {
        Self {
            inner: Arc::new(ArcSwap::from_pointee(initial)),
        }
    }

    pub fn load(&self) -> Arc<Snapshot> {
        self.inner.load_full()
    }

    pub fn store(&self, snapshot: Snapshot) {
        self.inner.store(Arc::new(snapshot));
    }
}
