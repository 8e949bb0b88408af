//! State publishing subsystem.
//!
//! # Data Flow
//! ```text
//! Polling loop, end of each tick:
//!     → Snapshot::capture (readings + controller state + this tick's transition)
//!     → every StatePublisher::publish
//!         → SnapshotPublisher (arc-swap store, read by /status)
//!         → PrometheusPublisher (gauges and switch counter, read by /metrics)
//! ```
//!
//! # Design Decisions
//! - Publishers only read; they never feed back into the controller
//! - Each tick is published as a unit: one `publish` call carries everything
//!   the tick changed

pub mod snapshot;

pub use snapshot::{ReceiverStatus, Snapshot, SnapshotStore};

/// A sink for per-tick controller state.
pub trait StatePublisher: Send {
    /// Publish the state after a tick. `snapshot.transition` is set on the
    /// tick that switched.
    fn publish(&self, snapshot: &Snapshot);
}

/// Publishes into a [`SnapshotStore`].
pub struct SnapshotPublisher {
    store: SnapshotStore,
}

impl SnapshotPublisher {
    pub fn new(store: SnapshotStore) -> Self {
        Self { store }
    }
}

impl StatePublisher for SnapshotPublisher {
    fn publish(&self, snapshot: &Snapshot) {
        self.store.store(snapshot.clone());
    }
}
