//! The polling loop.
//!
//! # Responsibilities
//! - Drive one strictly ordered tick per poll interval:
//!   sample → update dwell → evaluate → publish → notify
//! - Own the controller state exclusively
//! - Keep running through sampling and notification failures

use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::failover::{FailoverController, Readings, Receiver, ReceiverLabels, Transition};
use crate::notify::NotifyDispatcher;
use crate::publish::{Snapshot, StatePublisher};
use crate::sampler::{QualitySampler, SignalSource};

/// Sampler, controller and sinks wired together.
pub struct FailoverService<S> {
    sampler: QualitySampler<S>,
    controller: FailoverController,
    labels: ReceiverLabels,
    publishers: Vec<Box<dyn StatePublisher>>,
    dispatcher: Option<NotifyDispatcher>,
    poll_interval: Duration,
    ticks: u64,
}

impl<S: SignalSource> FailoverService<S> {
    pub fn new(
        sampler: QualitySampler<S>,
        controller: FailoverController,
        labels: ReceiverLabels,
        poll_interval: Duration,
    ) -> Self {
        Self {
            sampler,
            controller,
            labels,
            publishers: Vec::new(),
            dispatcher: None,
            poll_interval,
            ticks: 0,
        }
    }

    pub fn with_publisher(mut self, publisher: impl StatePublisher + 'static) -> Self {
        self.publishers.push(Box::new(publisher));
        self
    }

    pub fn with_dispatcher(mut self, dispatcher: NotifyDispatcher) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    pub fn controller(&self) -> &FailoverController {
        &self.controller
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Run a single tick at controller time `at`.
    pub fn tick(&mut self, at: Duration) -> Option<Transition> {
        let readings = self.sampler.sample(at);
        let transition = self.controller.step(&readings);
        self.ticks += 1;

        tracing::trace!(
            tick = self.ticks,
            primary_dbm = ?readings.get(Receiver::Primary),
            backup_dbm = ?readings.get(Receiver::Backup),
            active = %self.labels.label(self.controller.active()),
            "Tick"
        );

        if let Some(t) = &transition {
            self.announce(t, &readings);
        }

        let snapshot = Snapshot::capture(
            self.ticks,
            &self.controller,
            &readings,
            transition,
            &self.labels,
        );
        for publisher in &self.publishers {
            publisher.publish(&snapshot);
        }

        if let (Some(t), Some(dispatcher)) = (&transition, &self.dispatcher) {
            dispatcher.dispatch(t.to);
        }
        transition
    }

    fn announce(&self, t: &Transition, readings: &Readings) {
        tracing::info!(
            kind = if t.is_failover() { "failover" } else { "failback" },
            from = %self.labels.label(t.from),
            to = %self.labels.label(t.to),
            primary_dbm = ?readings.get(Receiver::Primary),
            backup_dbm = ?readings.get(Receiver::Backup),
            at_secs = t.at.as_secs_f64(),
            "Active receiver switched"
        );
    }
}

impl<S: SignalSource + 'static> FailoverService<S> {
    /// Tick every poll interval until shutdown. Returns the service so
    /// callers can inspect final state.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) -> Self {
        let origin = Instant::now();
        let mut ticker = time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            poll_interval_ms = self.poll_interval.as_millis() as u64,
            active = %self.labels.label(self.controller.active()),
            "Polling loop starting"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.tick(origin.elapsed());
                }
                _ = shutdown.recv() => {
                    tracing::info!(ticks = self.ticks, "Polling loop received shutdown signal, exiting");
                    break;
                }
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::failover::{Policy, Thresholds};
    use crate::publish::{SnapshotPublisher, SnapshotStore};
    use crate::sampler::FnSource;
    use std::sync::{Arc, Mutex};

    fn policy() -> Policy {
        Policy {
            thresholds: Thresholds {
                bad_threshold: -65.0,
                good_margin: -60.0,
            },
            bad_hold: Duration::from_millis(1500),
            good_hold: Duration::from_secs(5),
            debounce: Duration::from_millis(200),
        }
    }

    /// Records the order in which sinks are called.
    struct Journal(Arc<Mutex<Vec<String>>>);

    impl StatePublisher for Journal {
        fn publish(&self, snapshot: &Snapshot) {
            let entry = match snapshot.transition {
                Some(t) => format!("publish:{}:{}->{}", snapshot.active, t.from, t.to),
                None => format!("publish:{}", snapshot.active),
            };
            self.0.lock().unwrap().push(entry);
        }
    }

    #[test]
    fn test_transition_published_with_its_tick() {
        let journal = Arc::new(Mutex::new(Vec::new()));
        let source = FnSource::new(|r, _| Some(if r == Receiver::Primary { -70.0 } else { -55.0 }));
        let labels = ReceiverLabels::default();
        let mut service = FailoverService::new(
            QualitySampler::new(source, labels.clone()),
            FailoverController::new(policy(), Receiver::Primary),
            labels,
            Duration::from_millis(250),
        )
        .with_publisher(Journal(journal.clone()));

        assert!(service.tick(Duration::ZERO).is_none());
        let t = service.tick(Duration::from_millis(1500)).expect("failover");
        assert_eq!(t.to, Receiver::Backup);
        assert_eq!(service.ticks(), 2);

        let entries = journal.lock().unwrap().clone();
        assert_eq!(
            entries,
            vec!["publish:FM1", "publish:FM2:primary->backup"]
        );
    }

    #[test]
    fn test_snapshot_store_sees_latest_tick() {
        let labels = ReceiverLabels::default();
        let store = SnapshotStore::new(Snapshot::initial(Receiver::Primary, &labels));
        let source = FnSource::new(|_, _| Some(-50.0));
        let mut service = FailoverService::new(
            QualitySampler::new(source, labels.clone()),
            FailoverController::new(policy(), Receiver::Primary),
            labels,
            Duration::from_millis(250),
        )
        .with_publisher(SnapshotPublisher::new(store.clone()));

        for i in 0..4 {
            service.tick(Duration::from_millis(250 * i));
        }
        let snap = store.load();
        assert_eq!(snap.tick, 4);
        assert_eq!(snap.receiver(Receiver::Primary).rssi_dbm, Some(-50.0));
        assert_eq!(snap.receiver(Receiver::Primary).good_for_secs, Some(0.75));
    }
}
