//! Background delivery of switch decisions.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time;

use crate::config::NotifierConfig;
use crate::failover::{Receiver, ReceiverLabels};
use crate::notify::{NotifyError, SwitchNotifier};
use crate::observability::metrics;
use crate::resilience::Backoff;

/// How hard the worker tries to deliver one decision.
#[derive(Debug, Clone, Copy)]
pub struct DeliveryPolicy {
    /// Deadline for each attempt.
    pub timeout: Duration,
    /// Attempts per decision, including the first.
    pub max_attempts: u32,
    pub backoff: Backoff,
}

impl DeliveryPolicy {
    pub fn from_config(config: &NotifierConfig) -> Self {
        Self {
            timeout: config.timeout(),
            max_attempts: config.max_attempts.max(1),
            backoff: Backoff::from_config(config),
        }
    }
}

/// Outcome of delivering one decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delivery {
    Delivered,
    Superseded,
    GaveUp,
}

/// Non-blocking front end used by the polling loop.
///
/// [`dispatch`](Self::dispatch) only stores the decision; a worker task
/// owns the notifier and does the I/O.
#[derive(Debug)]
pub struct NotifyDispatcher {
    tx: watch::Sender<Option<Receiver>>,
}

impl NotifyDispatcher {
    /// Spawn the delivery worker on the current runtime.
    pub fn spawn<N: SwitchNotifier>(
        notifier: N,
        labels: ReceiverLabels,
        policy: DeliveryPolicy,
        shutdown: broadcast::Receiver<()>,
    ) -> (Self, JoinHandle<()>) {
        let (tx, rx) = watch::channel(None);
        let worker = Worker {
            notifier: Arc::new(notifier),
            labels,
            policy,
            rx,
        };
        let handle = tokio::spawn(worker.run(shutdown));
        (Self { tx }, handle)
    }

    /// Hand a new active receiver to the worker. Never blocks.
    pub fn dispatch(&self, receiver: Receiver) {
        if self.tx.send(Some(receiver)).is_err() {
            tracing::warn!(receiver = %receiver, "Notifier worker has stopped, switch not sent downstream");
        }
    }
}

struct Worker<N> {
    notifier: Arc<N>,
    labels: ReceiverLabels,
    policy: DeliveryPolicy,
    rx: watch::Receiver<Option<Receiver>>,
}

impl<N: SwitchNotifier> Worker<N> {
    async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        loop {
            tokio::select! {
                changed = self.rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                _ = shutdown.recv() => break,
            }

            let Some(target) = *self.rx.borrow_and_update() else {
                continue;
            };

            tokio::select! {
                outcome = self.deliver(target) => {
                    tracing::debug!(receiver = %target, outcome = ?outcome, "Notification finished");
                }
                _ = shutdown.recv() => break,
            }
        }
        tracing::debug!("Notifier worker exiting");
    }

    async fn attempt(&self, label: &str) -> Result<(), NotifyError> {
        match time::timeout(self.policy.timeout, self.notifier.notify(label)).await {
            Ok(result) => result,
            Err(_) => Err(NotifyError::Timeout(self.policy.timeout)),
        }
    }

    async fn deliver(&self, target: Receiver) -> Delivery {
        let label = self.labels.label(target);

        for attempt in 1..=self.policy.max_attempts {
            if attempt > 1 {
                time::sleep(self.policy.backoff.delay(attempt - 1)).await;
                if self.rx.has_changed().unwrap_or(false) {
                    tracing::debug!(receiver = %label, "Undelivered switch superseded by a newer decision");
                    return Delivery::Superseded;
                }
            }

            match self.attempt(label).await {
                Ok(()) => {
                    tracing::info!(receiver = %label, attempt, "Switch notification delivered");
                    return Delivery::Delivered;
                }
                Err(e) => {
                    tracing::warn!(receiver = %label, attempt, error = %e, "Switch notification failed");
                }
            }
        }

        tracing::warn!(
            receiver = %label,
            attempts = self.policy.max_attempts,
            "Giving up on switch notification; controller state unchanged"
        );
        metrics::record_notify_failure();
        Delivery::GaveUp
    }
}
