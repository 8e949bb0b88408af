//! Per-tick sampling of both receivers.

use std::time::Duration;

use crate::failover::{Readings, Receiver, ReceiverLabels};
use crate::observability::metrics;
use crate::sampler::source::{SampleError, SignalSource};

/// Polls a [`SignalSource`] once per receiver and packages the result.
///
/// A failed or non-finite sample becomes a missing reading; it never
/// aborts the tick.
pub struct QualitySampler<S> {
    source: S,
    labels: ReceiverLabels,
}

impl<S: SignalSource> QualitySampler<S> {
    pub fn new(source: S, labels: ReceiverLabels) -> Self {
        Self { source, labels }
    }

    pub fn sample(&mut self, at: Duration) -> Readings {
        let mut readings = Readings::new(at);
        for receiver in Receiver::ALL {
            let value = match self.source.sample(receiver, at) {
                Ok(v) if v.is_finite() => Some(v),
                Ok(v) => self.failed(SampleError::NonFinite { receiver, value: v }, receiver),
                Err(e) => self.failed(e, receiver),
            };
            readings.set(receiver, value);
        }
        readings
    }

    fn failed(&self, error: SampleError, receiver: Receiver) -> Option<f64> {
        let label = self.labels.label(receiver);
        tracing::warn!(receiver = %label, error = %error, "Sampling failed, reading skipped");
        metrics::record_sample_failure(label);
        None
    }
}
