//! Metrics collection and exposition.
//!
//! # Metrics
//! - `fm_rssi_dbm{receiver}` (gauge): latest reading, NaN when sampling failed
//! - `fm_active_receiver{receiver}` (gauge): 1=active, 0=inactive
//! - `fm_switch_events_total{from_receiver,to_receiver}` (counter)
//! - `fm_rssi_threshold_dbm`, `fm_rssi_good_margin_dbm` (gauges): configured policy
//! - `fm_sample_failures_total{receiver}` (counter)
//! - `fm_notify_failures_total` (counter): decisions the downstream never acknowledged
//!
//! Gauge writes for one tick happen under the write side of a gate and
//! rendering takes the read side, so a scrape sees whole ticks only.

use std::sync::{Arc, PoisonError, RwLock};

use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

use crate::failover::{ReceiverLabels, Thresholds};
use crate::publish::{Snapshot, StatePublisher};

pub const RSSI_DBM: &str = "fm_rssi_dbm";
pub const ACTIVE_RECEIVER: &str = "fm_active_receiver";
pub const SWITCH_EVENTS: &str = "fm_switch_events_total";
pub const THRESHOLD_DBM: &str = "fm_rssi_threshold_dbm";
pub const GOOD_MARGIN_DBM: &str = "fm_rssi_good_margin_dbm";
pub const SAMPLE_FAILURES: &str = "fm_sample_failures_total";
pub const NOTIFY_FAILURES: &str = "fm_notify_failures_total";

/// Install the global Prometheus recorder.
pub fn init_metrics() -> Result<MetricsExporter, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    describe_metrics();
    tracing::info!("Prometheus recorder installed");
    Ok(MetricsExporter::new(handle))
}

pub fn describe_metrics() {
    describe_gauge!(RSSI_DBM, "Current RSSI in dBm");
    describe_gauge!(ACTIVE_RECEIVER, "Currently active receiver (1 = active, 0 = inactive)");
    describe_counter!(SWITCH_EVENTS, "Number of receiver switches");
    describe_gauge!(THRESHOLD_DBM, "Configured RSSI failover threshold (dBm)");
    describe_gauge!(GOOD_MARGIN_DBM, "Configured RSSI good margin (dBm)");
    describe_counter!(SAMPLE_FAILURES, "Ticks on which a receiver produced no reading");
    describe_counter!(NOTIFY_FAILURES, "Switch notifications that were never delivered");
}

pub fn record_sample_failure(receiver: &str) {
    counter!(SAMPLE_FAILURES, "receiver" => receiver.to_string()).increment(1);
}

pub fn record_notify_failure() {
    counter!(NOTIFY_FAILURES).increment(1);
}

/// Handle to the installed recorder plus the tick gate.
#[derive(Clone)]
pub struct MetricsExporter {
    handle: PrometheusHandle,
    gate: Arc<RwLock<()>>,
}

impl MetricsExporter {
    pub fn new(handle: PrometheusHandle) -> Self {
        Self {
            handle,
            gate: Arc::new(RwLock::new(())),
        }
    }

    /// Prometheus text exposition of every metric.
    pub fn render(&self) -> String {
        let _tick = self.gate.read().unwrap_or_else(PoisonError::into_inner);
        self.handle.render()
    }

    /// A publisher whose writes are serialized against [`render`](Self::render).
    pub fn publisher(&self, labels: ReceiverLabels, thresholds: Thresholds) -> PrometheusPublisher {
        PrometheusPublisher::new(self.gate.clone(), labels, thresholds)
    }
}

/// Mirrors each tick into Prometheus gauges and counters.
pub struct PrometheusPublisher {
    gate: Arc<RwLock<()>>,
    labels: ReceiverLabels,
}

impl PrometheusPublisher {
    pub fn new(gate: Arc<RwLock<()>>, labels: ReceiverLabels, thresholds: Thresholds) -> Self {
        gauge!(THRESHOLD_DBM).set(thresholds.bad_threshold);
        gauge!(GOOD_MARGIN_DBM).set(thresholds.good_margin);
        Self { gate, labels }
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

impl StatePublisher for PrometheusPublisher {
    fn publish(&self, snapshot: &Snapshot) {
        let _tick = self.gate.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(t) = &snapshot.transition {
            counter!(
                SWITCH_EVENTS,
                "from_receiver" => self.labels.label(t.from).to_string(),
                "to_receiver" => self.labels.label(t.to).to_string()
            )
            .increment(1);
        }
        for status in &snapshot.receivers {
            let reading = status.rssi_dbm.map_or(f64::NAN, round2);
            gauge!(RSSI_DBM, "receiver" => status.label.clone()).set(reading);
            gauge!(ACTIVE_RECEIVER, "receiver" => status.label.clone())
                .set(if status.active { 1.0 } else { 0.0 });
        }
    }
}
