//! RSSI failover controller daemon.
//!
//! # Architecture Overview
//!
//! ```text
//!   ┌───────────────┐  every 250 ms   ┌────────────────┐   ┌──────────────────────┐
//!   │ SignalSource  │ ──────────────▶ │ QualitySampler │──▶│ FailoverController   │
//!   │ (simulated)   │                 └────────────────┘   │ dwell + hold + debounce
//!   └───────────────┘                                      └──────────┬───────────┘
//!                                                                     │ Snapshot / Transition
//!                                   ┌─────────────────────────────────┼───────────────┐
//!                                   ▼                                 ▼               ▼
//!                          ┌────────────────┐              ┌──────────────────┐ ┌─────────────┐
//!                          │ SnapshotStore  │              │ Prometheus gauges│ │ Notify      │
//!                          │ (arc-swap)     │              │ and counters     │ │ dispatcher  │
//!                          └───────┬────────┘              └────────┬─────────┘ └──────┬──────┘
//!                                  │ GET /status                    │ GET /metrics     │ POST /switch/{rx}
//!                                  ▼                                ▼                  ▼
//!                                       status server (axum)                    downstream switch
//! ```

use std::path::PathBuf;

use clap::Parser;

use rssi_failover::config::{read_config, validate_config, ConfigError, FailoverConfig, ValidationError};
use rssi_failover::failover::FailoverController;
use rssi_failover::http::{AppState, StatusServer};
use rssi_failover::lifecycle::{wait_for_signal, Shutdown};
use rssi_failover::notify::{DeliveryPolicy, HttpNotifier, LogNotifier, NotifyDispatcher};
use rssi_failover::observability::{logging, metrics};
use rssi_failover::publish::{Snapshot, SnapshotPublisher, SnapshotStore};
use rssi_failover::sampler::{QualitySampler, SimulatedSource};
use rssi_failover::service::FailoverService;

#[derive(Parser)]
#[command(name = "rssi-failover", version)]
#[command(about = "Hysteresis failover controller for a primary/backup receiver pair", long_about = None)]
struct Args {
    /// TOML configuration file; defaults apply when omitted.
    #[arg(short, long, env = "FAILOVER_CONFIG")]
    config: Option<PathBuf>,

    /// Receiver active at startup (primary, backup, or a receiver label).
    #[arg(long, env = "ACTIVE_RECEIVER")]
    active: Option<String>,

    /// Base URL of the downstream switch endpoint.
    #[arg(long, env = "NOTIFY_URL")]
    notify_url: Option<String>,

    /// Only log switch decisions; do not contact the downstream.
    #[arg(long)]
    no_notify: bool,

    /// Status server bind address.
    #[arg(long, env = "METRICS_ADDRESS")]
    metrics_address: Option<String>,

    /// Seed for the simulated signal source.
    #[arg(long)]
    seed: Option<u64>,
}

impl Args {
    fn apply(&self, config: &mut FailoverConfig) {
        if let Some(active) = &self.active {
            config.active_default = active.clone();
        }
        if let Some(url) = &self.notify_url {
            config.notifier.url = url.clone();
        }
        if self.no_notify {
            config.notifier.enabled = false;
        }
        if let Some(addr) = &self.metrics_address {
            config.observability.metrics_address = addr.clone();
        }
        if self.seed.is_some() {
            config.simulation.seed = self.seed;
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let mut config = read_config(args.config.as_deref())?;
    args.apply(&mut config);

    logging::init_logging(&config.observability);
    tracing::info!("rssi-failover v{} starting", env!("CARGO_PKG_VERSION"));

    if let Err(errors) = validate_config(&config) {
        for error in &errors {
            tracing::error!(error = %error, "Invalid configuration");
        }
        return Err(ConfigError::Validation(errors).into());
    }
    let policy = config.policy.to_policy().map_err(ConfigError::Validation)?;
    let labels = config.receivers.clone();
    let initial = labels.resolve(&config.active_default).ok_or_else(|| {
        ConfigError::Validation(vec![ValidationError::UnknownReceiver(
            config.active_default.clone(),
        )])
    })?;

    tracing::info!(
        active = %labels.label(initial),
        bad_threshold_dbm = policy.thresholds.bad_threshold,
        good_margin_dbm = policy.thresholds.good_margin,
        bad_hold_secs = policy.bad_hold.as_secs_f64(),
        good_hold_secs = policy.good_hold.as_secs_f64(),
        debounce_secs = policy.debounce.as_secs_f64(),
        "Configuration loaded"
    );

    let shutdown = Shutdown::new();
    let snapshots = SnapshotStore::new(Snapshot::initial(initial, &labels));

    let exporter = if config.observability.metrics_enabled {
        let exporter = metrics::init_metrics()?;
        let listener = StatusServer::bind(&config.observability.metrics_address).await?;
        let server = StatusServer::new(AppState {
            snapshots: snapshots.clone(),
            metrics: Some(exporter.clone()),
        });
        let server_shutdown = shutdown.subscribe();
        tokio::spawn(async move {
            if let Err(e) = server.run(listener, server_shutdown).await {
                tracing::error!(error = %e, "Status server failed");
            }
        });
        Some(exporter)
    } else {
        None
    };

    let delivery = DeliveryPolicy::from_config(&config.notifier);
    let (dispatcher, notifier_task) = if config.notifier.enabled {
        let notifier = HttpNotifier::new(&config.notifier.url, config.notifier.timeout())?;
        tracing::info!(url = %config.notifier.url, "Switch notifications enabled");
        NotifyDispatcher::spawn(notifier, labels.clone(), delivery, shutdown.subscribe())
    } else {
        NotifyDispatcher::spawn(LogNotifier, labels.clone(), delivery, shutdown.subscribe())
    };

    let source = SimulatedSource::new(config.simulation.clone(), policy.thresholds)?;
    let mut service = FailoverService::new(
        QualitySampler::new(source, labels.clone()),
        FailoverController::new(policy, initial),
        labels.clone(),
        config.sampler.poll_interval(),
    )
    .with_publisher(SnapshotPublisher::new(snapshots))
    .with_dispatcher(dispatcher);
    if let Some(exporter) = &exporter {
        service = service.with_publisher(exporter.publisher(labels.clone(), policy.thresholds));
    }

    let polling = tokio::spawn(service.run(shutdown.subscribe()));

    wait_for_signal().await;
    shutdown.trigger();

    match polling.await {
        Ok(service) => {
            let counts = service.controller().state().counts();
            tracing::info!(
                failovers = counts.failovers,
                failbacks = counts.failbacks,
                ticks = service.ticks(),
                "Polling loop stopped"
            );
        }
        Err(e) => tracing::error!(error = %e, "Polling loop task failed"),
    }
    if let Err(e) = notifier_task.await {
        tracing::error!(error = %e, "Notifier worker task failed");
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
