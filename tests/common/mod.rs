//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use rssi_failover::failover::{
    FailoverController, Policy, Receiver, ReceiverLabels, Thresholds, Transition,
};
use rssi_failover::publish::{Snapshot, StatePublisher};
use rssi_failover::sampler::{FnSource, QualitySampler, SignalSource};
use rssi_failover::service::FailoverService;

/// Reference policy: -65/-60 dBm, 1.5 s bad hold, 5 s good hold, 0.2 s debounce.
pub fn reference_policy() -> Policy {
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

/// Publisher that keeps every transition it is told about.
#[derive(Clone, Default)]
pub struct TransitionLog {
    transitions: Arc<Mutex<Vec<Transition>>>,
    ticks: Arc<Mutex<u64>>,
}

impl TransitionLog {
    pub fn transitions(&self) -> Vec<Transition> {
        self.transitions.lock().unwrap().clone()
    }

    pub fn ticks(&self) -> u64 {
        *self.ticks.lock().unwrap()
    }
}

impl StatePublisher for TransitionLog {
    fn publish(&self, snapshot: &Snapshot) {
        *self.ticks.lock().unwrap() = snapshot.tick;
        if let Some(transition) = snapshot.transition {
            self.transitions.lock().unwrap().push(transition);
        }
    }
}

/// A service over a scripted `(primary, backup)` trace.
pub fn scripted_service<F>(
    policy: Policy,
    initial: Receiver,
    poll_interval: Duration,
    mut trace: F,
) -> (FailoverService<impl SignalSource + 'static>, TransitionLog)
where
    F: FnMut(Duration) -> (f64, f64) + Send + 'static,
{
    let labels = ReceiverLabels::default();
    let source = FnSource::new(move |rx, at| {
        let (p, b) = trace(at);
        Some(if rx == Receiver::Primary { p } else { b })
    });
    let log = TransitionLog::default();
    let service = FailoverService::new(
        QualitySampler::new(source, labels.clone()),
        FailoverController::new(policy, initial),
        labels,
        poll_interval,
    )
    .with_publisher(log.clone());
    (service, log)
}

/// A mock downstream switch endpoint.
pub struct MockSwitch {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockSwitch {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Request lines received so far, e.g. `POST /switch/FM2`.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

/// Start a mock switch endpoint on an ephemeral port. `status` picks the
/// response code from the request path; `delay` is applied before replying.
pub async fn start_mock_switch<F>(status: F, delay: Duration) -> MockSwitch
where
    F: Fn(&str) -> u16 + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let status = Arc::new(status);

    let recorded = requests.clone();
    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let recorded = recorded.clone();
            let status = status.clone();
            tokio::spawn(async move {
                let mut buf = Vec::new();
                let mut chunk = [0u8; 1024];
                while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut chunk).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => buf.extend_from_slice(&chunk[..n]),
                    }
                }
                let head = String::from_utf8_lossy(&buf);
                let line = head.lines().next().unwrap_or_default();
                let mut parts = line.split_whitespace();
                let method = parts.next().unwrap_or_default();
                let path = parts.next().unwrap_or_default().to_string();
                recorded.lock().unwrap().push(format!("{method} {path}"));

                tokio::time::sleep(delay).await;

                let code = status(&path);
                let reason = match code {
                    200 => "OK",
                    400 => "Bad Request",
                    503 => "Service Unavailable",
                    _ => "Internal Server Error",
                };
                let response = format!(
                    "HTTP/1.1 {code} {reason}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    MockSwitch { addr, requests }
}

/// An address nothing listens on.
pub async fn closed_address() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}
