//! # Readiness Monitoring
//!
//! Tracks whether the backend transport (the Dapr sidecar) is reachable.
//!
//! The state machine has two states, `NotReady` (initial) and `Ready`. A
//! successful probe moves it to `Ready`, a failed probe back to `NotReady`.
//! [`ReadinessMonitor`] is the only writer and is not `Clone`;
//! request handlers hold a read-only [`ReadinessHandle`]. The shared state is
//! a pair of atomics, so readers never wait on a probe in flight.

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::metrics::MetricsRecorder;
use crate::secrets::BackendTransport;

/// Readiness of the backend transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadinessStatus {
    NotReady,
    Ready,
}

impl ReadinessStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, ReadinessStatus::Ready)
    }
}

/// Sentinel for "never probed"
const NEVER: i64 = i64::MIN;

#[derive(Debug)]
struct ReadinessState {
    connected: AtomicBool,
    last_checked_ms: AtomicI64,
}

impl Default for ReadinessState {
    fn default() -> Self {
        Self { connected: AtomicBool::new(false), last_checked_ms: AtomicI64::new(NEVER) }
    }
}

/// Read-only view of the readiness state.
#[derive(Debug, Clone)]
pub struct ReadinessHandle {
    state: Arc<ReadinessState>,
}

impl ReadinessHandle {
    pub fn status(&self) -> ReadinessStatus {
        if self.state.connected.load(Ordering::SeqCst) {
            ReadinessStatus::Ready
        } else {
            ReadinessStatus::NotReady
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status().is_ready()
    }

    /// Completion time of the most recent probe, if any has completed
    pub fn last_checked_at(&self) -> Option<DateTime<Utc>> {
        match self.state.last_checked_ms.load(Ordering::SeqCst) {
            NEVER => None,
            millis => DateTime::from_timestamp_millis(millis),
        }
    }
}

/// Background prober and sole writer of the readiness state.
#[derive(Debug)]
pub struct ReadinessMonitor {
    state: Arc<ReadinessState>,
    transport: Arc<dyn BackendTransport>,
    interval: Duration,
    metrics: MetricsRecorder,
}

impl ReadinessMonitor {
    pub fn new(transport: Arc<dyn BackendTransport>, interval: Duration) -> Self {
        Self {
            state: Arc::new(ReadinessState::default()),
            transport,
            interval,
            metrics: MetricsRecorder::new(),
        }
    }

    pub fn handle(&self) -> ReadinessHandle {
        ReadinessHandle { state: self.state.clone() }
    }

    /// Probe the transport once and record the result.
    ///
    /// Returns the new readiness.
    pub async fn probe_once(&self) -> bool {
        let result = self.transport.probe().await;
        let connected = result.is_ok();

        let was_connected = self.state.connected.swap(connected, Ordering::SeqCst);
        self.state.last_checked_ms.store(Utc::now().timestamp_millis(), Ordering::SeqCst);
        self.metrics.set_transport_ready(connected);

        match (was_connected, result) {
            (false, Ok(())) => {
                info!(transport = self.transport.name(), "Backend transport connected, ready");
            }
            (true, Err(e)) => {
                warn!(
                    transport = self.transport.name(),
                    error = %e,
                    "Backend transport probe failed, not ready"
                );
            }
            (false, Err(e)) => {
                debug!(
                    transport = self.transport.name(),
                    error = %e,
                    "Backend transport still unreachable"
                );
            }
            (true, Ok(())) => {}
        }

        connected
    }

    /// Probe immediately, then every `interval`, until `shutdown` is cancelled.
    pub async fn run(self, shutdown: CancellationToken) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            transport = self.transport.name(),
            interval_ms = self.interval.as_millis() as u64,
            "Readiness monitor started"
        );

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    tokio::select! {
                        _ = shutdown.cancelled() => break,
                        _ = self.probe_once() => {}
                    }
                }
            }
        }

        info!("Readiness monitor stopped");
    }
}
