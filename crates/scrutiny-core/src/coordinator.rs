// ── Aggregation coordinator ──
//
// Runs refresh cycles against a `DeviceSource`: one summary call, then a
// concurrent detail call per device, then reduction into a new device map
// published through the `SnapshotStore`. At most one cycle is in flight;
// concurrent triggers join it instead of starting another.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use futures_util::future::{BoxFuture, FutureExt, Shared, join_all};
use strum::{Display, IntoStaticStr};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use scrutiny_api::{ScrutinyClient, TlsMode, TransportConfig};

use crate::config::{CoordinatorConfig, TlsVerification};
use crate::error::{CoreError, RefreshError};
use crate::model::{DeviceMap, DeviceWwn, Snapshot};
use crate::reduce::{DetailResult, reduce};
use crate::source::{DeviceSource, Roster};
use crate::store::{RosterDelta, SnapshotStore};

// ── CoordinatorState ─────────────────────────────────────────────

/// Whether a cycle is currently running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum CoordinatorState {
    Idle,
    Refreshing,
}

// ── CycleReport ──────────────────────────────────────────────────

/// Outcome of a cycle that published a new device map.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub snapshot: Arc<Snapshot>,
    /// Devices seen for the first time, in roster order.
    pub added: Vec<DeviceWwn>,
    /// Devices that dropped out of the roster.
    pub removed: Vec<DeviceWwn>,
    /// Devices published with a placeholder detail section.
    pub detail_failures: Vec<DeviceWwn>,
    pub elapsed: Duration,
}

pub type CycleResult = Result<CycleReport, RefreshError>;

type SharedCycle = Shared<BoxFuture<'static, CycleResult>>;

// ── Coordinator ──────────────────────────────────────────────────

/// Owns the snapshot cell and drives refresh cycles.
///
/// Cheaply cloneable via `Arc<CoordinatorInner>`.
pub struct Coordinator<S: DeviceSource = ScrutinyClient> {
    inner: Arc<CoordinatorInner<S>>,
}

impl<S: DeviceSource> Clone for Coordinator<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct CoordinatorInner<S> {
    config: CoordinatorConfig,
    source: Arc<S>,
    store: SnapshotStore,
    state: watch::Sender<CoordinatorState>,
    /// The cycle currently running, if any. Cleared by the cycle task.
    in_flight: Mutex<Option<SharedCycle>>,
    cancel: CancellationToken,
    task_handles: tokio::sync::Mutex<Vec<JoinHandle<()>>>,
}

impl Coordinator<ScrutinyClient> {
    /// Build a coordinator backed by the Scrutiny HTTP API.
    pub fn from_config(config: CoordinatorConfig) -> Result<Self, CoreError> {
        let transport = build_transport(&config);
        let client = ScrutinyClient::new(config.url.clone(), &transport).map_err(|e| {
            CoreError::ClientSetup {
                url: config.url.to_string(),
                reason: e.to_string(),
            }
        })?;
        Ok(Self::new(client, config))
    }
}

impl<S: DeviceSource> Coordinator<S> {
    /// Create a coordinator. Nothing is fetched until [`refresh`](Self::refresh),
    /// [`first_refresh`](Self::first_refresh) or [`start`](Self::start).
    pub fn new(source: S, config: CoordinatorConfig) -> Self {
        let (state, _) = watch::channel(CoordinatorState::Idle);
        Self {
            inner: Arc::new(CoordinatorInner {
                config,
                source: Arc::new(source),
                store: SnapshotStore::new(),
                state,
                in_flight: Mutex::new(None),
                cancel: CancellationToken::new(),
                task_handles: tokio::sync::Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.inner.config
    }

    pub fn source(&self) -> &S {
        &self.inner.source
    }

    // ── Reads ────────────────────────────────────────────────────

    /// Current snapshot. Never blocks on a running cycle.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.inner.store.load()
    }

    /// Receive every newly published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.inner.store.subscribe()
    }

    pub fn state(&self) -> watch::Receiver<CoordinatorState> {
        self.inner.state.subscribe()
    }

    /// Did the most recent cycle succeed?
    pub fn is_fresh(&self) -> bool {
        self.snapshot().is_fresh()
    }

    // ── Refresh ──────────────────────────────────────────────────

    /// Run a refresh cycle, or join the one already running.
    ///
    /// Every caller that overlaps a running cycle receives that cycle's
    /// outcome; no second cycle is started or queued.
    pub async fn refresh(&self) -> CycleResult {
        self.join_or_start_cycle().await
    }

    /// Initial refresh at startup. Same as [`refresh`](Self::refresh), with
    /// the outcome logged for the operator.
    pub async fn first_refresh(&self) -> CycleResult {
        info!(source = %self.inner.source.describe(), "performing first refresh");
        match self.refresh().await {
            Ok(report) => {
                info!(
                    devices = report.snapshot.len(),
                    detail_failures = report.detail_failures.len(),
                    "first refresh complete"
                );
                Ok(report)
            }
            Err(e) => {
                if e.is_auth() {
                    error!(error = %e, "first refresh rejected by Scrutiny");
                } else {
                    warn!(error = %e, "first refresh failed");
                }
                Err(e)
            }
        }
    }

    fn join_or_start_cycle(&self) -> SharedCycle {
        let mut slot = self
            .inner
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(cycle) = slot.as_ref() {
            debug!("refresh already in flight; joining it");
            return cycle.clone();
        }

        let inner = Arc::clone(&self.inner);
        let handle = tokio::spawn(async move {
            let _guard = InFlightGuard(&inner);
            match AssertUnwindSafe(inner.run_cycle()).catch_unwind().await {
                Ok(result) => result,
                Err(panic) => {
                    let reason = panic_message(&*panic);
                    error!(reason = %reason, "refresh cycle panicked");
                    let err = RefreshError::Aborted { reason };
                    inner.store.record_failure(err.clone());
                    Err(err)
                }
            }
        });
        let cycle = async move {
            handle.await.unwrap_or_else(|e| {
                error!(error = %e, "refresh cycle task failed");
                Err(RefreshError::Aborted {
                    reason: e.to_string(),
                })
            })
        }
        .boxed()
        .shared();

        *slot = Some(cycle.clone());
        cycle
    }

    // ── Background tasks ─────────────────────────────────────────

    /// Spawn the periodic refresh task. A zero `refresh_interval` spawns
    /// nothing, and a second call while the task runs is ignored.
    pub async fn start(&self) {
        let interval = self.inner.config.refresh_interval;
        if interval.is_zero() {
            debug!("periodic refresh disabled");
            return;
        }

        let mut handles = self.inner.task_handles.lock().await;
        if !handles.is_empty() {
            debug!("periodic refresh already running");
            return;
        }
        let coordinator = self.clone();
        let cancel = self.inner.cancel.child_token();
        handles.push(tokio::spawn(refresh_task(coordinator, interval, cancel)));
        info!(interval_secs = interval.as_secs(), "periodic refresh started");
    }

    /// Cancel background tasks and wait for them to stop.
    ///
    /// A cycle already in flight is allowed to finish.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        debug!("coordinator shut down");
    }
}

// ── Cycle ────────────────────────────────────────────────────────

impl<S: DeviceSource> CoordinatorInner<S> {
    async fn run_cycle(&self) -> CycleResult {
        let started = Instant::now();
        self.state.send_replace(CoordinatorState::Refreshing);
        debug!("refresh cycle started");

        let roster = match self.source.fetch_summary().await {
            Ok(roster) => roster,
            Err(e) => {
                if e.kind() == scrutiny_api::FailureKind::Unexpected {
                    error!(error = ?e, "unexpected error fetching Scrutiny summary");
                }
                let err = RefreshError::summary(e);
                self.store.record_failure(err.clone());
                debug!(error = %err, "refresh cycle aborted");
                return Err(err);
            }
        };

        let details = self.fetch_details(&roster).await;

        let mut devices = DeviceMap::with_capacity(roster.len());
        let mut detail_failures = Vec::new();
        for ((wwn, summary), detail) in roster.into_iter().zip(details) {
            if detail.is_err() {
                detail_failures.push(wwn.clone());
            }
            let record = reduce(&wwn, summary, detail);
            devices.insert(wwn, record);
        }

        let (snapshot, RosterDelta { added, removed }) =
            self.store.publish(devices, detail_failures.clone());
        let elapsed = started.elapsed();

        info!(
            devices = snapshot.len(),
            added = added.len(),
            removed = removed.len(),
            detail_failures = detail_failures.len(),
            elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            "refresh cycle complete"
        );

        Ok(CycleReport {
            snapshot,
            added,
            removed,
            detail_failures,
            elapsed,
        })
    }

    /// Fan out one detail call per device and wait for all of them.
    ///
    /// Results come back in roster order. A failed, panicked, or
    /// deadline-aborted task becomes an error for that device only.
    async fn fetch_details(&self, roster: &Roster) -> Vec<DetailResult> {
        if roster.is_empty() {
            return Vec::new();
        }
        debug!(devices = roster.len(), "fetching device details");

        let deadline = self.config.cycle_deadline.map(|d| (Instant::now() + d, d));
        let handles: Vec<JoinHandle<DetailResult>> = roster
            .keys()
            .map(|wwn| {
                let source = Arc::clone(&self.source);
                let wwn = wwn.clone();
                tokio::spawn(async move { source.fetch_detail(&wwn).await })
            })
            .collect();

        let futs = roster
            .keys()
            .zip(handles)
            .map(|(wwn, handle)| join_detail(wwn, handle, deadline));
        join_all(futs).await
    }
}

async fn join_detail(
    wwn: &DeviceWwn,
    handle: JoinHandle<DetailResult>,
    deadline: Option<(Instant, Duration)>,
) -> DetailResult {
    let joined = match deadline {
        None => handle.await,
        Some((at, budget)) => {
            let abort = handle.abort_handle();
            match tokio::time::timeout_at(at, handle).await {
                Ok(joined) => joined,
                Err(_) => {
                    abort.abort();
                    return Err(scrutiny_api::Error::Timeout {
                        url: format!("device details (WWN: {wwn})"),
                        timeout_secs: budget.as_secs(),
                    });
                }
            }
        }
    };

    joined.unwrap_or_else(|e| {
        error!(wwn = %wwn, error = %e, "detail task failed");
        Err(scrutiny_api::Error::Unexpected {
            context: format!("device details (WWN: {wwn})"),
            message: e.to_string(),
        })
    })
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|s| (*s).to_owned())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "cycle task panicked".to_owned())
}

/// Clears the in-flight slot and returns to `Idle` when the cycle task
/// ends, including by panic.
struct InFlightGuard<'a, S>(&'a CoordinatorInner<S>);

impl<S> Drop for InFlightGuard<'_, S> {
    fn drop(&mut self) {
        self.0
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        self.0.state.send_replace(CoordinatorState::Idle);
    }
}

// ── Helpers ──────────────────────────────────────────────────────

fn build_transport(config: &CoordinatorConfig) -> TransportConfig {
    let tls = match &config.tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    };
    TransportConfig::default()
        .with_timeout(config.timeout)
        .with_tls(tls)
}

/// Periodically refresh from the source until cancelled.
async fn refresh_task<S: DeviceSource>(
    coordinator: Coordinator<S>,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                match coordinator.refresh().await {
                    Ok(report) => {
                        for wwn in &report.added {
                            info!(wwn = %wwn, "new disk discovered");
                        }
                    }
                    Err(e) if e.is_auth() => {
                        error!(error = %e, "periodic refresh rejected by Scrutiny");
                    }
                    Err(e) => warn!(error = %e, "periodic refresh failed"),
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn transport_follows_config() {
        let mut config = CoordinatorConfig::new(url::Url::parse("http://nas.local:8080").unwrap());
        config.timeout = Duration::from_secs(3);
        config.tls = TlsVerification::SystemDefaults;

        let transport = build_transport(&config);
        assert_eq!(transport.timeout, Duration::from_secs(3));
        assert!(matches!(transport.tls, TlsMode::System));
    }

    #[test]
    fn state_renders_snake_case() {
        assert_eq!(CoordinatorState::Refreshing.to_string(), "refreshing");
    }
}
