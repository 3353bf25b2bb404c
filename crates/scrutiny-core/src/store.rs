// ── Snapshot store ──
//
// Single atomic cell holding the current `Snapshot`, plus a `watch`
// channel so consumers can await the next publication. Only the
// coordinator's single-flight cycle writes here; readers never block it.

use std::sync::Arc;

use arc_swap::ArcSwap;
use chrono::Utc;
use tokio::sync::watch;

use crate::error::RefreshError;
use crate::model::{DeviceMap, DeviceWwn, Snapshot};

/// What changed between two consecutive device maps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterDelta {
    /// Identities present now but not in the previous map, in roster order.
    pub added: Vec<DeviceWwn>,
    /// Identities present before but gone now, in their previous order.
    pub removed: Vec<DeviceWwn>,
}

impl RosterDelta {
    fn between(previous: &DeviceMap, next: &DeviceMap) -> Self {
        Self {
            added: next
                .keys()
                .filter(|wwn| !previous.contains_key(*wwn))
                .cloned()
                .collect(),
            removed: previous
                .keys()
                .filter(|wwn| !next.contains_key(*wwn))
                .cloned()
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

pub struct SnapshotStore {
    current: ArcSwap<Snapshot>,
    tx: watch::Sender<Arc<Snapshot>>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        let initial = Arc::new(Snapshot::empty());
        let (tx, _) = watch::channel(Arc::clone(&initial));
        Self {
            current: ArcSwap::new(initial),
            tx,
        }
    }

    /// Current snapshot. Lock-free.
    pub fn load(&self) -> Arc<Snapshot> {
        self.current.load_full()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.tx.subscribe()
    }

    /// Replace the device map with `devices` and mark the cycle successful.
    pub(crate) fn publish(
        &self,
        devices: DeviceMap,
        detail_failures: Vec<DeviceWwn>,
    ) -> (Arc<Snapshot>, RosterDelta) {
        let previous = self.current.load();
        let delta = RosterDelta::between(previous.devices(), &devices);
        let next = Arc::new(Snapshot::published(
            &previous,
            devices,
            detail_failures,
            Utc::now(),
        ));
        self.swap(Arc::clone(&next));
        (next, delta)
    }

    /// Record a failed cycle, keeping the current device map.
    pub(crate) fn record_failure(&self, error: RefreshError) -> Arc<Snapshot> {
        let previous = self.current.load();
        let next = Arc::new(Snapshot::failed(&previous, error, Utc::now()));
        self.swap(Arc::clone(&next));
        next
    }

    fn swap(&self, next: Arc<Snapshot>) {
        self.current.store(Arc::clone(&next));
        self.tx.send_replace(next);
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}
