// ── Snapshot ──
//
// Immutable view of the aggregated device map plus the outcome of the
// most recent cycle. A new `Snapshot` is built for every publication;
// nothing in here is ever mutated after it becomes visible.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;

use super::{AggregatedRecord, DeviceWwn};
use crate::error::RefreshError;

pub type DeviceMap = IndexMap<DeviceWwn, AggregatedRecord>;

/// Point-in-time view handed to readers.
///
/// Devices iterate in the order the summary roster listed them. A failed
/// cycle produces a new `Snapshot` that shares the previous device map
/// (same `Arc`) and only updates the outcome fields.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    devices: Arc<DeviceMap>,
    /// Bumped on every new device map; failed cycles leave it alone.
    pub version: u64,
    pub last_cycle_succeeded: bool,
    pub last_error: Option<RefreshError>,
    /// When the current device map was published.
    pub refreshed_at: Option<DateTime<Utc>>,
    /// When the most recent cycle (of any outcome) ended.
    pub attempted_at: Option<DateTime<Utc>>,
    /// Devices whose detail fetch failed in the cycle that built `devices`.
    pub detail_failures: Vec<DeviceWwn>,
}

impl Snapshot {
    /// The empty snapshot that exists before the first refresh.
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn published(
        previous: &Self,
        devices: DeviceMap,
        detail_failures: Vec<DeviceWwn>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            devices: Arc::new(devices),
            version: previous.version + 1,
            last_cycle_succeeded: true,
            last_error: None,
            refreshed_at: Some(now),
            attempted_at: Some(now),
            detail_failures,
        }
    }

    pub(crate) fn failed(previous: &Self, error: RefreshError, now: DateTime<Utc>) -> Self {
        Self {
            devices: Arc::clone(&previous.devices),
            version: previous.version,
            last_cycle_succeeded: false,
            last_error: Some(error),
            refreshed_at: previous.refreshed_at,
            attempted_at: Some(now),
            detail_failures: previous.detail_failures.clone(),
        }
    }

    pub fn devices(&self) -> &DeviceMap {
        &self.devices
    }

    /// Shared handle to the device map; cheap to clone and keep.
    pub fn devices_arc(&self) -> Arc<DeviceMap> {
        Arc::clone(&self.devices)
    }

    pub fn get(&self, wwn: &str) -> Option<&AggregatedRecord> {
        self.devices.get(wwn)
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DeviceWwn, &AggregatedRecord)> {
        self.devices.iter()
    }

    /// Did the most recent cycle succeed?
    pub fn is_fresh(&self) -> bool {
        self.last_cycle_succeeded
    }

    /// Has any device map been published yet? Separates "never refreshed"
    /// from "refreshed, zero devices".
    pub fn has_refreshed(&self) -> bool {
        self.version > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DetailSection, SummaryRecord};

    fn device(wwn: &str) -> (DeviceWwn, AggregatedRecord) {
        let wwn = DeviceWwn::new(wwn);
        let record = AggregatedRecord {
            wwn: wwn.clone(),
            summary: SummaryRecord::default(),
            detail: DetailSection::placeholder(),
        };
        (wwn, record)
    }

    #[test]
    fn empty_snapshot_has_not_refreshed() {
        let snap = Snapshot::empty();
        assert!(snap.is_empty());
        assert!(!snap.is_fresh());
        assert!(!snap.has_refreshed());
        assert!(snap.last_error.is_none());
    }

    #[test]
    fn zero_device_publication_is_distinguishable() {
        let snap = Snapshot::published(&Snapshot::empty(), DeviceMap::new(), Vec::new(), Utc::now());
        assert!(snap.is_empty());
        assert!(snap.is_fresh());
        assert!(snap.has_refreshed());
        assert_eq!(snap.version, 1);
    }

    #[test]
    fn failure_keeps_previous_devices() {
        let devices: DeviceMap = [device("wwn1"), device("wwn2")].into_iter().collect();
        let good = Snapshot::published(&Snapshot::empty(), devices, Vec::new(), Utc::now());
        let err = RefreshError::Aborted {
            reason: "cycle task panicked".into(),
        };

        let bad = Snapshot::failed(&good, err, Utc::now());

        assert!(Arc::ptr_eq(&good.devices_arc(), &bad.devices_arc()));
        assert_eq!(bad.version, good.version);
        assert_eq!(bad.refreshed_at, good.refreshed_at);
        assert!(!bad.is_fresh());
        assert!(bad.last_error.is_some());
        assert!(bad.get("wwn2").is_some());
    }
}
