// ── Per-device records ──
//
// A device is described twice per cycle: once by the cheap summary roster
// and once by the detail call. `AggregatedRecord` holds both halves; the
// detail half is an empty `DetailSection` when the detail call failed.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strum::{Display, IntoStaticStr};

use scrutiny_api::{
    AttributeId, AttributeMetadata, DeviceInfo, SmartAttribute, SmartResult, SummaryEntry,
    SummarySmart,
};

use super::DeviceWwn;

// ── HealthStatus ────────────────────────────────────────────────────

/// Overall health as Scrutiny reports it through its status bit flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Passed,
    FailedSmart,
    FailedScrutiny,
    FailedBoth,
    Unknown,
}

impl HealthStatus {
    /// Decode `device_status` / `Status`: bit 0 is a SMART failure, bit 1 a
    /// Scrutiny threshold failure.
    pub fn from_status_bits(bits: Option<u8>) -> Self {
        match bits {
            Some(0) => Self::Passed,
            Some(1) => Self::FailedSmart,
            Some(2) => Self::FailedScrutiny,
            Some(3) => Self::FailedBoth,
            _ => Self::Unknown,
        }
    }

    pub fn is_failed(self) -> bool {
        matches!(
            self,
            Self::FailedSmart | Self::FailedScrutiny | Self::FailedBoth
        )
    }
}

// ── SummaryRecord ───────────────────────────────────────────────────

/// Summary-side view of a device, as listed in the roster.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub device: DeviceInfo,
    pub smart: SummarySmart,
}

impl From<SummaryEntry> for SummaryRecord {
    fn from(entry: SummaryEntry) -> Self {
        Self {
            device: entry.device,
            smart: entry.smart,
        }
    }
}

// ── DetailSection ───────────────────────────────────────────────────

/// Detail-side view of a device.
///
/// `DetailSection::default()` is the placeholder used when the detail call
/// failed: no device, no SMART snapshot, no metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetailSection {
    pub device: Option<DeviceInfo>,
    /// Newest entry of `smart_results`.
    pub latest_smart: Option<SmartResult>,
    pub metadata: IndexMap<AttributeId, AttributeMetadata>,
}

impl DetailSection {
    pub fn placeholder() -> Self {
        Self::default()
    }

    /// True for the placeholder (and for a payload that carried nothing).
    pub fn is_empty(&self) -> bool {
        self.device.is_none() && self.latest_smart.is_none() && self.metadata.is_empty()
    }

    pub fn attribute(&self, id: &str) -> Option<&SmartAttribute> {
        self.latest_smart.as_ref()?.attrs.get(id)
    }

    pub fn attribute_metadata(&self, id: &str) -> Option<&AttributeMetadata> {
        self.metadata.get(id)
    }
}

// ── AggregatedRecord ────────────────────────────────────────────────

/// One device as exposed downstream: summary plus detail (or placeholder).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedRecord {
    pub wwn: DeviceWwn,
    pub summary: SummaryRecord,
    pub detail: DetailSection,
}

impl AggregatedRecord {
    pub fn has_detail(&self) -> bool {
        !self.detail.is_empty()
    }

    /// Detail-side device info when present, the summary's otherwise.
    pub fn device(&self) -> &DeviceInfo {
        self.detail.device.as_ref().unwrap_or(&self.summary.device)
    }

    /// Latest SMART temperature, falling back to the summary reading.
    pub fn temperature(&self) -> Option<i64> {
        self.detail
            .latest_smart
            .as_ref()
            .and_then(|s| s.temp)
            .or(self.summary.smart.temp)
    }

    pub fn power_on_hours(&self) -> Option<u64> {
        self.detail
            .latest_smart
            .as_ref()
            .and_then(|s| s.power_on_hours)
            .or(self.summary.smart.power_on_hours)
    }

    pub fn health(&self) -> HealthStatus {
        HealthStatus::from_status_bits(self.device().device_status)
    }

    /// Attributes of the latest SMART snapshot whose metadata flags them
    /// as critical, in snapshot order.
    pub fn critical_attributes(
        &self,
    ) -> impl Iterator<Item = (&AttributeId, &SmartAttribute, &AttributeMetadata)> {
        self.detail
            .latest_smart
            .iter()
            .flat_map(|smart| smart.attrs.iter())
            .filter_map(move |(id, attr)| {
                let meta = self.detail.metadata.get(id)?;
                meta.critical.unwrap_or(false).then_some((id, attr, meta))
            })
    }
}
