// Scrutiny wire types
//
// Field names follow the Scrutiny web API. Every field is optional and
// every struct keeps unknown keys in `extra`. Known fields decode through
// `lenient::or_default`: a value of the wrong shape reads as absent and
// leaves the rest of the record intact.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::lenient;

/// Attribute ids are numeric for ATA (`"5"`, `"194"`) and symbolic for
/// NVMe / SCSI (`"critical_warning"`), so they stay strings on the wire.
pub type AttributeId = String;

// ── Device ──────────────────────────────────────────────────────────

/// Device attributes, as found in both the summary and the detail call.
///
/// The detail call usually carries a superset of the summary fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceInfo {
    #[serde(deserialize_with = "lenient::or_default")]
    pub wwn: Option<String>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub device_name: Option<String>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub manufacturer: Option<String>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub model_name: Option<String>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub serial_number: Option<String>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub firmware: Option<String>,
    /// Capacity in bytes.
    #[serde(deserialize_with = "lenient::or_default")]
    pub capacity: Option<u64>,
    /// Bit flags: 1 = failed by SMART, 2 = failed by Scrutiny thresholds.
    #[serde(deserialize_with = "lenient::or_default")]
    pub device_status: Option<u8>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub device_protocol: Option<String>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub device_type: Option<String>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub host_id: Option<String>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub rotation_speed: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── Summary ─────────────────────────────────────────────────────────

/// Lightweight SMART fields returned by the summary call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarySmart {
    #[serde(deserialize_with = "lenient::or_default")]
    pub collector_date: Option<String>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub temp: Option<i64>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub power_on_hours: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One entry of `data.summary`, keyed by WWN in the response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryEntry {
    #[serde(deserialize_with = "lenient::or_default")]
    pub device: DeviceInfo,
    #[serde(deserialize_with = "lenient::or_default")]
    pub smart: SummarySmart,
}

// ── Details ─────────────────────────────────────────────────────────

/// One SMART attribute reading inside a smart result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmartAttribute {
    /// Numeric for ATA, a string for NVMe/SCSI.
    #[serde(deserialize_with = "lenient::or_default")]
    pub attribute_id: Option<Value>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub value: Option<i64>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub thresh: Option<i64>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub worst: Option<i64>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub raw_value: Option<i64>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub raw_string: Option<String>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub when_failed: Option<String>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub transformed_value: Option<i64>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub status: Option<u8>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub status_reason: Option<String>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub failure_rate: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A point-in-time metric snapshot (`data.smart_results[n]`).
///
/// Scrutiny returns these newest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmartResult {
    #[serde(deserialize_with = "lenient::or_default")]
    pub date: Option<String>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub device_wwn: Option<String>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub device_protocol: Option<String>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub temp: Option<i64>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub power_on_hours: Option<u64>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub power_cycle_count: Option<u64>,
    /// Overall test status, same bit flags as `DeviceInfo::device_status`.
    #[serde(rename = "Status", deserialize_with = "lenient::or_default")]
    pub status: Option<u8>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub attrs: IndexMap<AttributeId, SmartAttribute>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Describes one attribute id: display name, criticality, ideal direction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributeMetadata {
    #[serde(deserialize_with = "lenient::or_default")]
    pub display_name: Option<String>,
    /// `"low"` or `"high"`, when a direction is meaningful.
    #[serde(deserialize_with = "lenient::or_default")]
    pub ideal: Option<String>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub critical: Option<bool>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub display_type: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The `data` section of a detail response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetailData {
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub device: Option<DeviceInfo>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub smart_results: Option<Vec<SmartResult>>,
}

/// Full `GET device/{wwn}/details` payload.
///
/// `data` and `metadata` are optional here so a partially populated
/// payload can still be represented; [`ScrutinyClient::get_device_details`]
/// rejects payloads missing either one.
///
/// [`ScrutinyClient::get_device_details`]: crate::ScrutinyClient::get_device_details
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetailPayload {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Option<DetailData>,
    #[serde(default)]
    pub metadata: Option<IndexMap<AttributeId, AttributeMetadata>>,
}
