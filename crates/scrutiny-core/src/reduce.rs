// ── Result reduction ──
//
// Folds one device's summary record and the outcome of its detail call
// into an `AggregatedRecord`. No I/O; the only side effect is logging.

use scrutiny_api::DetailPayload;
use tracing::{debug, warn};

use crate::model::{AggregatedRecord, DetailSection, DeviceWwn, SummaryRecord};

/// Outcome of one device's detail call, as handed to [`reduce`].
pub type DetailResult = Result<DetailPayload, scrutiny_api::Error>;

/// Merge a summary record with its detail outcome.
///
/// A failed detail call yields the empty [`DetailSection`] placeholder and
/// a warning; it never fails the record.
pub fn reduce(wwn: &DeviceWwn, summary: SummaryRecord, detail: DetailResult) -> AggregatedRecord {
    let detail = match detail {
        Ok(payload) => detail_section(wwn, payload),
        Err(e) => {
            warn!(
                wwn = %wwn,
                kind = %e.kind(),
                error = %e,
                "failed to fetch details for disk; detail fields left empty"
            );
            DetailSection::placeholder()
        }
    };

    AggregatedRecord {
        wwn: wwn.clone(),
        summary,
        detail,
    }
}

/// Extract the detail section from a payload.
///
/// Tolerates partial payloads: a missing `data` object leaves device and
/// SMART empty but still keeps the metadata, and a missing `metadata`
/// object leaves metadata empty.
pub fn detail_section(wwn: &DeviceWwn, payload: DetailPayload) -> DetailSection {
    let DetailPayload { data, metadata, .. } = payload;

    let (device, smart_results) = match data {
        Some(data) => (data.device, data.smart_results),
        None => {
            debug!(wwn = %wwn, "detail payload has no data section");
            (None, None)
        }
    };

    let latest_smart = smart_results.and_then(|results| results.into_iter().next());
    if latest_smart.is_none() {
        debug!(wwn = %wwn, "no SMART results in detail payload");
    }

    DetailSection {
        device,
        latest_smart,
        metadata: metadata.unwrap_or_default(),
    }
}
