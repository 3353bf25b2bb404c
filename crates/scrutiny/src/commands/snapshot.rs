//! Snapshot command: one refresh cycle, every disk.

use tabled::Tabled;

use scrutiny_core::{AggregatedRecord, Coordinator};

use crate::cli::{GlobalOpts, SnapshotArgs};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
pub(crate) struct DiskRow {
    #[tabled(rename = "WWN")]
    wwn: String,
    #[tabled(rename = "Device")]
    device: String,
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "Serial")]
    serial: String,
    #[tabled(rename = "Capacity")]
    capacity: String,
    #[tabled(rename = "Temp")]
    temp: String,
    #[tabled(rename = "Power-On Hours")]
    hours: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Detail")]
    detail: String,
}

impl DiskRow {
    pub(crate) fn new(r: &AggregatedRecord) -> Self {
        let device = r.device();
        Self {
            wwn: r.wwn.to_string(),
            device: util::or_dash(device.device_name.as_deref()),
            model: util::or_dash(device.model_name.as_deref()),
            serial: util::or_dash(device.serial_number.as_deref()),
            capacity: util::or_dash(device.capacity),
            temp: r
                .temperature()
                .map_or_else(|| "-".into(), |t| format!("{t}°C")),
            hours: util::or_dash(r.power_on_hours()),
            status: r.health().to_string(),
            detail: if r.has_detail() { "ok" } else { "missing" }.into(),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    coordinator: &Coordinator,
    args: &SnapshotArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let report = util::refresh_once(coordinator).await?;
    let records: Vec<AggregatedRecord> =
        report.snapshot.iter().map(|(_, r)| r.clone()).collect();

    let out = output::render_list(
        global.output,
        &records,
        DiskRow::new,
        |r| r.wwn.to_string(),
    )?;
    output::print_output(&out, global.quiet);

    if !report.detail_failures.is_empty() {
        if args.strict {
            return Err(CliError::PartialDetails {
                count: report.detail_failures.len(),
                wwns: util::join_wwns(&report.detail_failures),
            });
        }
        tracing::warn!(
            count = report.detail_failures.len(),
            wwns = %util::join_wwns(&report.detail_failures),
            "detail data missing for some disks"
        );
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use scrutiny_core::{DetailSection, DeviceWwn, SummaryRecord};
    use serde_json::json;

    #[test]
    fn row_falls_back_to_summary_fields() {
        let summary: SummaryRecord = serde_json::from_value(json!({
            "device": {
                "device_name": "/dev/sdb",
                "model_name": "DiskModelB",
                "capacity": 4_000_787_030_016_u64,
                "device_status": 2
            },
            "smart": { "temp": 35, "power_on_hours": 2000 }
        }))
        .unwrap();
        let record = AggregatedRecord {
            wwn: DeviceWwn::new("wwn2"),
            summary,
            detail: DetailSection::placeholder(),
        };

        let row = DiskRow::new(&record);

        assert_eq!(row.device, "/dev/sdb");
        assert_eq!(row.serial, "-");
        assert_eq!(row.capacity, "4000787030016");
        assert_eq!(row.temp, "35°C");
        assert_eq!(row.status, "failed_scrutiny");
        assert_eq!(row.detail, "missing");
    }
}
