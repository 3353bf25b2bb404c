//! Device command: one refresh cycle, one disk in detail.

use tabled::Tabled;

use scrutiny_core::{AggregatedRecord, Coordinator};

use crate::cli::{DeviceArgs, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct AttributeRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Worst")]
    worst: String,
    #[tabled(rename = "Thresh")]
    thresh: String,
    #[tabled(rename = "Raw")]
    raw: String,
    #[tabled(rename = "Critical")]
    critical: String,
}

fn detail(r: &AggregatedRecord) -> String {
    let device = r.device();
    let mut lines = vec![
        format!("WWN:            {}", r.wwn),
        format!("Device:         {}", util::or_dash(device.device_name.as_deref())),
        format!("Manufacturer:   {}", util::or_dash(device.manufacturer.as_deref())),
        format!("Model:          {}", util::or_dash(device.model_name.as_deref())),
        format!("Serial:         {}", util::or_dash(device.serial_number.as_deref())),
        format!("Firmware:       {}", util::or_dash(device.firmware.as_deref())),
        format!("Capacity:       {}", util::or_dash(device.capacity)),
        format!("Protocol:       {}", util::or_dash(device.device_protocol.as_deref())),
        format!("Status:         {}", r.health()),
        format!(
            "Temperature:    {}",
            r.temperature().map_or_else(|| "-".into(), |t| format!("{t}°C"))
        ),
        format!("Power-On Hours: {}", util::or_dash(r.power_on_hours())),
    ];

    let Some(smart) = r.detail.latest_smart.as_ref() else {
        lines.push(String::new());
        lines.push("No detail data for this disk in the last cycle.".into());
        return lines.join("\n");
    };

    lines.push(format!("Last Collected: {}", util::or_dash(smart.date.as_deref())));
    if smart.attrs.is_empty() {
        return lines.join("\n");
    }

    let rows: Vec<AttributeRow> = smart
        .attrs
        .iter()
        .map(|(id, attr)| {
            let meta = r.detail.attribute_metadata(id);
            AttributeRow {
                id: id.clone(),
                name: util::or_dash(meta.and_then(|m| m.display_name.as_deref())),
                value: util::or_dash(attr.value),
                worst: util::or_dash(attr.worst),
                thresh: util::or_dash(attr.thresh),
                raw: attr
                    .raw_string
                    .clone()
                    .or_else(|| attr.raw_value.map(|v| v.to_string()))
                    .unwrap_or_else(|| "-".into()),
                critical: if meta.and_then(|m| m.critical).unwrap_or(false) {
                    "yes".into()
                } else {
                    String::new()
                },
            }
        })
        .collect();
    lines.push(String::new());
    lines.push(output::render_table(&rows));
    lines.join("\n")
}

pub async fn handle(
    coordinator: &Coordinator,
    args: &DeviceArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let report = util::refresh_once(coordinator).await?;
    let record = report
        .snapshot
        .get(&args.wwn)
        .ok_or_else(|| CliError::DeviceNotFound {
            wwn: args.wwn.clone(),
        })?;

    if !record.has_detail() && global.output != OutputFormat::Plain {
        tracing::warn!(wwn = %record.wwn, "detail call failed; showing summary fields only");
    }

    let out = output::render_single(global.output, record, detail, |r| r.wwn.to_string())?;
    output::print_output(&out, global.quiet);
    Ok(())
}
