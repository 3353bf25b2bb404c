//! Check command: one summary call, no detail fan-out.

use serde::Serialize;

use scrutiny_core::Coordinator;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Debug, Serialize)]
pub(crate) struct CheckResult {
    pub url: String,
    pub devices: usize,
    pub wwns: Vec<String>,
}

fn detail(c: &CheckResult) -> String {
    format!(
        "Scrutiny at {} is reachable; {} disk(s) listed.",
        c.url, c.devices
    )
}

/// Ask Scrutiny for its roster and count the entries.
pub(crate) async fn verify_connection(coordinator: &Coordinator) -> Result<CheckResult, CliError> {
    let client = coordinator.source();
    let summary = client.get_summary().await?;
    Ok(CheckResult {
        url: client.base_url().to_string(),
        devices: summary.len(),
        wwns: summary.into_keys().collect(),
    })
}

pub async fn handle(coordinator: &Coordinator, global: &GlobalOpts) -> Result<(), CliError> {
    let result = verify_connection(coordinator).await?;
    let out = output::render_single(global.output, &result, detail, |c| c.devices.to_string())?;
    output::print_output(&out, global.quiet);
    Ok(())
}
