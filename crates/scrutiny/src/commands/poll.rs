//! Poll command: keep the coordinator running and report every cycle.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use scrutiny_config::Config;
use scrutiny_core::{CoordinatorConfig, Snapshot};

use crate::cli::{GlobalOpts, OutputFormat, PollArgs};
use crate::error::CliError;
use crate::output;

use super::util;

/// One line per cycle outcome.
#[derive(Debug, Serialize)]
pub(crate) struct PollStatus {
    pub version: u64,
    pub fresh: bool,
    pub devices: usize,
    pub failed_disks: usize,
    pub detail_failures: Vec<String>,
    pub refreshed_at: Option<DateTime<Utc>>,
    pub attempted_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

impl PollStatus {
    pub(crate) fn new(snap: &Snapshot) -> Self {
        Self {
            version: snap.version,
            fresh: snap.is_fresh(),
            devices: snap.len(),
            failed_disks: snap.iter().filter(|(_, r)| r.health().is_failed()).count(),
            detail_failures: snap.detail_failures.iter().map(ToString::to_string).collect(),
            refreshed_at: snap.refreshed_at,
            attempted_at: snap.attempted_at,
            error: snap.last_error.as_ref().map(ToString::to_string),
        }
    }
}

fn status_line(s: &PollStatus) -> String {
    let at = s
        .attempted_at
        .map_or_else(|| "-".into(), |t| t.format("%Y-%m-%d %H:%M:%S").to_string());
    match &s.error {
        Some(err) => format!(
            "{at}  refresh failed; keeping {} disk(s) from v{}: {err}",
            s.devices, s.version
        ),
        None => format!(
            "{at}  v{}  {} disk(s), {} failing, {} without detail",
            s.version,
            s.devices,
            s.failed_disks,
            s.detail_failures.len()
        ),
    }
}

fn print_status(snap: &Snapshot, global: &GlobalOpts) -> Result<(), CliError> {
    let status = PollStatus::new(snap);
    // A long-running stream wants one record per line.
    let format = match global.output {
        OutputFormat::Json => OutputFormat::JsonCompact,
        other => other,
    };
    let out = output::render_single(format, &status, status_line, |s| s.version.to_string())?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn handle(
    cfg: &Config,
    mut runtime: CoordinatorConfig,
    args: &PollArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if let Some(minutes) = args.interval {
        runtime.refresh_interval = Duration::from_secs(minutes.saturating_mul(60));
    }
    let coordinator = util::build_coordinator(runtime)?;
    let mut updates = coordinator.subscribe();

    if cfg.first_refresh && !args.no_first_refresh {
        let report = coordinator.first_refresh().await?;
        updates.mark_unchanged();
        print_status(&report.snapshot, global)?;
    }

    coordinator.start().await;

    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                signal?;
                info!("interrupt received, stopping");
                break;
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snap = updates.borrow_and_update().clone();
                print_status(&snap, global)?;
            }
        }
    }

    coordinator.shutdown().await;
    Ok(())
}
