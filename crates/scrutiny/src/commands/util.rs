//! Shared helpers for command handlers.

use std::fmt::Display;

use scrutiny_core::{Coordinator, CoordinatorConfig, CycleReport};

use crate::error::CliError;

/// Build a coordinator backed by the Scrutiny HTTP API.
pub fn build_coordinator(runtime: CoordinatorConfig) -> Result<Coordinator, CliError> {
    Ok(Coordinator::from_config(runtime)?)
}

/// Run one cycle and fail the command if it did not publish.
pub async fn refresh_once(coordinator: &Coordinator) -> Result<CycleReport, CliError> {
    Ok(coordinator.refresh().await?)
}

/// Render an optional value, `-` when absent.
pub fn or_dash<T: Display>(value: Option<T>) -> String {
    value.map_or_else(|| "-".into(), |v| v.to_string())
}

/// Join WWNs for a one-line message.
pub fn join_wwns<'a>(wwns: impl IntoIterator<Item = &'a scrutiny_core::DeviceWwn>) -> String {
    wwns.into_iter()
        .map(scrutiny_core::DeviceWwn::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
