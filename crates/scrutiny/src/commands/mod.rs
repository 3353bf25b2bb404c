//! Command dispatch: bridges CLI args -> coordinator cycles -> output formatting.

pub mod check;
pub mod config_cmd;
pub mod device;
pub mod poll;
pub mod snapshot;
pub mod util;

use scrutiny_config::Config;
use scrutiny_core::CoordinatorConfig;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a Scrutiny-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    cfg: &Config,
    runtime: CoordinatorConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Poll(args) => poll::handle(cfg, runtime, &args, global).await,
        Command::Snapshot(args) => {
            let coordinator = util::build_coordinator(runtime)?;
            snapshot::handle(&coordinator, &args, global).await
        }
        Command::Device(args) => {
            let coordinator = util::build_coordinator(runtime)?;
            device::handle(&coordinator, &args, global).await
        }
        Command::Check => {
            let coordinator = util::build_coordinator(runtime)?;
            check::handle(&coordinator, global).await
        }
        // Config is handled before dispatch
        Command::Config(args) => config_cmd::handle(args, global).await,
    }
}
