//! Config subcommand handlers.

use scrutiny_config::Config;

use crate::cli::{ConfigArgs, ConfigCommand, ConfigInitArgs, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

use super::{check, util};

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init(init_args) => init(&init_args, global).await,

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = config::resolve(global)?;
            let out = output::render_single(
                global.output,
                &cfg,
                |c| toml::to_string_pretty(c).unwrap_or_else(|e| format!("{c:#?}\n# {e}")),
                |c| c.base_url().map_or_else(|_| c.host.clone(), |u| u.to_string()),
            )?;
            output::print_output(out.trim_end(), global.quiet);
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            println!("{}", config::config_path(global).display());
            Ok(())
        }
    }
}

// ── Init ────────────────────────────────────────────────────────────

/// Write a config built from defaults plus the global flags.
///
/// Scrutiny is asked for its summary first, so a file is only written
/// for an instance that answers.
async fn init(args: &ConfigInitArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let path = config::config_path(global);
    if path.exists() && !args.force {
        return Err(CliError::ConfigExists {
            path: path.display().to_string(),
        });
    }

    let mut cfg = Config::default();
    config::apply_overrides(&mut cfg, global);
    if let Some(minutes) = args.interval {
        cfg.scan_interval_minutes = minutes;
    }
    cfg.validate()?;

    if args.skip_check {
        tracing::info!("skipping connection check");
    } else {
        let coordinator = util::build_coordinator(cfg.to_coordinator_config()?)?;
        let result = check::verify_connection(&coordinator).await?;
        if !global.quiet {
            eprintln!("✓ Scrutiny at {} answered with {} disk(s)", result.url, result.devices);
        }
    }

    scrutiny_config::save_config_to(&cfg, &path)?;
    if !global.quiet {
        eprintln!("✓ Configuration written to {}", path.display());
    }
    Ok(())
}
