//! Config resolution for the CLI: file + environment from `scrutiny-config`,
//! then command-line overrides on top.
//!
//! Core never sees these types -- it receives a pre-built `CoordinatorConfig`.

use std::path::PathBuf;

use scrutiny_config::Config;
use scrutiny_core::CoordinatorConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// The config file this invocation reads and writes.
pub fn config_path(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(scrutiny_config::config_path)
}

/// Load the file (defaults if absent) and apply global flag overrides.
pub fn resolve(global: &GlobalOpts) -> Result<Config, CliError> {
    let mut cfg = scrutiny_config::load_config_from(&config_path(global))?;
    apply_overrides(&mut cfg, global);
    cfg.validate()?;
    Ok(cfg)
}

/// Resolve and translate into the coordinator's runtime configuration.
pub fn coordinator_config(global: &GlobalOpts) -> Result<(Config, CoordinatorConfig), CliError> {
    let cfg = resolve(global)?;
    let runtime = cfg.to_coordinator_config()?;
    Ok((cfg, runtime))
}

pub fn apply_overrides(cfg: &mut Config, global: &GlobalOpts) {
    if let Some(host) = &global.host {
        cfg.host.clone_from(host);
    }
    if let Some(port) = global.port {
        cfg.port = port;
    }
    if global.https {
        cfg.scheme = "https".into();
    }
    if let Some(timeout) = global.timeout {
        cfg.timeout_secs = timeout;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["scrutiny"];
        argv.extend_from_slice(args);
        argv.push("check");
        Cli::try_parse_from(argv).unwrap().global
    }

    #[test]
    fn flags_override_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "host = \"nas\"\nport = 8081\ntimeout_secs = 20\n").unwrap();
        let path_str = path.to_string_lossy().into_owned();

        let opts = global(&["--config", &path_str, "--port", "9090", "--https"]);
        let (cfg, runtime) = coordinator_config(&opts).unwrap();

        assert_eq!(cfg.host, "nas");
        assert_eq!(cfg.timeout_secs, 20);
        assert_eq!(runtime.url.as_str(), "https://nas:9090/");
    }

    #[test]
    fn invalid_override_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let path_str = path.to_string_lossy().into_owned();

        let opts = global(&["--config", &path_str, "--timeout", "0"]);

        assert!(matches!(
            resolve(&opts).unwrap_err(),
            CliError::Validation { .. }
        ));
    }
}
