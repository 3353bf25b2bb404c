//! Configuration for the Scrutiny poller.
//!
//! A flat TOML file at the platform config path, merged over built-in
//! defaults and `SCRUTINY_`-prefixed environment variables, and translated
//! into a `scrutiny_core::CoordinatorConfig`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use scrutiny_core::{CoordinatorConfig, TlsVerification};

pub const ENV_PREFIX: &str = "SCRUTINY_";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_SCAN_INTERVAL_MINUTES: u64 = 60;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

// ── Config ──────────────────────────────────────────────────────────

/// Everything needed to poll one Scrutiny instance.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Host name or IP of the Scrutiny web instance.
    pub host: String,
    pub port: u16,
    /// `http` or `https`.
    pub scheme: String,
    /// Optional path prefix when Scrutiny sits behind a reverse proxy.
    pub base_path: Option<String>,
    /// Minutes between scheduled refreshes. At least 1.
    pub scan_interval_minutes: u64,
    /// Per-request timeout.
    pub timeout_secs: u64,
    /// Overall bound on the detail fan-out of one cycle. Unset = no bound.
    pub cycle_deadline_secs: Option<u64>,
    /// Refresh once at startup before the first interval elapses.
    pub first_refresh: bool,
    /// Verify TLS certificates against the system store.
    pub verify_tls: bool,
    /// Custom CA certificate (implies verification).
    pub ca_cert: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: DEFAULT_PORT,
            scheme: "http".into(),
            base_path: None,
            scan_interval_minutes: DEFAULT_SCAN_INTERVAL_MINUTES,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            cycle_deadline_secs: None,
            first_refresh: true,
            verify_tls: false,
            ca_cert: None,
        }
    }
}

impl Config {
    /// Reject values the coordinator cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(invalid("host", "must not be empty"));
        }
        if self.port == 0 {
            return Err(invalid("port", "must be between 1 and 65535"));
        }
        if !matches!(self.scheme.as_str(), "http" | "https") {
            return Err(invalid(
                "scheme",
                format!("expected 'http' or 'https', got '{}'", self.scheme),
            ));
        }
        if self.scan_interval_minutes < 1 {
            return Err(invalid("scan_interval_minutes", "must be at least 1 minute"));
        }
        if self.timeout_secs < 1 {
            return Err(invalid("timeout_secs", "must be at least 1 second"));
        }
        if self.cycle_deadline_secs == Some(0) {
            return Err(invalid("cycle_deadline_secs", "must be at least 1 second"));
        }
        self.base_url().map(|_| ())
    }

    /// `{scheme}://{host}:{port}/{base_path}/`
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        let prefix = self
            .base_path
            .as_deref()
            .map(|p| p.trim_matches('/'))
            .filter(|p| !p.is_empty())
            .map(|p| format!("{p}/"))
            .unwrap_or_default();
        let raw = format!("{}://{}:{}/{prefix}", self.scheme, self.host, self.port);
        Url::parse(&raw).map_err(|e| invalid("host", format!("cannot build URL '{raw}': {e}")))
    }

    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval_minutes.saturating_mul(60))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn tls(&self) -> TlsVerification {
        match (&self.ca_cert, self.verify_tls) {
            (Some(path), _) => TlsVerification::CustomCa(path.clone()),
            (None, true) => TlsVerification::SystemDefaults,
            (None, false) => TlsVerification::DangerAcceptInvalid,
        }
    }

    /// Translate into the runtime configuration the coordinator takes.
    pub fn to_coordinator_config(&self) -> Result<CoordinatorConfig, ConfigError> {
        self.validate()?;
        let mut config = CoordinatorConfig::new(self.base_url()?);
        config.tls = self.tls();
        config.timeout = self.timeout();
        config.refresh_interval = self.scan_interval();
        config.cycle_deadline = self.cycle_deadline_secs.map(Duration::from_secs);
        Ok(config)
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("io", "scrutiny", "scrutiny-poller").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("scrutiny-poller");
    p
}

// ── Config loading ──────────────────────────────────────────────────

fn figment(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX))
}

/// Load from the canonical path + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from `path` + environment. A missing file yields the defaults.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let config: Config = figment(path).extract()?;
    config.validate()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    cfg.validate()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}
