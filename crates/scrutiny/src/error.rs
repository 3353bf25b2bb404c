//! CLI error types with miette diagnostics.
//!
//! Maps core and config errors into user-facing errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use scrutiny_config::ConfigError;
use scrutiny_core::{CoreError, FailureKind, RefreshError};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PARTIAL: i32 = 5;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to Scrutiny at {url}")]
    #[diagnostic(
        code(scrutiny::connection_failed),
        help(
            "Check that the Scrutiny web service is running and reachable.\n\
             URL: {url}\n\
             Try: scrutiny check --host <host> --port <port>"
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Request to Scrutiny timed out")]
    #[diagnostic(
        code(scrutiny::timeout),
        help("Increase the timeout with --timeout or timeout_secs in the config file.")
    )]
    Timeout {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Scrutiny rejected the request")]
    #[diagnostic(
        code(scrutiny::auth_failed),
        help(
            "Scrutiny normally needs no credentials. A reverse proxy in front\n\
             of it may be asking for authentication."
        )
    )]
    AuthFailed {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    // ── Response ─────────────────────────────────────────────────────
    #[error("Scrutiny returned an unusable response")]
    #[diagnostic(
        code(scrutiny::invalid_response),
        help("Check that the host and port point at the Scrutiny web UI, not another service.")
    )]
    InvalidResponse {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Unexpected error while talking to Scrutiny")]
    #[diagnostic(code(scrutiny::unexpected))]
    Unexpected {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    // ── Resources ────────────────────────────────────────────────────
    #[error("Disk '{wwn}' not found")]
    #[diagnostic(
        code(scrutiny::not_found),
        help("Run: scrutiny snapshot -o plain to list known WWNs")
    )]
    DeviceNotFound { wwn: String },

    #[error("Detail data missing for {count} disk(s): {wwns}")]
    #[diagnostic(
        code(scrutiny::partial_details),
        help("Those disks are listed with summary fields only. Rerun with -v for the cause.")
    )]
    PartialDetails { count: usize, wwns: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(scrutiny::validation))]
    Validation { field: String, reason: String },

    #[error("Config file already exists at {path}")]
    #[diagnostic(
        code(scrutiny::config_exists),
        help("Use --force to overwrite it.")
    )]
    ConfigExists { path: String },

    #[error(transparent)]
    #[diagnostic(
        code(scrutiny::config),
        help("Check the config file (scrutiny config path) and SCRUTINY_* environment variables.")
    )]
    Config(ConfigError),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render output: {0}")]
    #[diagnostic(code(scrutiny::render))]
    Render(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::DeviceNotFound { .. } => exit_code::NOT_FOUND,
            Self::PartialDetails { .. } => exit_code::PARTIAL,
            Self::Validation { .. } | Self::ConfigExists { .. } | Self::Config(_) => {
                exit_code::USAGE
            }
            _ => exit_code::GENERAL,
        }
    }

    /// Classify an API failure into the matching CLI error.
    fn from_api(url: String, kind: FailureKind, timed_out: bool, source: BoxedError) -> Self {
        match kind {
            FailureKind::Connection if timed_out => Self::Timeout { source },
            FailureKind::Connection => Self::ConnectionFailed { url, source },
            FailureKind::Auth => Self::AuthFailed { source },
            FailureKind::Response => Self::InvalidResponse { source },
            FailureKind::Unexpected => Self::Unexpected { source },
        }
    }
}

type BoxedError = Box<dyn std::error::Error + Send + Sync>;

// ── Conversions ──────────────────────────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::Config(other),
        }
    }
}

impl From<scrutiny_api::Error> for CliError {
    fn from(err: scrutiny_api::Error) -> Self {
        let timed_out = matches!(err, scrutiny_api::Error::Timeout { .. });
        let url = api_url(&err);
        Self::from_api(url, err.kind(), timed_out, Box::new(err))
    }
}

impl From<RefreshError> for CliError {
    fn from(err: RefreshError) -> Self {
        let (url, timed_out) = err.api_error().map_or((String::new(), false), |api| {
            (
                api_url(api),
                matches!(api, scrutiny_api::Error::Timeout { .. }),
            )
        });
        Self::from_api(url, err.kind(), timed_out, Box::new(err))
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ClientSetup { url, reason } => Self::ConnectionFailed {
                url,
                source: reason.into(),
            },
        }
    }
}

fn api_url(err: &scrutiny_api::Error) -> String {
    match err {
        scrutiny_api::Error::Transport { url, .. }
        | scrutiny_api::Error::Timeout { url, .. }
        | scrutiny_api::Error::Authentication { url, .. }
        | scrutiny_api::Error::Status { url, .. } => url.clone(),
        _ => String::new(),
    }
}
