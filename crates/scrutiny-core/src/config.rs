// ── Runtime coordinator configuration ──
//
// Describes *where* Scrutiny lives and *how often* to poll it. Core never
// reads config files: the CLI resolves a `CoordinatorConfig` and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(60 * 60);
pub const DEFAULT_TIMEOUT: Duration = scrutiny_api::DEFAULT_TIMEOUT;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification. Scrutiny is usually served plain or self-signed
    /// on a LAN, so this is the default.
    #[default]
    DangerAcceptInvalid,
}

/// Configuration for polling a single Scrutiny instance.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Scrutiny root URL (e.g. `http://nas.local:8080`).
    pub url: Url,
    pub tls: TlsVerification,
    /// Per-request timeout, applied to the summary call and every detail call.
    pub timeout: Duration,
    /// Scheduler period. Zero disables the background task.
    pub refresh_interval: Duration,
    /// Overall bound on the detail fan-out. `None` waits for every call.
    pub cycle_deadline: Option<Duration>,
}

impl CoordinatorConfig {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            tls: TlsVerification::default(),
            timeout: DEFAULT_TIMEOUT,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            cycle_deadline: None,
        }
    }
}
