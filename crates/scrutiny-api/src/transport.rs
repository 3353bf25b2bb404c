// HTTP client construction for the Scrutiny web API.
//
// `ScrutinyClient` owns exactly one `reqwest::Client`, built from a
// `TransportConfig`: certificate policy plus the request timeout.

use std::path::PathBuf;
use std::time::Duration;

/// Default per-request timeout. Summary and detail calls share it.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// How the client treats the server certificate on `https` URLs.
///
/// Ignored for plain `http`, which is how most Scrutiny installs are served.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsMode {
    /// Trust the platform's root store.
    System,
    /// Trust the PEM bundle at this path in addition to the platform roots.
    CustomCa(PathBuf),
    /// Skip certificate checks entirely. Matches self-signed NAS setups.
    #[default]
    DangerAcceptInvalid,
}

/// Certificate policy and timeout for the Scrutiny HTTP client.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::default(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    ///
    /// The timeout covers the whole request, connect through body read,
    /// so a slow Scrutiny host surfaces as a single timeout error.
    pub fn build_client(&self) -> Result<reqwest::Client, crate::error::Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("scrutiny-poller/", env!("CARGO_PKG_VERSION")));

        match &self.tls {
            TlsMode::System => {}
            TlsMode::CustomCa(path) => {
                builder = builder.add_root_certificate(load_ca(path)?);
            }
            TlsMode::DangerAcceptInvalid => {
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        builder
            .build()
            .map_err(|e| crate::error::Error::Client(format!("failed to build HTTP client: {e}")))
    }

    /// Same config with a different timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Same config with a different TLS mode.
    pub fn with_tls(mut self, tls: TlsMode) -> Self {
        self.tls = tls;
        self
    }
}

/// Read a PEM root certificate for `TlsMode::CustomCa`.
fn load_ca(path: &std::path::Path) -> Result<reqwest::Certificate, crate::error::Error> {
    let pem = std::fs::read(path).map_err(|e| {
        crate::error::Error::Client(format!(
            "failed to read CA cert {}: {e}",
            path.display()
        ))
    })?;
    reqwest::Certificate::from_pem(&pem)
        .map_err(|e| crate::error::Error::Client(format!("invalid CA cert: {e}")))
}
