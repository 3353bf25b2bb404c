// ── Core error types ──
//
// `RefreshError` is the outcome of a cycle that produced no new device
// map. It is `Clone` because a single outcome is handed to every caller
// that joined the same in-flight cycle; the API error behind it is shared
// through an `Arc`.
//
// `CoreError` covers everything that goes wrong before a cycle can run.

use std::sync::Arc;

use scrutiny_api::FailureKind;
use thiserror::Error;

/// Why a refresh cycle ended without publishing a new device map.
#[derive(Debug, Clone, Error)]
pub enum RefreshError {
    /// The summary call failed or its payload was malformed. No detail
    /// call was attempted.
    #[error("{} during Scrutiny data update cycle: {source}", .kind.label())]
    Summary {
        kind: FailureKind,
        #[source]
        source: Arc<scrutiny_api::Error>,
    },

    /// The cycle task itself died before finishing.
    #[error("Scrutiny data update cycle aborted: {reason}")]
    Aborted { reason: String },
}

impl RefreshError {
    pub(crate) fn summary(err: scrutiny_api::Error) -> Self {
        Self::Summary {
            kind: err.kind(),
            source: Arc::new(err),
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Summary { kind, .. } => *kind,
            Self::Aborted { .. } => FailureKind::Unexpected,
        }
    }

    pub fn is_auth(&self) -> bool {
        self.kind() == FailureKind::Auth
    }

    /// The underlying API error, when there is one.
    pub fn api_error(&self) -> Option<&scrutiny_api::Error> {
        match self {
            Self::Summary { source, .. } => Some(source),
            Self::Aborted { .. } => None,
        }
    }
}

/// Errors raised while building a coordinator.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Cannot build Scrutiny client for {url}: {reason}")]
    ClientSetup { url: String, reason: String },
}
