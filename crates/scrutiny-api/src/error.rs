use strum::{Display, EnumString, IntoStaticStr};
use thiserror::Error;

/// Coarse failure classification shared by every Scrutiny call.
///
/// Callers branch on this instead of matching every [`Error`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum FailureKind {
    /// The remote is unreachable or too slow (includes timeouts).
    Connection,
    /// The remote rejected our credentials (HTTP 401/403).
    Auth,
    /// The remote answered, but not with what we expected.
    Response,
    /// Anything else. Always logged with full context.
    Unexpected,
}

impl FailureKind {
    /// Capitalised label for log lines and cycle errors.
    pub fn label(self) -> &'static str {
        match self {
            Self::Connection => "Connection error",
            Self::Auth => "Authentication error",
            Self::Response => "API error",
            Self::Unexpected => "Unexpected error",
        }
    }
}

/// Top-level error type for the `scrutiny-api` crate.
///
/// Every variant carries the URL of the call that produced it, so a
/// failure can be pinned to the summary call or one device's detail call.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// Connection refused, DNS failure, reset mid-body, etc.
    #[error("Connection error with Scrutiny at {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Request exceeded the configured timeout.
    #[error("Timeout connecting to Scrutiny at {url} after {timeout_secs}s")]
    Timeout { url: String, timeout_secs: u64 },

    /// URL construction failed (bad host, bad device id).
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The HTTP client itself could not be built.
    #[error("HTTP client error: {0}")]
    Client(String),

    // ── Authentication ──────────────────────────────────────────────
    /// HTTP 401 or 403.
    #[error("Authentication error with Scrutiny ({status}) at {url}")]
    Authentication { url: String, status: u16 },

    // ── Response ────────────────────────────────────────────────────
    /// Any other non-2xx status.
    #[error("Scrutiny API returned an error ({status}) at {url}")]
    Status { url: String, status: u16, body: String },

    /// The body is not declared as JSON.
    #[error("Expected JSON from Scrutiny {context}, got {content_type}")]
    UnexpectedContentType {
        context: String,
        content_type: String,
        body: String,
    },

    /// The body claims to be JSON but does not decode, or decodes into
    /// the wrong shape.
    #[error("Invalid JSON response received from Scrutiny {context}: {message}")]
    Deserialization {
        context: String,
        message: String,
        body: String,
    },

    /// The payload decoded but `success` was missing or false.
    #[error("Scrutiny API call not successful or unexpected format ({context}): {body}")]
    Unsuccessful { context: String, body: String },

    /// A section the payload must carry is absent or has the wrong type.
    #[error("Scrutiny {context} payload: '{section}' is missing or not {expected}")]
    MissingSection {
        context: String,
        section: &'static str,
        expected: &'static str,
    },

    // ── Catch-all ───────────────────────────────────────────────────
    #[error("Unexpected error processing Scrutiny {context}: {message}")]
    Unexpected { context: String, message: String },
}

impl Error {
    /// Classify this error into one of the [`FailureKind`] buckets.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Transport { .. } | Self::Timeout { .. } => FailureKind::Connection,
            Self::Authentication { .. } => FailureKind::Auth,
            Self::Status { .. }
            | Self::UnexpectedContentType { .. }
            | Self::Deserialization { .. }
            | Self::Unsuccessful { .. }
            | Self::MissingSection { .. } => FailureKind::Response,
            Self::InvalidUrl(_) | Self::Client(_) | Self::Unexpected { .. } => {
                FailureKind::Unexpected
            }
        }
    }
}

/// Truncate a response body for inclusion in an error or log line.
pub(crate) fn preview(body: &str, max_chars: usize) -> String {
    match body.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}…", &body[..idx]),
        None => body.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_errors_classify_by_code() {
        let auth = Error::Authentication {
            url: "http://nas:8080/api/summary".into(),
            status: 401,
        };
        assert_eq!(auth.kind(), FailureKind::Auth);

        let server = Error::Status {
            url: "http://nas:8080/api/summary".into(),
            status: 500,
            body: String::new(),
        };
        assert_eq!(server.kind(), FailureKind::Response);
    }

    #[test]
    fn timeout_is_a_connection_failure() {
        let err = Error::Timeout {
            url: "http://nas:8080/api/summary".into(),
            timeout_secs: 10,
        };
        assert_eq!(err.kind(), FailureKind::Connection);
        assert!(err.to_string().contains("after 10s"));
    }

    #[test]
    fn structural_errors_are_response_failures() {
        let err = Error::MissingSection {
            context: "summary".into(),
            section: "summary",
            expected: "an object",
        };
        assert_eq!(err.kind(), FailureKind::Response);
        assert_eq!(
            err.to_string(),
            "Scrutiny summary payload: 'summary' is missing or not an object"
        );
    }

    #[test]
    fn failure_kind_renders_snake_case() {
        assert_eq!(FailureKind::Connection.to_string(), "connection");
        assert_eq!(FailureKind::Unexpected.to_string(), "unexpected");
    }

    #[test]
    fn preview_truncates_on_char_boundary() {
        assert_eq!(preview("short", 200), "short");
        assert_eq!(preview("äöüß", 2), "äö…");
    }
}
