// Scrutiny API HTTP client
//
// Wraps `reqwest::Client` with Scrutiny URL construction, status and
// content-type classification, and validation of the `{ success, data }`
// envelope. Endpoint methods return typed payloads; callers never see
// raw `reqwest` responses.

use std::time::Duration;

use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, error, trace, warn};
use url::Url;

use crate::error::{Error, preview};
use crate::models::{DetailPayload, SummaryEntry};
use crate::transport::TransportConfig;

const LOG_PREVIEW_CHARS: usize = 200;
const ERROR_BODY_CHARS: usize = 500;

/// HTTP client for a single Scrutiny web instance.
///
/// Cheap to clone: the underlying `reqwest::Client` is reference counted.
#[derive(Debug, Clone)]
pub struct ScrutinyClient {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl ScrutinyClient {
    /// Create a client for the Scrutiny instance rooted at `base_url`
    /// (e.g. `http://nas.local:8080`). API paths are resolved under `/api/`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, base_url, transport.timeout))
    }

    /// Create a client with a pre-built `reqwest::Client`.
    ///
    /// `timeout` is only used to annotate timeout errors; the client's own
    /// timeout is what actually bounds requests.
    pub fn with_client(http: reqwest::Client, mut base_url: Url, timeout: Duration) -> Self {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self {
            http,
            base_url,
            timeout,
        }
    }

    /// The Scrutiny root URL (always ends in `/`).
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// Fetch the device roster.
    ///
    /// `GET /api/summary`
    ///
    /// Entries come back in the order the remote listed them.
    pub async fn get_summary(&self) -> Result<IndexMap<String, SummaryEntry>, Error> {
        let url = self.api_url("summary")?;
        let context = "summary";
        let mut body = self.get_json(url, context).await?;

        let summary = match body.pointer_mut("/data/summary").map(Value::take) {
            Some(Value::Object(summary)) => summary,
            _ => {
                return Err(Error::MissingSection {
                    context: context.into(),
                    section: "summary",
                    expected: "an object",
                });
            }
        };

        // Entries decode one by one; a malformed entry keeps its WWN in
        // the roster with empty fields.
        let entries: IndexMap<String, SummaryEntry> = summary
            .into_iter()
            .map(|(wwn, entry)| {
                let entry = serde_json::from_value(entry).unwrap_or_else(|e| {
                    warn!(wwn = %wwn, error = %e, "malformed summary entry");
                    SummaryEntry::default()
                });
                (wwn, entry)
            })
            .collect();
        debug!(devices = entries.len(), "fetched Scrutiny summary");
        Ok(entries)
    }

    /// Fetch the deep record for one device.
    ///
    /// `GET /api/device/{wwn}/details`
    ///
    /// Rejects payloads without a `data` object or a `metadata` object.
    pub async fn get_device_details(&self, wwn: &str) -> Result<DetailPayload, Error> {
        let url = self.device_details_url(wwn)?;
        let context = format!("device details (WWN: {wwn})");
        let body = self.get_json(url, &context).await?;

        for section in ["data", "metadata"] {
            if !body.get(section).is_some_and(Value::is_object) {
                return Err(Error::MissingSection {
                    context,
                    section,
                    expected: "an object",
                });
            }
        }

        let payload: DetailPayload =
            serde_json::from_value(body).map_err(|e| Error::Deserialization {
                context: context.clone(),
                message: e.to_string(),
                body: String::new(),
            })?;
        debug!(wwn, "fetched Scrutiny device details");
        Ok(payload)
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build `{base}api/{path}`.
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join("api/")?.join(path)?)
    }

    /// Build `{base}api/device/{wwn}/details`, percent-encoding the WWN.
    pub(crate) fn device_details_url(&self, wwn: &str) -> Result<Url, Error> {
        let mut url = self.api_url("device")?;
        url.path_segments_mut()
            .map_err(|()| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .push(wwn)
            .push("details");
        Ok(url)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// GET `url`, classify failures, and return the decoded envelope.
    ///
    /// On success the body is a JSON object whose `success` flag is true.
    async fn get_json(&self, url: Url, context: &str) -> Result<Value, Error> {
        debug!("GET {}", url);
        let url_str = url.to_string();

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| self.transport_error(&url_str, e))?;

        let status = resp.status();
        if !status.is_success() {
            let code = status.as_u16();
            error!(url = %url_str, status = code, "HTTP error from Scrutiny API");
            if matches!(code, 401 | 403) {
                return Err(Error::Authentication {
                    url: url_str,
                    status: code,
                });
            }
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Status {
                url: url_str,
                status: code,
                body: preview(&body, ERROR_BODY_CHARS),
            });
        }

        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_owned();

        let body = resp
            .text()
            .await
            .map_err(|e| self.transport_error(&url_str, e))?;

        if !content_type.contains("application/json") {
            error!(
                content_type = %content_type,
                body = %preview(&body, LOG_PREVIEW_CHARS),
                "unexpected content type from Scrutiny API"
            );
            return Err(Error::UnexpectedContentType {
                context: context.into(),
                content_type,
                body: preview(&body, ERROR_BODY_CHARS),
            });
        }

        let value: Value = serde_json::from_str(&body).map_err(|e| {
            error!(
                body = %preview(&body, ERROR_BODY_CHARS),
                "failed to decode JSON from Scrutiny"
            );
            Error::Deserialization {
                context: context.into(),
                message: e.to_string(),
                body: preview(&body, ERROR_BODY_CHARS),
            }
        })?;
        trace!(context, body = %preview(&body, LOG_PREVIEW_CHARS), "Scrutiny API response");

        let succeeded = value
            .get("success")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        if !succeeded {
            return Err(Error::Unsuccessful {
                context: context.into(),
                body: preview(&body, LOG_PREVIEW_CHARS),
            });
        }

        Ok(value)
    }

    fn transport_error(&self, url: &str, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout {
                url: url.to_owned(),
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            Error::Transport {
                url: url.to_owned(),
                source: err,
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> ScrutinyClient {
        ScrutinyClient::with_client(
            reqwest::Client::new(),
            Url::parse(base).unwrap(),
            Duration::from_secs(10),
        )
    }

    #[test]
    fn api_url_is_rooted_under_api() {
        let c = client("http://nas.local:8080");
        assert_eq!(
            c.api_url("summary").unwrap().as_str(),
            "http://nas.local:8080/api/summary"
        );
    }

    #[test]
    fn base_path_is_kept_behind_a_reverse_proxy() {
        let c = client("https://home.example/scrutiny");
        assert_eq!(c.base_url().as_str(), "https://home.example/scrutiny/");
        assert_eq!(
            c.api_url("summary").unwrap().as_str(),
            "https://home.example/scrutiny/api/summary"
        );
    }

    #[test]
    fn device_url_encodes_the_wwn() {
        let c = client("http://nas.local:8080");
        assert_eq!(
            c.device_details_url("0x5000cca264eb01d7").unwrap().as_str(),
            "http://nas.local:8080/api/device/0x5000cca264eb01d7/details"
        );
        assert_eq!(
            c.device_details_url("a/b").unwrap().as_str(),
            "http://nas.local:8080/api/device/a%2Fb/details"
        );
    }

    #[test]
    fn new_applies_transport_timeout() {
        let transport = TransportConfig::default().with_timeout(Duration::from_secs(3));
        let c = ScrutinyClient::new(Url::parse("http://10.0.0.5:8080").unwrap(), &transport)
            .unwrap();
        assert_eq!(c.base_url().as_str(), "http://10.0.0.5:8080/");
        assert_eq!(c.timeout(), Duration::from_secs(3));
    }
}
