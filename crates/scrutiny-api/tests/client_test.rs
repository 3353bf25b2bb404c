#![allow(clippy::unwrap_used)]
// Integration tests for `ScrutinyClient` using wiremock.

use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use scrutiny_api::{Error, FailureKind, ScrutinyClient, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, ScrutinyClient) {
    let server = MockServer::start().await;
    let client = client_for(&server, Duration::from_secs(10));
    (server, client)
}

fn client_for(server: &MockServer, timeout: Duration) -> ScrutinyClient {
    let base_url = Url::parse(&server.uri()).unwrap();
    let transport = TransportConfig::default().with_timeout(timeout);
    ScrutinyClient::new(base_url, &transport).unwrap()
}

fn summary_body() -> serde_json::Value {
    json!({
        "success": true,
        "data": {
            "summary": {
                "wwn2": {
                    "device": { "device_name": "/dev/sdb", "model_name": "DiskModelB" },
                    "smart": { "temp": 35, "power_on_hours": 2000 }
                },
                "wwn1": {
                    "device": { "device_name": "/dev/sda", "model_name": "DiskModelA" },
                    "smart": { "temp": 30, "power_on_hours": 1000 }
                }
            }
        }
    })
}

fn details_body() -> serde_json::Value {
    json!({
        "success": true,
        "data": {
            "device": {
                "wwn": "wwn1",
                "device_name": "/dev/sda",
                "model_name": "DiskModelA",
                "capacity": 1_099_511_627_776_u64
            },
            "smart_results": [
                {
                    "attrs": { "5": { "attribute_id": 5, "value": 100 } },
                    "Status": 0,
                    "temp": 31,
                    "power_on_hours": 1001
                }
            ]
        },
        "metadata": { "5": { "display_name": "Reallocated Sectors Count", "critical": true } }
    })
}

async fn mount_json(server: &MockServer, route: &str, status: u16, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

// ── Summary ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_get_summary_success() {
    let (server, client) = setup().await;
    mount_json(&server, "/api/summary", 200, summary_body()).await;

    let summary = client.get_summary().await.unwrap();

    assert_eq!(summary.len(), 2);
    assert_eq!(
        summary["wwn1"].device.model_name.as_deref(),
        Some("DiskModelA")
    );
    assert_eq!(summary["wwn2"].smart.temp, Some(35));
}

#[tokio::test]
async fn test_get_summary_preserves_roster_order() {
    let (server, client) = setup().await;
    mount_json(&server, "/api/summary", 200, summary_body()).await;

    let summary = client.get_summary().await.unwrap();
    let order: Vec<&str> = summary.keys().map(String::as_str).collect();

    assert_eq!(order, ["wwn2", "wwn1"]);
}

#[tokio::test]
async fn test_get_summary_empty_roster() {
    let (server, client) = setup().await;
    mount_json(
        &server,
        "/api/summary",
        200,
        json!({ "success": true, "data": { "summary": {} } }),
    )
    .await;

    let summary = client.get_summary().await.unwrap();
    assert!(summary.is_empty());
}

#[tokio::test]
async fn test_get_summary_auth_error() {
    for status in [401, 403] {
        let (server, client) = setup().await;
        Mock::given(method("GET"))
            .and(path("/api/summary"))
            .respond_with(ResponseTemplate::new(status).set_body_string("Forbidden"))
            .mount(&server)
            .await;

        let err = client.get_summary().await.unwrap_err();
        assert!(
            matches!(err, Error::Authentication { status: s, .. } if s == status),
            "expected Authentication error, got: {err:?}"
        );
        assert_eq!(err.kind(), FailureKind::Auth);
    }
}

#[tokio::test]
async fn test_get_summary_server_error() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/summary"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = client.get_summary().await.unwrap_err();

    assert!(
        matches!(err, Error::Status { status: 500, ref body, .. } if body == "boom"),
        "expected Status error, got: {err:?}"
    );
    assert_eq!(err.kind(), FailureKind::Response);
}

#[tokio::test]
async fn test_get_summary_wrong_content_type() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/summary"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("<html>login</html>", "text/html"),
        )
        .mount(&server)
        .await;

    let err = client.get_summary().await.unwrap_err();

    assert_eq!(err.kind(), FailureKind::Response);
    assert!(
        err.to_string()
            .contains("Expected JSON from Scrutiny summary, got text/html"),
        "unexpected message: {err}"
    );
}

#[tokio::test]
async fn test_get_summary_invalid_json() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/summary"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("{not json", "application/json"),
        )
        .mount(&server)
        .await;

    let err = client.get_summary().await.unwrap_err();

    assert!(matches!(err, Error::Deserialization { .. }), "got: {err:?}");
    assert!(
        err.to_string()
            .contains("Invalid JSON response received from Scrutiny summary")
    );
}

#[tokio::test]
async fn test_get_summary_unsuccessful_flag() {
    let (server, client) = setup().await;
    mount_json(
        &server,
        "/api/summary",
        200,
        json!({ "success": false, "errors": ["db locked"] }),
    )
    .await;

    let err = client.get_summary().await.unwrap_err();
    assert!(matches!(err, Error::Unsuccessful { .. }), "got: {err:?}");
}

#[tokio::test]
async fn test_get_summary_missing_success_flag() {
    let (server, client) = setup().await;
    mount_json(
        &server,
        "/api/summary",
        200,
        json!({ "data": { "summary": {} } }),
    )
    .await;

    let err = client.get_summary().await.unwrap_err();
    assert!(matches!(err, Error::Unsuccessful { .. }), "got: {err:?}");
}

#[tokio::test]
async fn test_get_summary_missing_summary_object() {
    let (server, client) = setup().await;
    mount_json(&server, "/api/summary", 200, json!({ "success": true, "data": {} })).await;

    let err = client.get_summary().await.unwrap_err();
    assert!(
        matches!(err, Error::MissingSection { section: "summary", .. }),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn test_get_summary_not_a_mapping() {
    let (server, client) = setup().await;
    mount_json(
        &server,
        "/api/summary",
        200,
        json!({ "success": true, "data": { "summary": ["wwn1", "wwn2"] } }),
    )
    .await;

    let err = client.get_summary().await.unwrap_err();
    assert_eq!(err.kind(), FailureKind::Response);
    assert!(matches!(err, Error::MissingSection { .. }), "got: {err:?}");
}

#[tokio::test]
async fn test_get_summary_timeout() {
    let server = MockServer::start().await;
    let client = client_for(&server, Duration::from_millis(200));
    Mock::given(method("GET"))
        .and(path("/api/summary"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(summary_body())
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let err = client.get_summary().await.unwrap_err();

    assert!(matches!(err, Error::Timeout { .. }), "got: {err:?}");
    assert_eq!(err.kind(), FailureKind::Connection);
}

#[tokio::test]
async fn test_get_summary_connection_refused() {
    // Grab a free port, then close it so nothing is listening there.
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let transport = TransportConfig::default().with_timeout(Duration::from_secs(2));
    let base_url = Url::parse(&format!("http://127.0.0.1:{port}")).unwrap();
    let client = ScrutinyClient::new(base_url, &transport).unwrap();

    let err = client.get_summary().await.unwrap_err();

    assert_eq!(err.kind(), FailureKind::Connection, "got: {err:?}");
    assert!(err.to_string().contains("Connection error with Scrutiny at"));
}

#[tokio::test]
async fn test_get_summary_tolerates_odd_field_types() {
    let (server, client) = setup().await;
    mount_json(
        &server,
        "/api/summary",
        200,
        json!({
            "success": true,
            "data": { "summary": {
                "wwn1": {
                    "device": { "device_name": "/dev/sda", "capacity": "4TB" },
                    "smart": { "temp": 30, "power_on_hours": 1000 }
                },
                "wwn2": {
                    "device": { "device_name": "/dev/sdb", "device_status": 0 },
                    "smart": { "temp": 35.5, "power_on_hours": 2000 }
                },
                "wwn3": "not an object"
            } }
        }),
    )
    .await;

    let summary = client.get_summary().await.unwrap();

    let wwns: Vec<&str> = summary.keys().map(String::as_str).collect();
    assert_eq!(wwns, ["wwn1", "wwn2", "wwn3"]);
    assert_eq!(summary["wwn1"].device.capacity, None);
    assert_eq!(summary["wwn1"].smart.temp, Some(30));
    assert_eq!(summary["wwn2"].smart.temp, None);
    assert_eq!(summary["wwn2"].smart.power_on_hours, Some(2000));
    assert_eq!(summary["wwn2"].device.device_status, Some(0));
    assert_eq!(summary["wwn3"], scrutiny_api::SummaryEntry::default());
}

// ── Details ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_get_device_details_success() {
    let (server, client) = setup().await;
    mount_json(&server, "/api/device/wwn1/details", 200, details_body()).await;

    let details = client.get_device_details("wwn1").await.unwrap();

    assert!(details.success);
    let data = details.data.unwrap();
    assert_eq!(
        data.device.unwrap().model_name.as_deref(),
        Some("DiskModelA")
    );
    let results = data.smart_results.unwrap();
    assert_eq!(results[0].temp, Some(31));
    assert_eq!(results[0].attrs["5"].value, Some(100));
    let metadata = details.metadata.unwrap();
    assert_eq!(
        metadata["5"].display_name.as_deref(),
        Some("Reallocated Sectors Count")
    );
}

#[tokio::test]
async fn test_get_device_details_missing_metadata() {
    let (server, client) = setup().await;
    let mut body = details_body();
    body.as_object_mut().unwrap().remove("metadata");
    mount_json(&server, "/api/device/wwn1/details", 200, body).await;

    let err = client.get_device_details("wwn1").await.unwrap_err();

    assert!(
        matches!(err, Error::MissingSection { section: "metadata", .. }),
        "got: {err:?}"
    );
    assert!(err.to_string().contains("device details (WWN: wwn1)"));
}

#[tokio::test]
async fn test_get_device_details_missing_data() {
    let (server, client) = setup().await;
    mount_json(
        &server,
        "/api/device/wwn1/details",
        200,
        json!({ "success": true, "metadata": {} }),
    )
    .await;

    let err = client.get_device_details("wwn1").await.unwrap_err();
    assert!(
        matches!(err, Error::MissingSection { section: "data", .. }),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn test_get_device_details_auth_error() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/device/wwn1/details"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = client.get_device_details("wwn1").await.unwrap_err();
    assert_eq!(err.kind(), FailureKind::Auth);
    assert!(err.to_string().contains("/api/device/wwn1/details"));
}

#[tokio::test]
async fn test_get_device_details_wrong_content_type() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/device/wwn1/details"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("ok", "text/plain"),
        )
        .mount(&server)
        .await;

    let err = client.get_device_details("wwn1").await.unwrap_err();
    assert!(
        err.to_string()
            .contains("Expected JSON from Scrutiny device details (WWN: wwn1), got text/plain"),
        "unexpected message: {err}"
    );
}

#[tokio::test]
async fn test_get_device_details_unsuccessful_flag() {
    let (server, client) = setup().await;
    let mut body = details_body();
    body["success"] = json!(false);
    mount_json(&server, "/api/device/wwn1/details", 200, body).await;

    let err = client.get_device_details("wwn1").await.unwrap_err();

    assert!(matches!(err, Error::Unsuccessful { .. }), "got: {err:?}");
    assert_eq!(err.kind(), FailureKind::Response);
    assert!(err.to_string().contains("device details (WWN: wwn1)"));
}

#[tokio::test]
async fn test_get_device_details_server_error() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/device/wwn1/details"))
        .respond_with(ResponseTemplate::new(500).set_body_string("database locked"))
        .mount(&server)
        .await;

    let err = client.get_device_details("wwn1").await.unwrap_err();

    assert!(
        matches!(err, Error::Status { status: 500, .. }),
        "got: {err:?}"
    );
    assert_eq!(err.kind(), FailureKind::Response);
}

#[tokio::test]
async fn test_get_device_details_invalid_json() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/device/wwn1/details"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("{\"success\": tru", "application/json"),
        )
        .mount(&server)
        .await;

    let err = client.get_device_details("wwn1").await.unwrap_err();

    assert!(matches!(err, Error::Deserialization { .. }), "got: {err:?}");
    assert_eq!(err.kind(), FailureKind::Response);
    assert!(
        err.to_string()
            .contains("Invalid JSON response received from Scrutiny device details (WWN: wwn1)")
    );
}

#[tokio::test]
async fn test_get_device_details_timeout() {
    let server = MockServer::start().await;
    let client = client_for(&server, Duration::from_millis(200));
    Mock::given(method("GET"))
        .and(path("/api/device/wwn1/details"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(details_body())
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let err = client.get_device_details("wwn1").await.unwrap_err();

    assert!(matches!(err, Error::Timeout { .. }), "got: {err:?}");
    assert_eq!(err.kind(), FailureKind::Connection);
}

#[tokio::test]
async fn test_get_device_details_tolerates_odd_field_types() {
    let (server, client) = setup().await;
    let mut body = details_body();
    body["data"]["smart_results"][0]["temp"] = json!("31C");
    body["data"]["smart_results"][0]["attrs"]["5"]["raw_value"] = json!(1.5);
    body["data"]["device"]["capacity"] = json!(-1);
    mount_json(&server, "/api/device/wwn1/details", 200, body).await;

    let details = client.get_device_details("wwn1").await.unwrap();

    let data = details.data.unwrap();
    let device = data.device.unwrap();
    assert_eq!(device.capacity, None);
    assert_eq!(device.model_name.as_deref(), Some("DiskModelA"));
    let latest = &data.smart_results.unwrap()[0];
    assert_eq!(latest.temp, None);
    assert_eq!(latest.power_on_hours, Some(1001));
    assert_eq!(latest.attrs["5"].value, Some(100));
    assert_eq!(latest.attrs["5"].raw_value, None);
}
