#![allow(clippy::unwrap_used)]
// End-to-end cycles against a wiremock Scrutiny instance.

use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use scrutiny_core::{Coordinator, CoordinatorConfig, DeviceWwn, FailureKind};

fn coordinator_for(server: &MockServer) -> Coordinator {
    let mut config = CoordinatorConfig::new(Url::parse(&server.uri()).unwrap());
    config.timeout = Duration::from_secs(5);
    Coordinator::from_config(config).unwrap()
}

async fn mount(server: &MockServer, route: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .mount(server)
        .await;
}

fn summary_body() -> serde_json::Value {
    json!({
        "success": true,
        "data": {
            "summary": {
                "wwn1": {
                    "device": { "device_name": "/dev/sda", "model_name": "DiskModelA" },
                    "smart": { "temp": 30, "power_on_hours": 1000 }
                },
                "wwn2": {
                    "device": { "device_name": "/dev/sdb", "model_name": "DiskModelB" },
                    "smart": { "temp": 35, "power_on_hours": 2000 }
                }
            }
        }
    })
}

fn details_body() -> serde_json::Value {
    json!({
        "success": true,
        "data": {
            "device": { "wwn": "wwn1", "model_name": "DiskModelA", "device_status": 0 },
            "smart_results": [
                { "temp": 31, "Status": 0, "attrs": { "5": { "attribute_id": 5, "value": 100 } } }
            ]
        },
        "metadata": { "5": { "display_name": "Reallocated Sectors Count", "critical": true } }
    })
}

#[tokio::test]
async fn test_cycle_against_http_source() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/api/summary",
        ResponseTemplate::new(200).set_body_json(summary_body()),
    )
    .await;
    mount(
        &server,
        "/api/device/wwn1/details",
        ResponseTemplate::new(200).set_body_json(details_body()),
    )
    .await;
    mount(
        &server,
        "/api/device/wwn2/details",
        ResponseTemplate::new(500).set_body_string("database locked"),
    )
    .await;
    let c = coordinator_for(&server);

    let report = c.first_refresh().await.unwrap();

    let snap = c.snapshot();
    assert!(snap.is_fresh());
    assert_eq!(snap.len(), 2);
    assert!(snap.get("wwn1").unwrap().detail.attribute("5").is_some());
    assert_eq!(snap.get("wwn1").unwrap().temperature(), Some(31));
    assert!(!snap.get("wwn2").unwrap().has_detail());
    assert_eq!(snap.get("wwn2").unwrap().temperature(), Some(35));
    assert_eq!(report.detail_failures, vec![DeviceWwn::new("wwn2")]);
}

#[tokio::test]
async fn test_detail_missing_metadata_becomes_placeholder() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/api/summary",
        ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": { "summary": { "wwn1": { "device": {}, "smart": {} } } }
        })),
    )
    .await;
    let mut body = details_body();
    body.as_object_mut().unwrap().remove("metadata");
    mount(
        &server,
        "/api/device/wwn1/details",
        ResponseTemplate::new(200).set_body_json(body),
    )
    .await;
    let c = coordinator_for(&server);

    let report = c.refresh().await.unwrap();

    assert!(!report.snapshot.get("wwn1").unwrap().has_detail());
    assert_eq!(report.detail_failures, vec![DeviceWwn::new("wwn1")]);
}

#[tokio::test]
async fn test_malformed_summary_aborts_cycle() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/api/summary",
        ResponseTemplate::new(200).set_body_json(json!({ "success": true, "data": { "summary": [] } })),
    )
    .await;
    let c = coordinator_for(&server);

    let err = c.refresh().await.unwrap_err();

    assert_eq!(err.kind(), FailureKind::Response);
    assert!(!c.snapshot().has_refreshed());
    assert!(!c.is_fresh());
    // No detail call was attempted.
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
}

#[tokio::test]
async fn test_odd_field_in_one_entry_keeps_the_roster() {
    let server = MockServer::start().await;
    let mut summary = summary_body();
    summary["data"]["summary"]["wwn2"]["smart"]["temp"] = json!(35.5);
    mount(
        &server,
        "/api/summary",
        ResponseTemplate::new(200).set_body_json(summary),
    )
    .await;
    mount(
        &server,
        "/api/device/wwn1/details",
        ResponseTemplate::new(200).set_body_json(details_body()),
    )
    .await;
    mount(
        &server,
        "/api/device/wwn2/details",
        ResponseTemplate::new(500).set_body_string("database locked"),
    )
    .await;
    let c = coordinator_for(&server);

    let report = c.refresh().await.unwrap();

    assert_eq!(report.snapshot.len(), 2);
    let wwn2 = report.snapshot.get("wwn2").unwrap();
    assert_eq!(wwn2.temperature(), None);
    assert_eq!(wwn2.power_on_hours(), Some(2000));
    assert_eq!(wwn2.device().model_name.as_deref(), Some("DiskModelB"));
}
