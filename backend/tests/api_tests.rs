//! HTTP surface tests
//!
//! Drives the router with `tower::ServiceExt::oneshot` against the in-memory ERP.

mod common;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use common::*;
use shared::{DocStatus, ShortfallReport, WorkOrderStatus};
use shortfall_items_backend::config::{Config, ErpConfig, ScannerConfig, ServerConfig};
use shortfall_items_backend::{create_app, AppState};
use tower::ServiceExt;

fn test_config() -> Config {
    Config {
        environment: "test".to_string(),
        server: ServerConfig::default(),
        erp: ErpConfig {
            base_url: "http://erp.local".to_string(),
            api_key: "key".to_string(),
            api_secret: "secret".to_string(),
            timeout_secs: 5,
            create_method: "shortfall.create".to_string(),
            desk_url: Some("https://desk.example.com".to_string()),
        },
        scanner: ScannerConfig::default(),
    }
}

fn app(erp: &FakeErp) -> Router {
    create_app(AppState::new(erp.clone().into_client(), test_config()))
}

async fn send(app: Router, method: &str, uri: &str) -> (StatusCode, Option<String>, String) {
    let response = app
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, content_type, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn test_health() {
    let (status, _, body) = send(app(&FakeErp::new()), "GET", "/api/v1/health").await;
    assert_eq!(status, StatusCode::OK);

    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["environment"], "test");
}

#[tokio::test]
async fn test_shortfall_html() {
    let (status, content_type, body) = send(app(&standard_erp()), "GET", "/api/v1/shortfall").await;
    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("text/html"));
    assert!(body.contains("WO-001"));
    assert!(body.contains("ITEM-A"));
    assert!(body.contains("desk.example.com"));
    assert!(body.contains("Create Material Request"));
}

#[tokio::test]
async fn test_shortfall_empty_state() {
    let (status, _, body) = send(app(&FakeErp::new()), "GET", "/api/v1/shortfall").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("No Work Orders with shortfall."));
}

#[tokio::test]
async fn test_shortfall_json() {
    let (status, _, body) =
        send(app(&standard_erp()), "GET", "/api/v1/shortfall?format=json").await;
    assert_eq!(status, StatusCode::OK);

    let report: ShortfallReport = serde_json::from_str(&body).unwrap();
    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.groups[0].rows[0].shortfall, dec("70"));
}

#[tokio::test]
async fn test_shortfall_csv() {
    let (status, content_type, body) =
        send(app(&standard_erp()), "GET", "/api/v1/shortfall?format=csv").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("text/csv"));

    let lines: Vec<&str> = body.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("work_order,"));
    assert!(lines[1].starts_with("WO-001,"));
}

#[tokio::test]
async fn test_unknown_format_is_rejected() {
    let (status, _, body) =
        send(app(&standard_erp()), "GET", "/api/v1/shortfall?format=xml").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("VALIDATION_ERROR"));
}

#[tokio::test]
async fn test_failed_scan_renders_error_panel() {
    let erp = standard_erp().failing_on("WO-001");
    let (status, content_type, body) = send(app(&erp), "GET", "/api/v1/shortfall").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(content_type.unwrap().starts_with("text/html"));
    assert!(body.contains("Report could not be loaded"));
    assert!(body.contains("ERP_UNAVAILABLE"));
}

#[tokio::test]
async fn test_drafts_html() {
    let erp = standard_erp().with_request(shortfall_request(
        "MAT-MR-0001",
        Some("WO-001"),
        DocStatus::Draft,
        vec![request_line("ITEM-A", "70", None)],
    ));
    let (status, _, body) = send(app(&erp), "GET", "/api/v1/drafts").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("MAT-MR-0001"));
    assert!(body.contains("MR Status: Draft"));
}

#[tokio::test]
async fn test_drafts_empty_state() {
    let (_, _, body) = send(app(&standard_erp()), "GET", "/api/v1/drafts").await;
    assert!(body.contains("No Draft Shortfall Requests found."));
}

#[tokio::test]
async fn test_create_material_request() {
    let erp = standard_erp();
    let (status, _, body) = send(
        app(&erp),
        "POST",
        "/api/v1/work-orders/WO-001/material-request",
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["already_exists"], false);
    assert_eq!(json["mr_name"], "MAT-MR-NEW-0001");
    assert_eq!(
        json["link"],
        "https://desk.example.com/app/material-request/MAT-MR-NEW-0001"
    );
    assert_eq!(erp.requests().len(), 1);
}

#[tokio::test]
async fn test_create_material_request_unknown_work_order() {
    let (status, _, body) = send(
        app(&standard_erp()),
        "POST",
        "/api/v1/work-orders/WO-404/material-request",
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("NOT_FOUND"));
}

#[tokio::test]
async fn test_create_action_for_name_with_spaces() {
    let erp = FakeErp::new().with_work_order(work_order(
        "WO 001#A",
        WorkOrderStatus::InProcess,
        vec![required("ITEM-A", "10", Some("WH-1"))],
    ));

    let (_, _, html) = send(app(&erp), "GET", "/api/v1/shortfall").await;
    assert!(html.contains("WO%20001%23A"));

    let (status, _, body) = send(
        app(&erp),
        "POST",
        "/api/v1/work-orders/WO%20001%23A/material-request",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("MAT-MR-NEW-0001"));
    assert!(erp.calls().contains(&"create:WO 001#A".to_string()));
}

#[tokio::test]
async fn test_scans_of_different_clients() {
    let erp = standard_erp();
    let app = app(&erp);
    let (first, _, _) = send(app.clone(), "GET", "/api/v1/shortfall?client=desk-1").await;
    let (second, _, body) = send(app, "GET", "/api/v1/shortfall?client=desk-2&format=json").await;
    assert_eq!(first, StatusCode::OK);
    assert_eq!(second, StatusCode::OK);
    assert!(body.contains("WO-001"));
}
