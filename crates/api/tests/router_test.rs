//! Router tests that never reach the database.
//!
//! The state carries a disconnected connection, so every case here must be
//! decided by routing, authentication or request parsing.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use sea_orm::DatabaseConnection;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use bukubesar_api::{AppState, create_router};
use bukubesar_shared::{
    JwtService,
    config::{JwtConfig, ReportsConfig},
};

fn jwt() -> JwtService {
    JwtService::new(&JwtConfig {
        secret: "router-test-secret".to_string(),
        issuer: None,
        leeway_secs: 0,
    })
}

fn app() -> Router {
    let state = AppState {
        db: Arc::new(DatabaseConnection::Disconnected),
        jwt_service: Arc::new(jwt()),
        reports: Arc::new(ReportsConfig::default()),
    };
    create_router(state, &[])
}

fn bearer() -> String {
    let token = jwt().issue_token(Uuid::new_v4(), Some("Tester".into()), 5).unwrap();
    format!("Bearer {token}")
}

async fn send(request: Request<Body>) -> (StatusCode, Value) {
    let response = app().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn test_health_is_public() {
    let (status, body) = send(
        Request::get("/api/v1/health")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["database"], "down");
}

#[tokio::test]
async fn test_missing_token_rejected() {
    let (status, body) = send(
        Request::get("/api/v1/accounts")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_invalid_token_rejected() {
    let (status, body) = send(
        Request::get("/api/v1/journal-entries")
            .header(header::AUTHORIZATION, "Bearer not-a-jwt")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_unknown_report_kind() {
    let (status, body) = send(
        Request::get("/api/v1/reports/cash-flow")
            .header(header::AUTHORIZATION, bearer())
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "REPORT_NOT_FOUND");
}

#[tokio::test]
async fn test_unsupported_export_format() {
    let (status, body) = send(
        Request::get("/api/v1/reports/trial-balance/export?format=pdf")
            .header(header::AUTHORIZATION, bearer())
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "UNSUPPORTED_EXPORT_FORMAT");
}

#[tokio::test]
async fn test_invalid_journal_type() {
    let (status, body) = send(
        Request::get("/api/v1/reports/trial-balance?journalType=weekly")
            .header(header::AUTHORIZATION, bearer())
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_JOURNAL_TYPE");
}

#[tokio::test]
async fn test_malformed_journal_body() {
    let (status, body) = send(
        Request::post("/api/v1/journal-entries")
            .header(header::AUTHORIZATION, bearer())
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"description": "Rent"}"#))
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_BODY");
}

#[tokio::test]
async fn test_partial_period_range_rejected() {
    let (status, body) = send(
        Request::post("/api/v1/fiscal-periods")
            .header(header::AUTHORIZATION, bearer())
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"name": "Odd", "start_date": "2024-01-01"}"#))
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "MISSING_DATE_RANGE");
    assert_eq!(body["values"]["name"], "Odd");
}

#[tokio::test]
async fn test_comparison_before_first_date_rejected() {
    for kind in ["profit-loss", "balance-sheet"] {
        let (status, body) = send(
            Request::get(format!(
                "/api/v1/reports/{kind}?startDate=-262143-01-01&endDate=2024-01-31&compareWithPrevious=true"
            ))
            .header(header::AUTHORIZATION, bearer())
            .body(Body::empty())
            .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{kind}");
        assert_eq!(body["error"], "INVALID_DATE_RANGE", "{kind}");
    }
}

#[tokio::test]
async fn test_malformed_id_rejected_as_json() {
    for path in [
        "/api/v1/journal-entries/not-a-uuid",
        "/api/v1/fiscal-periods/not-a-uuid",
        "/api/v1/accounts/not-a-uuid",
        "/api/v1/account-groups/not-a-uuid",
        "/api/v1/account-types/not-a-uuid",
    ] {
        let (status, body) = send(
            Request::get(path)
                .header(header::AUTHORIZATION, bearer())
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{path}");
        assert_eq!(body["error"], "INVALID_PATH", "{path}");
    }
}
