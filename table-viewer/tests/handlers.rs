//! Router-level tests for flows that need no live database
//!
//! Connection-state checks run before any database work, so the not-connected
//! paths can be exercised end to end through the router.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use table_viewer::{create_router, AppState};
use tower::ServiceExt;

async fn body_string(response: axum::response::Response) -> String {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body collect")
        .to_bytes();
    String::from_utf8(bytes.to_vec()).expect("utf8 body")
}

#[tokio::test]
async fn index_renders_empty_state() {
    let app = create_router(AppState::new());

    let response = app
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("Database Connection"));
    assert!(!body.contains("Select Table to View"));
}

#[tokio::test]
async fn export_without_connection_is_rejected() {
    let app = create_router(AppState::new());

    let response = app
        .oneshot(
            Request::get("/database/export/csv/users")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["error"], "No database connection");
}

#[tokio::test]
async fn query_export_without_connection_is_rejected() {
    let app = create_router(AppState::new());

    let response = app
        .oneshot(
            Request::post("/database/export-query")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{"query": "SELECT 1", "format": "csv", "filename": null}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["error"], "No database connection");
}

#[tokio::test]
async fn view_table_without_connection_renders_message() {
    let app = create_router(AppState::new());

    let response = app
        .oneshot(
            Request::post("/database/view-table")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("tableName=users"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("Please connect to database first"));
}

#[tokio::test]
async fn disconnect_clears_state_and_renders_message() {
    let state = AppState::new();
    state.set_config(table_viewer::ConnectionConfig {
        host: "localhost".to_string(),
        port: 3306,
        user: "root".to_string(),
        password: String::new(),
        database: "demo".to_string(),
    });
    let app = create_router(state.clone());

    let response = app
        .oneshot(
            Request::post("/database/disconnect")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("Disconnected from database"));
    assert!(state.config().is_none());
}
