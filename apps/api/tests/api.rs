//! End-to-end tests driving the router without a socket.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tabsplit_api::config::ApiConfig;
use tabsplit_api::{router, AppState};
use tabsplit_core::receipt::{Confidence, ImageFormat, ParsedLineItem, ParsedReceipt};
use tabsplit_scan::{ReceiptScanner, ScanError, ScanResult};
use tabsplit_store::Store;
use tower::ServiceExt;

const PNG: &[u8] = b"\x89PNG\r\n\x1a\nfake-png-body";
const BOUNDARY: &str = "tabsplit-test-boundary";

/// Returns a fixed receipt, or fails when built with `failing()`.
struct StubScanner {
    fail: bool,
}

impl StubScanner {
    fn ok() -> Self {
        StubScanner { fail: false }
    }

    fn failing() -> Self {
        StubScanner { fail: true }
    }
}

#[async_trait]
impl ReceiptScanner for StubScanner {
    async fn scan(&self, _image: &[u8], format: ImageFormat) -> ScanResult<ParsedReceipt> {
        if self.fail {
            return Err(ScanError::InvalidJson("no braces here".to_string()));
        }
        assert_eq!(format, ImageFormat::Png);
        Ok(ParsedReceipt {
            restaurant_name: Some("Luigi's".to_string()),
            items: vec![ParsedLineItem {
                name: Some("Pasta".to_string()),
                price: Some(10.0),
                quantity: Some(1.0),
            }],
            subtotal: Some(10.0),
            tax: Some(1.0),
            tip: Some(2.0),
            total: Some(20.0),
            confidence: Some(Confidence::High),
        })
    }
}

fn app_with(scanner: StubScanner) -> (Router, Store) {
    let store = Store::new();
    let state = AppState::new(store.clone(), Arc::new(scanner), ApiConfig::default());
    (router(state), store)
}

fn app() -> (Router, Store) {
    app_with(StubScanner::ok())
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    into_parts(app.clone().oneshot(request).await.unwrap()).await
}

async fn into_parts(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn upload(app: &Router, content_type: &str, bytes: &[u8]) -> (StatusCode, Value) {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"receipt\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/receipts/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();

    into_parts(app.clone().oneshot(request).await.unwrap()).await
}

async fn create_session(app: &Router) -> Value {
    let (status, session) = send(
        app,
        Method::POST,
        "/api/sessions",
        Some(json!({ "restaurantName": "Luigi's" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    session
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_endpoints() {
    let (app, _) = app();

    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&app, Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "running");
}

// =============================================================================
// Sessions
// =============================================================================

#[tokio::test]
async fn test_create_and_fetch_by_code_any_case() {
    let (app, _) = app();
    let session = create_session(&app).await;
    let id = session["id"].as_str().unwrap();
    let code = session["sessionCode"].as_str().unwrap();
    assert_eq!(session["status"], "active");

    let (status, by_id) = send(&app, Method::GET, &format!("/api/sessions/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_id["sessionCode"], code);

    let lower = code.to_ascii_lowercase();
    let (status, by_code) =
        send(&app, Method::GET, &format!("/api/sessions/code/{lower}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_code["id"], id);

    let (status, body) = send(&app, Method::GET, "/api/sessions/code/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_create_with_initial_items() {
    let (app, _) = app();
    let (status, session) = send(
        &app,
        Method::POST,
        "/api/sessions",
        Some(json!({
            "items": [
                { "name": "Pizza", "priceCents": 1800 },
                { "name": "Soda", "priceCents": 300, "quantity": 2 }
            ]
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(session["items"].as_array().unwrap().len(), 2);
    assert_eq!(session["items"][1]["lineNumber"], 2);
}

#[tokio::test]
async fn test_update_rejects_unknown_fields() {
    let (app, _) = app();
    let session = create_session(&app).await;
    let uri = format!("/api/sessions/{}", session["id"].as_str().unwrap());

    let (status, _) = send(&app, Method::PUT, &uri, Some(json!({ "sessionCode": "AAAAAA" }))).await;
    assert!(status.is_client_error());

    let (status, updated) = send(&app, Method::PUT, &uri, Some(json!({ "tipCents": 500 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["tipCents"], 500);

    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/sessions/missing",
        Some(json!({ "tipCents": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_session_frees_code() {
    let (app, store) = app();
    let session = create_session(&app).await;
    let id = session["id"].as_str().unwrap();
    let code = session["sessionCode"].as_str().unwrap();

    let (status, _) = send(&app, Method::DELETE, &format!("/api/sessions/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, Method::GET, &format!("/api/sessions/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, Method::GET, &format!("/api/sessions/code/{code}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(store.sessions().get_by_code(code).is_err());

    let (status, _) = send(&app, Method::DELETE, &format!("/api/sessions/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_complete_session() {
    let (app, _) = app();
    let session = create_session(&app).await;
    let id = session["id"].as_str().unwrap();

    let (status, completed) =
        send(&app, Method::POST, &format!("/api/sessions/{id}/complete"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(completed["status"], "completed");
}

// =============================================================================
// Join, Assign, Balances
// =============================================================================

#[tokio::test]
async fn test_join_assign_and_balances() {
    let (app, _) = app();
    let session = create_session(&app).await;
    let id = session["id"].as_str().unwrap();
    let code = session["sessionCode"].as_str().unwrap().to_ascii_lowercase();

    let mut participant_ids = Vec::new();
    for name in ["Ana", "Ben", "Cy"] {
        let (status, joined) = send(
            &app,
            Method::POST,
            "/api/sessions/join",
            Some(json!({ "sessionCode": code, "guestName": name })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(joined["session"]["id"], id);
        participant_ids.push(joined["participant"]["id"].as_str().unwrap().to_string());
    }

    let (status, item) = send(
        &app,
        Method::POST,
        &format!("/api/sessions/{id}/items"),
        Some(json!({ "name": "Nachos", "priceCents": 1000, "quantity": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, assignments) = send(
        &app,
        Method::POST,
        "/api/sessions/items/assign",
        Some(json!({ "itemId": item["id"], "participantIds": participant_ids })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let amounts: Vec<i64> = assignments
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["amountCents"].as_i64().unwrap())
        .collect();
    assert_eq!(amounts, vec![667, 667, 666]);
    let pct = assignments[0]["splitPercentage"].as_f64().unwrap();
    assert!((pct - 1.0 / 3.0).abs() < 1e-9);

    let (status, paid) = send(
        &app,
        Method::POST,
        &format!("/api/sessions/participants/{}/mark-paid", participant_ids[0]),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(paid["paymentStatus"], "paid");

    let (status, balances) =
        send(&app, Method::GET, &format!("/api/sessions/{id}/balances"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(balances["itemsTotalCents"], 2000);
    assert_eq!(balances["unassignedCents"], 0);
    assert_eq!(balances["participants"][1]["assignedCents"], 667);

    let (status, listed) =
        send(&app, Method::GET, &format!("/api/sessions/{id}/participants"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_join_unknown_code() {
    let (app, _) = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/sessions/join",
        Some(json!({ "sessionCode": "zzzzzz", "guestName": "Ana" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["message"].as_str().unwrap().contains("ZZZZZZ"));
}

#[tokio::test]
async fn test_assign_with_no_participants() {
    let (app, store) = app();
    let session = create_session(&app).await;
    let id = session["id"].as_str().unwrap();

    let (_, item) = send(
        &app,
        Method::POST,
        &format!("/api/sessions/{id}/items"),
        Some(json!({ "name": "Soup", "priceCents": 600 })),
    )
    .await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/sessions/items/assign",
        Some(json!({ "itemId": item["id"], "participantIds": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_REQUEST");
    assert!(store.sessions().get(id).unwrap().assignments.is_empty());

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/sessions/items/assign",
        Some(json!({ "itemId": "missing", "participantIds": ["p1"] })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_item_validation_and_delete() {
    let (app, _) = app();
    let session = create_session(&app).await;
    let id = session["id"].as_str().unwrap();

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/sessions/{id}/items"),
        Some(json!({ "name": "Bad", "priceCents": -5 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/sessions/{id}/items"),
        Some(json!({ "name": "Caviar", "priceCents": i64::MAX / 2, "quantity": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (_, item) = send(
        &app,
        Method::POST,
        &format!("/api/sessions/{id}/items"),
        Some(json!({ "name": "Bread", "priceCents": 400 })),
    )
    .await;
    let item_uri = format!("/api/sessions/items/{}", item["id"].as_str().unwrap());

    let (status, updated) = send(&app, Method::PUT, &item_uri, Some(json!({ "quantity": 2 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["quantity"], 2);

    let (status, _) = send(&app, Method::DELETE, &item_uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::DELETE, &item_uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_assignment_update_and_delete() {
    let (app, _) = app();
    let session = create_session(&app).await;
    let id = session["id"].as_str().unwrap();

    let (_, participant) = send(
        &app,
        Method::POST,
        &format!("/api/sessions/{id}/participants"),
        Some(json!({ "guestName": "Ana" })),
    )
    .await;
    let (_, item) = send(
        &app,
        Method::POST,
        &format!("/api/sessions/{id}/items"),
        Some(json!({ "name": "Wine", "priceCents": 3000 })),
    )
    .await;

    let (status, assignment) = send(
        &app,
        Method::POST,
        "/api/sessions/assignments",
        Some(json!({
            "itemId": item["id"],
            "participantId": participant["id"],
            "splitPercentage": 0.5,
            "amountCents": 1500
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let uri = format!("/api/sessions/assignments/{}", assignment["id"].as_str().unwrap());
    let (status, updated) = send(
        &app,
        Method::PUT,
        &uri,
        Some(json!({ "splitPercentage": 1.0, "amountCents": 3000 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["amountCents"], 3000);

    let (status, _) = send(&app, Method::PUT, &uri, Some(json!({ "splitPercentage": 1.5 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Receipts
// =============================================================================

#[tokio::test]
async fn test_upload_scan_and_fetch() {
    let (app, _) = app();

    let (status, uploaded) = upload(&app, "image/png", PNG).await;
    assert_eq!(status, StatusCode::CREATED);
    let rid = uploaded["receiptId"].as_str().unwrap().to_string();
    assert_eq!(uploaded["imageUrl"], format!("/uploads/{rid}.png"));

    let (status, _) = send(&app, Method::GET, &format!("/api/receipts/{rid}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, receipt) =
        send(&app, Method::POST, &format!("/api/receipts/{rid}/scan"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(receipt["id"], rid.as_str());
    assert_eq!(receipt["restaurantName"], "Luigi's");
    assert_eq!(receipt["items"][0]["priceCents"], 1000);
    assert_eq!(receipt["validation"]["isValid"], false);
    let issue = receipt["validation"]["issues"][0].as_str().unwrap();
    assert!(issue.contains("7.00"));

    let (status, fetched) = send(&app, Method::GET, &format!("/api/receipts/{rid}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, receipt);
}

#[tokio::test]
async fn test_upload_rejects_non_images() {
    let (app, _) = app();
    let (status, body) = upload(&app, "text/plain", b"hello").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_REQUEST");
}

#[tokio::test]
async fn test_scan_unknown_receipt() {
    let (app, _) = app();
    let (status, _) = send(&app, Method::POST, "/api/receipts/missing/scan", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_scan_failure_is_generic_500() {
    let (app, _) = app_with(StubScanner::failing());
    let (_, uploaded) = upload(&app, "image/png", PNG).await;
    let rid = uploaded["receiptId"].as_str().unwrap();

    let (status, body) =
        send(&app, Method::POST, &format!("/api/receipts/{rid}/scan"), None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Failed to parse receipt");
}
