use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use orbit::config::OrbitConfig;
use orbit::node::OrbitNode;
use orbit::rpc::router;

async fn app() -> Router {
    let mut config = OrbitConfig::default();
    config.auth.secret_key = "integration-secret".to_string();
    config.storage.seed_samples = false;

    let node = OrbitNode::ephemeral(config).unwrap();
    node.bootstrap().await.unwrap();
    router(node.state())
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
    token: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn login(app: &Router, username: &str, password: &str) -> (StatusCode, Value) {
    send(
        app,
        Method::POST,
        "/api/login",
        Some(json!({"username": username, "password": password})),
        None,
    )
    .await
}

#[tokio::test]
async fn health_check_reports_healthy() {
    let app = app().await;
    let (status, body) = send(&app, Method::GET, "/api/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert!(body.get("timestamp").is_some());
    assert_eq!(body["version"], "2.0.0");
    assert_eq!(body["store"], "reachable");
}

#[tokio::test]
async fn login_success_returns_token_and_user() {
    let app = app().await;
    let (status, body) = login(&app, "admin", "password").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["token"].as_str().unwrap().split('.').count() == 3);
    assert_eq!(body["user"]["username"], "admin");
    assert_eq!(body["user"]["role"], "Administrator");
    assert!(body["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let app = app().await;
    let (wrong_status, wrong_body) = login(&app, "admin", "wrong").await;
    let (unknown_status, unknown_body) = login(&app, "nobody", "password").await;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_body, unknown_body);
    assert_eq!(wrong_body["success"], false);
    assert!(wrong_body.get("token").is_none());
}

#[tokio::test]
async fn login_missing_fields_is_bad_request() {
    let app = app().await;
    let (status, body) = send(&app, Method::POST, "/api/login", Some(json!({})), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/login",
        Some(json!({"username": "admin"})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_malformed_body_is_bad_request() {
    let app = app().await;
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_then_list_and_stats() {
    let app = app().await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/cards",
        Some(json!({"identifier": "RC-1", "estimate": 1500.0})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["card"]["identifier"], "RC-1");
    assert_eq!(body["card"]["status"], "Requested");
    assert_eq!(body["card"]["estimate"], json!(1500.0));

    let (status, body) = send(&app, Method::GET, "/api/cards", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cards"].as_array().unwrap().len(), 1);
    assert_eq!(body["cards"][0]["identifier"], "RC-1");

    let (status, body) = send(&app, Method::GET, "/api/dashboard-stats", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["total_count"], 1);
    assert_eq!(data["total_value"], json!(1500.0));
    assert_eq!(
        data["status_distribution"],
        json!({"Requested": 1, "UnderReview": 0, "Approved": 0, "Received": 0, "Rejected": 0})
    );
}

#[tokio::test]
async fn empty_stats_list_every_status() {
    let app = app().await;
    let (_, body) = send(&app, Method::GET, "/api/dashboard-stats", None, None).await;
    assert_eq!(body["data"]["total_count"], 0);
    assert_eq!(body["data"]["total_value"], json!(0.0));
    assert_eq!(body["data"]["status_distribution"].as_object().unwrap().len(), 5);
}

#[tokio::test]
async fn stats_overflow_is_a_structured_error() {
    let app = app().await;
    for identifier in ["RC-BIG-1", "RC-BIG-2"] {
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/cards",
            Some(json!({"identifier": identifier, "estimate": 7e28})),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(&app, Method::GET, "/api/dashboard-stats", None, None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Internal server error");
}

#[tokio::test]
async fn create_with_title_alias_and_missing_title() {
    let app = app().await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/cards",
        Some(json!({"title": "New Test Card", "description": "d", "status": "Approved", "priority": "high"})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["card"]["identifier"], "New Test Card");
    assert_eq!(body["card"]["status"], "Approved");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/cards",
        Some(json!({"description": "no title"})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn duplicate_card_conflicts() {
    let app = app().await;
    let card = json!({"identifier": "RC-DUP", "estimate": 10});
    let (first, _) = send(&app, Method::POST, "/api/cards", Some(card.clone()), None).await;
    let (second, body) = send(&app, Method::POST, "/api/cards", Some(card), None).await;

    assert_eq!(first, StatusCode::CREATED);
    assert_eq!(second, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);

    let (_, list) = send(&app, Method::GET, "/api/cards", None, None).await;
    assert_eq!(list["cards"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn negative_estimate_is_rejected() {
    let app = app().await;
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/cards",
        Some(json!({"identifier": "RC-NEG", "estimate": -5.0})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn bearer_token_sets_creator() {
    let app = app().await;
    let (_, session) = login(&app, "manager", "password").await;
    let token = session["token"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/cards",
        Some(json!({"identifier": "RC-TOK", "estimate": 1, "created_by": "someone-else"})),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["card"]["created_by"], "manager");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/cards",
        Some(json!({"identifier": "RC-BAD", "estimate": 1})),
        Some("not.a.token"),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid or expired token");
}

#[tokio::test]
async fn get_card_by_identifier() {
    let app = app().await;
    send(
        &app,
        Method::POST,
        "/api/cards",
        Some(json!({"identifier": "RC-42", "estimate": 42, "unit": "Fortaleza"})),
        None,
    )
    .await;

    let (status, body) = send(&app, Method::GET, "/api/cards/RC-42", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["card"]["unit"], "Fortaleza");

    let (status, body) = send(&app, Method::GET, "/api/cards/RC-404", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn sla_metrics_shape() {
    let app = app().await;
    let (status, body) = send(&app, Method::GET, "/api/sla", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    for key in ["sla_targets", "current_performance", "deadlines"] {
        assert!(body["metrics"].get(key).is_some(), "missing {key}");
    }
}
