//! キャプチャミドルウェアをルーター全体で検証する

use crate::support::app::{build_app, read_json};
use apilog::config::AppConfig;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &'static str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn unknown_route_is_logged_with_404() {
    let app = build_app(AppConfig::default()).await;

    let response = app.send(get("/nowhere?trace=1")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let row: (String, String, i64) = sqlx::query_as(
        "SELECT path, query_string, status_code FROM request_logs",
    )
    .fetch_one(&app.log_pool)
    .await
    .unwrap();
    assert_eq!(row, ("/nowhere".to_string(), "trace=1".to_string(), 404));
}

#[tokio::test]
async fn rejected_payload_is_logged_with_actual_status() {
    let app = build_app(AppConfig::default()).await;

    let payload = r#"{"first_name":"Ada","last_name":"Lovelace","email":"ada@example.com","admin":true}"#;
    let response = app.send(post_json("/users", payload)).await;
    let status = response.status();
    assert!(status.is_client_error());

    let row: (Option<String>, i64) =
        sqlx::query_as("SELECT request_body, status_code FROM request_logs")
            .fetch_one(&app.log_pool)
            .await
            .unwrap();
    assert_eq!(row.0.as_deref(), Some(payload));
    assert_eq!(row.1, i64::from(status.as_u16()));
}

#[tokio::test]
async fn validation_error_body_is_recorded() {
    let app = build_app(AppConfig::default()).await;

    let response = app
        .send(post_json(
            "/users",
            r#"{"first_name":"","last_name":"Lovelace","email":"ada@example.com"}"#,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;

    let row: (Option<String>,) = sqlx::query_as("SELECT response_body FROM request_logs")
        .fetch_one(&app.log_pool)
        .await
        .unwrap();
    let logged: serde_json::Value = serde_json::from_str(row.0.as_deref().unwrap()).unwrap();
    assert_eq!(logged, body);
}

#[tokio::test]
async fn excluded_prefixes_produce_no_records() {
    let app = build_app(AppConfig::default()).await;

    for uri in ["/health", "/admin/logs", "/admin/logs/rows", "/docs", "/openapi.json"] {
        app.send(get(uri)).await;
    }
    assert_eq!(app.log_count().await, 0);

    app.send(get("/users")).await;
    assert_eq!(app.log_count().await, 1);
}

#[tokio::test]
async fn configured_prefixes_replace_defaults() {
    let mut config = AppConfig::default();
    config.capture.excluded_prefixes = vec!["/users".to_string()];
    let app = build_app(config).await;

    app.send(get("/users")).await;
    app.send(get("/health")).await;

    let paths: Vec<(String,)> = sqlx::query_as("SELECT path FROM request_logs")
        .fetch_all(&app.log_pool)
        .await
        .unwrap();
    assert_eq!(paths, vec![("/health".to_string(),)]);
}

#[tokio::test]
async fn concurrent_requests_do_not_mix_fields() {
    let app = build_app(AppConfig::default()).await;

    let first = Request::builder()
        .method("POST")
        .uri("/users")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-user-id", "alice")
        .body(Body::from(
            r#"{"first_name":"Alice","last_name":"Liddell","email":"alice@example.com"}"#,
        ))
        .unwrap();
    let second = Request::builder()
        .uri("/users/999?verbose=true")
        .header("x-user-id", "bob")
        .body(Body::empty())
        .unwrap();

    let (a, b) = tokio::join!(app.send(first), app.send(second));
    assert_eq!(a.status(), StatusCode::CREATED);
    assert_eq!(b.status(), StatusCode::NOT_FOUND);

    let rows: Vec<(String, String, String, i64, Option<String>, Option<String>)> =
        sqlx::query_as(
            "SELECT method, path, query_string, status_code, user_id, request_body
             FROM request_logs ORDER BY path",
        )
        .fetch_all(&app.log_pool)
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);

    let (method, path, query, status, user, body) = &rows[0];
    assert_eq!((method.as_str(), path.as_str()), ("POST", "/users"));
    assert_eq!(query, "");
    assert_eq!(*status, 201);
    assert_eq!(user.as_deref(), Some("alice"));
    assert!(body.as_deref().unwrap().contains("alice@example.com"));

    let (method, path, query, status, user, body) = &rows[1];
    assert_eq!((method.as_str(), path.as_str()), ("GET", "/users/999"));
    assert_eq!(query, "verbose=true");
    assert_eq!(*status, 404);
    assert_eq!(user.as_deref(), Some("bob"));
    assert_eq!(*body, None);
}

#[tokio::test]
async fn duration_is_non_negative_and_recorded_once() {
    let app = build_app(AppConfig::default()).await;
    app.send(get("/users")).await;

    let row: (f64, String) = sqlx::query_as("SELECT duration_ms, created_at FROM request_logs")
        .fetch_one(&app.log_pool)
        .await
        .unwrap();
    assert!(row.0 >= 0.0);
    assert!(row.1.ends_with('Z'));
    assert_eq!(app.log_count().await, 1);
}

#[tokio::test]
async fn head_request_is_logged_without_body() {
    let app = build_app(AppConfig::default()).await;

    let response = app
        .send(
            Request::builder()
                .method("HEAD")
                .uri("/users")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let row: (String, Option<String>, i64) =
        sqlx::query_as("SELECT method, response_body, status_code FROM request_logs")
            .fetch_one(&app.log_pool)
            .await
            .unwrap();
    assert_eq!(row, ("HEAD".to_string(), None, 200));
}
