//! ユーザーCRUD APIと、その呼び出しが記録されることを検証する

use crate::support::app::{build_app, read_json, TestApp};
use apilog::config::AppConfig;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};

fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn create_user(app: &TestApp, email: &str) -> i64 {
    let body = format!(
        r#"{{"first_name":"Grace","last_name":"Hopper","email":"{}"}}"#,
        email
    );
    let response = app.send(json_request("POST", "/users", &body)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    read_json(response).await["id"].as_i64().unwrap()
}

#[tokio::test]
async fn crud_flow_is_fully_logged() {
    let app = build_app(AppConfig::default()).await;

    let response = app.send(empty_request("GET", "/users")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let id = create_user(&app, "grace@example.com").await;

    let response = app.send(empty_request("GET", &format!("/users/{}", id))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await["email"], "grace@example.com");

    let response = app
        .send(json_request(
            "PATCH",
            &format!("/users/{}", id),
            r#"{"last_name":"Murray Hopper"}"#,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = read_json(response).await;
    assert_eq!(updated["last_name"], "Murray Hopper");
    assert_eq!(updated["first_name"], "Grace");

    let response = app.send(empty_request("GET", "/users")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await.as_array().unwrap().len(), 1);

    let response = app
        .send(empty_request("DELETE", &format!("/users/{}", id)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await["id"], id);

    let response = app.send(empty_request("GET", &format!("/users/{}", id))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(read_json(response).await["error"], "User Not Found!");

    let statuses: Vec<(String, i64)> =
        sqlx::query_as("SELECT method, status_code FROM request_logs ORDER BY id")
            .fetch_all(&app.log_pool)
            .await
            .unwrap();
    let expected = vec![
        ("GET".to_string(), 204),
        ("POST".to_string(), 201),
        ("GET".to_string(), 200),
        ("PATCH".to_string(), 200),
        ("GET".to_string(), 200),
        ("DELETE".to_string(), 200),
        ("GET".to_string(), 404),
    ];
    assert_eq!(statuses, expected);
}

#[tokio::test]
async fn empty_list_response_has_no_logged_body() {
    let app = build_app(AppConfig::default()).await;
    app.send(empty_request("GET", "/users")).await;

    let row: (Option<String>, Option<String>) =
        sqlx::query_as("SELECT request_body, response_body FROM request_logs")
            .fetch_one(&app.log_pool)
            .await
            .unwrap();
    assert_eq!(row, (None, None));
}

#[tokio::test]
async fn duplicate_email_is_conflict() {
    let app = build_app(AppConfig::default()).await;
    create_user(&app, "dup@example.com").await;

    let response = app
        .send(json_request(
            "POST",
            "/users",
            r#"{"first_name":"Other","last_name":"Person","email":"dup@example.com"}"#,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(read_json(response).await["error"], "Email already registered");
}

#[tokio::test]
async fn unknown_user_operations_return_not_found() {
    let app = build_app(AppConfig::default()).await;

    let response = app
        .send(json_request("PATCH", "/users/42", r#"{"first_name":"X"}"#))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.send(empty_request("DELETE", "/users/42")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(read_json(response).await["error"], "User Not Found!");
}

#[tokio::test]
async fn invalid_email_is_bad_request() {
    let app = build_app(AppConfig::default()).await;

    let response = app
        .send(json_request(
            "POST",
            "/users",
            r#"{"first_name":"A","last_name":"B","email":"not-an-email"}"#,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(read_json(response).await["error"]
        .as_str()
        .unwrap()
        .contains("email"));
}
