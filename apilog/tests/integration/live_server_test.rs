//! 実ポートで起動したサーバーに対する検証（接続元ホスト・同時書き込み）

use crate::support::app::{build_app, build_app_on_disk};
use crate::support::http::spawn_server;
use apilog::config::AppConfig;

#[tokio::test]
async fn client_host_comes_from_socket_peer() {
    let app = build_app(AppConfig::default()).await;
    let server = spawn_server(app.router.clone()).await;

    let response = reqwest::Client::new()
        .get(server.url("/users"))
        .header("x-forwarded-for", "203.0.113.9")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 204);

    let row: (Option<String>,) = sqlx::query_as("SELECT client_host FROM request_logs")
        .fetch_one(&app.log_pool)
        .await
        .unwrap();
    assert_eq!(row.0.as_deref(), Some("127.0.0.1"));

    server.stop().await;
}

#[tokio::test]
async fn forwarded_for_is_used_when_trusted() {
    let mut config = AppConfig::default();
    config.capture.trust_forwarded_for = true;
    let app = build_app(config).await;
    let server = spawn_server(app.router.clone()).await;

    reqwest::Client::new()
        .get(server.url("/users"))
        .header("x-forwarded-for", "203.0.113.9, 10.0.0.1")
        .send()
        .await
        .unwrap();

    let row: (Option<String>,) = sqlx::query_as("SELECT client_host FROM request_logs")
        .fetch_one(&app.log_pool)
        .await
        .unwrap();
    assert_eq!(row.0.as_deref(), Some("203.0.113.9"));

    server.stop().await;
}

#[tokio::test]
async fn parallel_clients_each_get_one_record() {
    let app = build_app_on_disk(AppConfig::default()).await;
    let server = spawn_server(app.router.clone()).await;
    let client = reqwest::Client::new();

    let mut tasks = Vec::new();
    for i in 0..16 {
        let client = client.clone();
        let url = server.url(&format!("/users/{}?n={}", i, i));
        tasks.push(tokio::spawn(async move {
            client
                .get(url)
                .header("x-user-id", format!("caller-{}", i))
                .send()
                .await
                .unwrap()
                .status()
                .as_u16()
        }));
    }
    for task in tasks {
        assert_eq!(task.await.unwrap(), 404);
    }

    let rows: Vec<(String, String, Option<String>)> =
        sqlx::query_as("SELECT path, query_string, user_id FROM request_logs")
            .fetch_all(&app.log_pool)
            .await
            .unwrap();
    assert_eq!(rows.len(), 16);
    for (path, query, user) in rows {
        let n = path.trim_start_matches("/users/");
        assert_eq!(query, format!("n={}", n));
        assert_eq!(user, Some(format!("caller-{}", n)));
    }

    assert_eq!(app.state.capture.writer().failures(), 0);
    server.stop().await;
}
