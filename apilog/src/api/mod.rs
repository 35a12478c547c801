//! REST APIハンドラー
//!
//! ルーター構築と各エンドポイント。全ルートをリクエストキャプチャで包む。

/// APIエラーレスポンス
pub mod error;

/// リクエストログ閲覧API
pub mod request_logs;

/// ユーザー管理API
pub mod users;

use crate::request_log::capture_middleware;
use crate::AppState;
use axum::{
    middleware,
    routing::get,
    Json, Router,
};
use serde_json::json;
use tower_http::trace::TraceLayer;

/// GET /health - 死活監視（キャプチャ対象外）
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// アプリケーションのルーターを作成
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/users", get(users::list_users).post(users::create_user))
        .route(
            "/users/{user_id}",
            get(users::get_user)
                .patch(users::update_user)
                .delete(users::delete_user),
        )
        .route("/admin/logs", get(request_logs::list_request_logs))
        .route("/admin/logs/rows", get(request_logs::list_request_log_rows))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            capture_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
