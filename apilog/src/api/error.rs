//! APIエラーレスポンス型
//!
//! axum用の共通エラーハンドリング

use axum::{response::IntoResponse, Json};
use serde_json::json;

use crate::common::error::ServiceError;

/// Axum用のエラーレスポンス型
#[derive(Debug)]
pub struct AppError(pub ServiceError);

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        AppError(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        // 内部詳細はサーバーログにのみ残す
        if self.0.status_code().is_server_error() {
            tracing::error!("Request failed: {}", self.0);
        }

        let payload = json!({
            "error": self.0.external_message()
        });

        (self.0.status_code(), Json(payload)).into_response()
    }
}
