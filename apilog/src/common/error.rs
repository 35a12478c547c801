//! エラー型定義
//!
//! 統一エラー型（thiserror使用）。
//! `ServiceError`は`status_code()`と`external_message()`を提供し、
//! API層でクライアント向けレスポンスに変換される。

use axum::http::StatusCode;
use thiserror::Error;

/// サービス共通エラー型
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Requested page is beyond the last page
    #[error("Page {page} out of range (total pages: {total_pages})")]
    PageOutOfRange {
        /// 要求されたページ番号
        page: u32,
        /// 総ページ数
        total_pages: u32,
    },

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Conflict error (e.g., duplicate resource)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Timeout error
    #[error("Timeout error: {0}")]
    Timeout(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Returns a safe error message for external clients.
    ///
    /// Database details and internal causes stay in server logs; only the
    /// not-found and validation messages carry caller-relevant text.
    pub fn external_message(&self) -> String {
        match self {
            Self::Database(_) => "Database error".to_string(),
            Self::NotFound(detail) => detail.clone(),
            Self::PageOutOfRange { .. } => "Page not found".to_string(),
            Self::Validation(detail) => detail.clone(),
            Self::Conflict(detail) => detail.clone(),
            Self::Timeout(_) => "Request timeout".to_string(),
            Self::Internal(_) => "Internal server error".to_string(),
        }
    }

    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::PageOutOfRange { .. } => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// サービス共通のResult型
pub type ServiceResult<T> = Result<T, ServiceError>;
