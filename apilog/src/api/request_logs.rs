//! リクエストログ閲覧API
//!
//! `/admin/logs` 系のエンドポイント。全ページ表示用と、同じページの行だけを返す
//! 部分更新用の二つの形を提供する。

use super::error::AppError;
use crate::common::error::ServiceError;
use crate::request_log::RequestLog;
use crate::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

/// ページ指定のクエリパラメータ
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    /// ページ番号（1始まり、デフォルト: 1）
    pub page: Option<i64>,
    /// ページあたり件数（デフォルトは設定値）
    pub per_page: Option<i64>,
}

/// 表示用のログ行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestLogView {
    /// ログID
    pub id: i64,
    /// 記録時刻（RFC3339）
    pub created_at: String,
    /// HTTPメソッド
    pub method: String,
    /// パス
    pub path: String,
    /// クエリ文字列
    pub query_string: String,
    /// リクエスト本文
    pub request_body: Option<String>,
    /// レスポンス本文
    pub response_body: Option<String>,
    /// ステータスコード
    pub status_code: u16,
    /// 処理時間（ミリ秒、小数第2位に丸め）
    pub duration_ms: f64,
    /// 呼び出し元ユーザーID
    pub user_id: Option<String>,
    /// 呼び出し元ホスト
    pub client_host: Option<String>,
}

impl From<RequestLog> for RequestLogView {
    fn from(log: RequestLog) -> Self {
        Self {
            id: log.id,
            created_at: log.created_at.to_rfc3339(),
            method: log.method,
            path: log.path,
            query_string: log.query_string,
            request_body: log.request_body,
            response_body: log.response_body,
            status_code: log.status_code,
            duration_ms: (log.duration_ms * 100.0).round() / 100.0,
            user_id: log.user_id,
            client_host: log.client_host,
        }
    }
}

/// 全ページ表示用レスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct RequestLogPageResponse {
    /// ログ行（新しい順）
    pub items: Vec<RequestLogView>,
    /// 総件数
    pub total: u64,
    /// 総ページ数
    pub total_pages: u32,
    /// 現在のページ番号
    pub page: u32,
    /// ページあたり件数
    pub per_page: u32,
    /// 次のページがあるか
    pub has_next: bool,
    /// 前のページがあるか
    pub has_prev: bool,
}

/// 部分更新用レスポンス（行のみ）
#[derive(Debug, Serialize, Deserialize)]
pub struct RequestLogRowsResponse {
    /// 現在のページ番号
    pub page: u32,
    /// ログ行（新しい順）
    pub items: Vec<RequestLogView>,
}

fn to_u32(value: i64, name: &str) -> Result<u32, ServiceError> {
    if value < 1 {
        return Err(ServiceError::Validation(format!("{} must be at least 1", name)));
    }
    u32::try_from(value)
        .map_err(|_| ServiceError::Validation(format!("{} is too large", name)))
}

impl PageQuery {
    fn resolve(&self, state: &AppState) -> Result<(u32, u32), ServiceError> {
        let page = to_u32(self.page.unwrap_or(1), "page")?;
        let per_page = match self.per_page {
            Some(value) => to_u32(value, "per_page")?,
            None => state.request_log_reader.config().default_per_page,
        };
        Ok((page, per_page))
    }
}

/// GET /admin/logs - リクエストログ一覧（全ページ）
pub async fn list_request_logs(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<RequestLogPageResponse>, AppError> {
    let (page, per_page) = query.resolve(&state)?;
    let result = state.request_log_reader.list_page(page, per_page).await?;
    let pagination = result.pagination;

    Ok(Json(RequestLogPageResponse {
        items: result.items.into_iter().map(RequestLogView::from).collect(),
        total: pagination.total,
        total_pages: pagination.total_pages,
        page: pagination.page,
        per_page: pagination.per_page,
        has_next: pagination.has_next(),
        has_prev: pagination.has_prev(),
    }))
}

/// GET /admin/logs/rows - リクエストログ行のみ（部分更新用）
pub async fn list_request_log_rows(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<RequestLogRowsResponse>, AppError> {
    let (page, per_page) = query.resolve(&state)?;
    let rows = state.request_log_reader.list_rows(page, per_page).await?;

    Ok(Json(RequestLogRowsResponse {
        page,
        items: rows.into_iter().map(RequestLogView::from).collect(),
    }))
}
