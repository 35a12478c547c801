//! リクエストログストレージ（SQLite）

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::{SqliteConnection, SqlitePool};

use crate::common::error::{ServiceError, ServiceResult};
use crate::db::traits::RequestLogRepository;
use crate::request_log::types::{NewRequestLog, RequestLog};

/// created_at の保存形式
///
/// マイクロ秒・`Z` 固定の RFC3339 にすることで、文字列順と時刻順を一致させる。
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// リクエストログのDB操作
#[derive(Clone)]
pub struct RequestLogStorage {
    pool: SqlitePool,
}

/// sqlx::FromRow用の行構造体
#[derive(Debug, sqlx::FromRow)]
struct RequestLogRow {
    id: i64,
    created_at: String,
    method: String,
    path: String,
    query_string: String,
    request_body: Option<String>,
    response_body: Option<String>,
    status_code: i64,
    duration_ms: f64,
    user_id: Option<String>,
    client_host: Option<String>,
}

impl TryFrom<RequestLogRow> for RequestLog {
    type Error = ServiceError;

    fn try_from(row: RequestLogRow) -> Result<Self, Self::Error> {
        let created_at = DateTime::parse_from_rfc3339(&row.created_at)
            .map_err(|e| {
                ServiceError::Database(format!(
                    "Invalid created_at '{}' for request log {}: {}",
                    row.created_at, row.id, e
                ))
            })?
            .with_timezone(&Utc);
        let status_code = u16::try_from(row.status_code).map_err(|_| {
            ServiceError::Database(format!(
                "Invalid status_code {} for request log {}",
                row.status_code, row.id
            ))
        })?;

        Ok(RequestLog {
            id: row.id,
            created_at,
            method: row.method,
            path: row.path,
            query_string: row.query_string,
            request_body: row.request_body,
            response_body: row.response_body,
            status_code,
            duration_ms: row.duration_ms,
            user_id: row.user_id,
            client_host: row.client_host,
        })
    }
}

impl RequestLogStorage {
    /// 新しいストレージを作成
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// 接続プール
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn acquire(&self) -> ServiceResult<sqlx::pool::PoolConnection<sqlx::Sqlite>> {
        self.pool
            .acquire()
            .await
            .map_err(|e| ServiceError::Database(format!("Failed to acquire connection: {}", e)))
    }
}

#[async_trait]
impl RequestLogRepository for RequestLogStorage {
    async fn insert(&self, record: &NewRequestLog) -> ServiceResult<i64> {
        // 専用のトランザクション。commit前にエラーで抜けた場合はDropでロールバックされる
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| ServiceError::Database(format!("Failed to begin transaction: {}", e)))?;

        let result = sqlx::query(
            "INSERT INTO request_logs (
                created_at, method, path, query_string, request_body, response_body,
                status_code, duration_ms, user_id, client_host
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(format_timestamp(&record.created_at))
        .bind(&record.method)
        .bind(&record.path)
        .bind(&record.query_string)
        .bind(&record.request_body)
        .bind(&record.response_body)
        .bind(i64::from(record.status_code))
        .bind(record.duration_ms.max(0.0))
        .bind(&record.user_id)
        .bind(&record.client_host)
        .execute(&mut *tx)
        .await
        .map_err(|e| ServiceError::Database(format!("Failed to insert request log: {}", e)))?;

        tx.commit()
            .await
            .map_err(|e| ServiceError::Database(format!("Failed to commit request log: {}", e)))?;

        Ok(result.last_insert_rowid())
    }

    async fn count(&self) -> ServiceResult<u64> {
        let mut conn = self.acquire().await?;
        count_rows(&mut conn).await
    }

    async fn fetch_page(&self, limit: u32, offset: u64) -> ServiceResult<Vec<RequestLog>> {
        let mut conn = self.acquire().await?;
        select_page(&mut conn, limit, offset).await
    }

    async fn fetch_page_with_total(
        &self,
        limit: u32,
        offset: u64,
    ) -> ServiceResult<(u64, Vec<RequestLog>)> {
        // WALでは最初のSELECTからcommitまで同じスナップショットを読む
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| ServiceError::Database(format!("Failed to begin transaction: {}", e)))?;

        let total = count_rows(&mut tx).await?;
        let items = select_page(&mut tx, limit, offset).await?;

        tx.commit()
            .await
            .map_err(|e| ServiceError::Database(format!("Failed to end read transaction: {}", e)))?;

        Ok((total, items))
    }
}

async fn count_rows(conn: &mut SqliteConnection) -> ServiceResult<u64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM request_logs")
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| ServiceError::Database(format!("Failed to count request logs: {}", e)))?;
    Ok(count.max(0) as u64)
}

async fn select_page(
    conn: &mut SqliteConnection,
    limit: u32,
    offset: u64,
) -> ServiceResult<Vec<RequestLog>> {
    let offset = i64::try_from(offset)
        .map_err(|_| ServiceError::Validation("Page offset is too large".to_string()))?;

    let rows = sqlx::query_as::<_, RequestLogRow>(
        "SELECT id, created_at, method, path, query_string, request_body, response_body,
                status_code, duration_ms, user_id, client_host
         FROM request_logs
         ORDER BY created_at DESC, id DESC
         LIMIT ? OFFSET ?",
    )
    .bind(i64::from(limit))
    .bind(offset)
    .fetch_all(&mut *conn)
    .await
    .map_err(|e| ServiceError::Database(format!("Failed to query request logs: {}", e)))?;

    rows.into_iter().map(RequestLog::try_from).collect()
}
