//! リクエストログライター
//!
//! スナップショット1件を1トランザクションで永続化する。バッチ・リトライは行わない。
//! 失敗はログ経路に閉じ込め、HTTPレスポンスには影響させない。

use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{trace, warn};

use crate::common::error::{ServiceError, ServiceResult};
use crate::db::traits::RequestLogRepository;
use crate::request_log::types::Snapshot;

/// リクエストログライター
///
/// Clone可能（リポジトリと失敗カウンタを共有する）。
#[derive(Clone)]
pub struct RequestLogWriter {
    repository: Arc<dyn RequestLogRepository>,
    timeout: Option<Duration>,
    failures: Arc<AtomicU64>,
}

impl RequestLogWriter {
    /// 新しいライターを作成
    pub fn new(repository: Arc<dyn RequestLogRepository>, timeout: Option<Duration>) -> Self {
        Self {
            repository,
            timeout,
            failures: Arc::new(AtomicU64::new(0)),
        }
    }

    /// スナップショットを永続化し、採番されたIDを返す
    pub async fn persist(&self, snapshot: Snapshot) -> ServiceResult<i64> {
        let record = snapshot.into_record(Utc::now());
        self.repository.insert(&record).await
    }

    /// スナップショットを永続化する。失敗してもエラーは返さない
    ///
    /// 失敗は `warn` イベントとして出力し、失敗カウンタを進める。
    pub async fn record(&self, snapshot: Snapshot) -> Option<i64> {
        let method = snapshot.method.clone();
        let path = snapshot.path.clone();

        let result = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.persist(snapshot))
                .await
                .unwrap_or_else(|_| {
                    Err(ServiceError::Timeout(format!(
                        "request log write exceeded {}ms",
                        limit.as_millis()
                    )))
                }),
            None => self.persist(snapshot).await,
        };

        match result {
            Ok(id) => {
                trace!(id, method = %method, path = %path, "request log persisted");
                Some(id)
            }
            Err(e) => {
                let total = self.failures.fetch_add(1, Ordering::Relaxed) + 1;
                warn!(
                    method = %method,
                    path = %path,
                    failures = total,
                    "Failed to persist request log: {}",
                    e
                );
                None
            }
        }
    }

    /// これまでに失敗した書き込み件数
    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }
}
