//! Repository traitパターン定義
//!
//! ログストアへの操作を抽象化し、ライター・リーダーを差し替え可能にする。

use async_trait::async_trait;

use crate::common::error::ServiceResult;
use crate::request_log::types::{NewRequestLog, RequestLog};

/// リクエストログストアのRepository trait
///
/// 実装は同時に複数の独立した書き込みを受け付けられること（グローバルロック不可）。
#[async_trait]
pub trait RequestLogRepository: Send + Sync {
    /// 1件を独立したトランザクションで追加し、採番されたIDを返す
    async fn insert(&self, record: &NewRequestLog) -> ServiceResult<i64>;
    /// 総件数を取得
    async fn count(&self) -> ServiceResult<u64>;
    /// 新しい順（created_at DESC, id DESC）に `limit` 件を `offset` から取得
    async fn fetch_page(&self, limit: u32, offset: u64) -> ServiceResult<Vec<RequestLog>>;

    /// 総件数と1ページ分を同じスナップショットから取得
    ///
    /// 既定実装は `count` と `fetch_page` を順に呼ぶだけで、間の書き込みは防げない。
    /// 読み取りトランザクションを持つストアは上書きすること。
    async fn fetch_page_with_total(
        &self,
        limit: u32,
        offset: u64,
    ) -> ServiceResult<(u64, Vec<RequestLog>)> {
        let total = self.count().await?;
        let items = self.fetch_page(limit, offset).await?;
        Ok((total, items))
    }
}
