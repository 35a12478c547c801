//! リクエストログのページ読み出し
//!
//! 全ページ表示用と、同じページの行だけを返す部分更新用の二つの形を提供する。
//! どちらも同じ並び順（created_at DESC, id DESC）とページ計算を使う。

use serde::Serialize;
use std::sync::Arc;

use crate::common::error::{ServiceError, ServiceResult};
use crate::config::PaginationConfig;
use crate::db::traits::RequestLogRepository;
use crate::request_log::types::RequestLog;

/// 検証済みのページ指定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    per_page: u32,
}

impl PageRequest {
    /// ページ指定を検証する（page >= 1, 1 <= per_page <= max_per_page）
    pub fn new(page: u32, per_page: u32, max_per_page: u32) -> ServiceResult<Self> {
        if page < 1 {
            return Err(ServiceError::Validation(
                "page must be at least 1".to_string(),
            ));
        }
        if per_page < 1 {
            return Err(ServiceError::Validation(
                "per_page must be at least 1".to_string(),
            ));
        }
        if per_page > max_per_page {
            return Err(ServiceError::Validation(format!(
                "per_page must be at most {}",
                max_per_page
            )));
        }
        Ok(Self { page, per_page })
    }

    /// ページ番号（1始まり）
    pub fn page(&self) -> u32 {
        self.page
    }

    /// 1ページあたりの件数
    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.per_page)
    }
}

/// ページネーション情報
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    /// 総件数
    pub total: u64,
    /// 総ページ数（0件でも1）
    pub total_pages: u32,
    /// 現在のページ番号
    pub page: u32,
    /// 1ページあたりの件数
    pub per_page: u32,
}

impl Pagination {
    /// 総件数からページ情報を計算する。範囲外のページは `PageOutOfRange`
    pub fn compute(total: u64, request: PageRequest) -> ServiceResult<Self> {
        let pages = total.div_ceil(u64::from(request.per_page)).max(1);
        let total_pages = u32::try_from(pages).unwrap_or(u32::MAX);

        if request.page > total_pages {
            return Err(ServiceError::PageOutOfRange {
                page: request.page,
                total_pages,
            });
        }

        Ok(Self {
            total,
            total_pages,
            page: request.page,
            per_page: request.per_page,
        })
    }

    /// 次のページがあるか
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// 前のページがあるか
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }
}

/// 1ページ分のログ
#[derive(Debug, Clone, PartialEq)]
pub struct RequestLogPage {
    /// ログ（新しい順）
    pub items: Vec<RequestLog>,
    /// ページ情報
    pub pagination: Pagination,
}

/// リクエストログリーダー
#[derive(Clone)]
pub struct RequestLogReader {
    repository: Arc<dyn RequestLogRepository>,
    config: PaginationConfig,
}

impl RequestLogReader {
    /// 新しいリーダーを作成
    pub fn new(repository: Arc<dyn RequestLogRepository>, config: PaginationConfig) -> Self {
        Self { repository, config }
    }

    /// ページネーション設定
    pub fn config(&self) -> PaginationConfig {
        self.config
    }

    /// 全ページ表示用: レコードとページ情報を返す
    pub async fn list_page(&self, page: u32, per_page: u32) -> ServiceResult<RequestLogPage> {
        let request = PageRequest::new(page, per_page, self.config.max_per_page)?;
        let (total, items) = self
            .repository
            .fetch_page_with_total(request.per_page(), request.offset())
            .await?;
        let pagination = Pagination::compute(total, request)?;

        Ok(RequestLogPage { items, pagination })
    }

    /// 部分更新用: 同じページの行だけを返す
    pub async fn list_rows(&self, page: u32, per_page: u32) -> ServiceResult<Vec<RequestLog>> {
        Ok(self.list_page(page, per_page).await?.items)
    }
}
