//! リクエストログ
//!
//! HTTPトランザクションを1件ずつキャプチャし、ログ用データベースに記録して
//! 管理画面からページ単位で閲覧できるようにする。

/// 一回読み出し専用の本文
pub mod body;

/// キャプチャミドルウェア
pub mod middleware;

/// ページ読み出し
pub mod reader;

/// 型定義
pub mod types;

/// 永続化
pub mod writer;

pub use middleware::{capture_middleware, Interceptor, RequestCapture};
pub use reader::{PageRequest, Pagination, RequestLogPage, RequestLogReader};
pub use types::{RequestLog, STREAMING_BODY_SENTINEL};
pub use writer::RequestLogWriter;
