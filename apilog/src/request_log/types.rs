//! リクエストログの型定義

use axum::body::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// ストリーミングレスポンスの本文の代わりに記録する値
pub const STREAMING_BODY_SENTINEL: &str = "[Streaming Response]";

/// 永続化済みのリクエストログ（1 HTTPトランザクション = 1件）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestLog {
    /// ストアが採番するID（挿入順に単調増加）
    pub id: i64,
    /// 書き込み時刻（UTC）
    pub created_at: DateTime<Utc>,
    /// HTTPメソッド
    pub method: String,
    /// リクエストパス
    pub path: String,
    /// 生のクエリ文字列（なければ空文字）
    pub query_string: String,
    /// リクエスト本文（空またはデコード不能なら `None`）
    pub request_body: Option<String>,
    /// レスポンス本文（ストリーミング時は [`STREAMING_BODY_SENTINEL`]）
    pub response_body: Option<String>,
    /// クライアントに返したステータスコード
    pub status_code: u16,
    /// 処理時間（ミリ秒）
    pub duration_ms: f64,
    /// 呼び出し元ユーザーID
    pub user_id: Option<String>,
    /// 呼び出し元ホスト
    pub client_host: Option<String>,
}

/// 挿入前のリクエストログ（IDはストアが採番する）
#[derive(Debug, Clone, PartialEq)]
pub struct NewRequestLog {
    /// 書き込み時刻（UTC）
    pub created_at: DateTime<Utc>,
    /// HTTPメソッド
    pub method: String,
    /// リクエストパス
    pub path: String,
    /// 生のクエリ文字列
    pub query_string: String,
    /// デコード済みリクエスト本文
    pub request_body: Option<String>,
    /// デコード済みレスポンス本文
    pub response_body: Option<String>,
    /// ステータスコード
    pub status_code: u16,
    /// 処理時間（ミリ秒）
    pub duration_ms: f64,
    /// 呼び出し元ユーザーID
    pub user_id: Option<String>,
    /// 呼び出し元ホスト
    pub client_host: Option<String>,
}

/// キャプチャしたレスポンス本文
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapturedBody {
    /// 全量をバッファ済み
    Buffered(Bytes),
    /// ストリーミングのためバッファしていない
    Streaming,
    /// 記録しない（HEADレスポンス、上限超過）
    Omitted,
}

/// 1トランザクション分のキャプチャ結果（永続化前）
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// HTTPメソッド
    pub method: String,
    /// リクエストパス
    pub path: String,
    /// 生のクエリ文字列
    pub query_string: String,
    /// バッファ済みリクエスト本文
    pub request_body: Bytes,
    /// レスポンス本文（またはストリーミング印）
    pub response_body: CapturedBody,
    /// クライアントに返したステータスコード
    pub status_code: u16,
    /// 受信からレスポンス確定までの経過時間
    pub duration: Duration,
    /// 呼び出し元ユーザーID
    pub user_id: Option<String>,
    /// 呼び出し元ホスト
    pub client_host: Option<String>,
}

impl Snapshot {
    /// 書き込み時刻を付与して挿入用レコードに変換する
    pub fn into_record(self, created_at: DateTime<Utc>) -> NewRequestLog {
        let response_body = match &self.response_body {
            CapturedBody::Buffered(bytes) => decode_body(bytes),
            CapturedBody::Streaming => Some(STREAMING_BODY_SENTINEL.to_string()),
            CapturedBody::Omitted => None,
        };

        NewRequestLog {
            created_at,
            request_body: decode_body(&self.request_body),
            response_body,
            method: self.method,
            path: self.path,
            query_string: self.query_string,
            status_code: self.status_code,
            duration_ms: self.duration.as_secs_f64() * 1000.0,
            user_id: self.user_id,
            client_host: self.client_host,
        }
    }
}

/// 本文をテキストとしてデコードする
///
/// 空なら `None`。UTF-8として不正なバイト列も `None` とし、リクエスト自体は継続させる。
pub fn decode_body(bytes: &[u8]) -> Option<String> {
    if bytes.is_empty() {
        return None;
    }
    match std::str::from_utf8(bytes) {
        Ok(text) => Some(text.to_string()),
        Err(e) => {
            tracing::debug!(len = bytes.len(), error = %e, "body is not valid UTF-8, not recorded");
            None
        }
    }
}
