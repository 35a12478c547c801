//! 一度だけ読み出せる本文バッファ
//!
//! HTTP本文の読み出しは破壊的なので、読み出しを明示的な一回限りの操作にして
//! 呼び出し側にバッファ＆リプレイを強制する。

use axum::body::{Body, Bytes};
use futures::{stream, StreamExt};
use thiserror::Error;

/// 本文読み出しエラー
#[derive(Debug, Error)]
pub enum BodyError {
    /// 既に読み出し済み
    #[error("body already consumed")]
    AlreadyConsumed,

    /// 転送路からの読み出しに失敗
    #[error("failed to read body: {0}")]
    Read(String),
}

/// 上限付き読み出しの結果
#[derive(Debug)]
pub enum BodyRead {
    /// 上限内で全量を読み出した
    Complete(Bytes),
    /// 上限を超えた。読み出し済みの先頭と残りをつないだ本文を返す
    Oversized(Body),
}

/// 所有権を持つ一回読み出し専用の本文
#[derive(Debug)]
pub struct OnceBody {
    body: Option<Body>,
}

impl OnceBody {
    /// 本文をラップする
    pub fn new(body: Body) -> Self {
        Self { body: Some(body) }
    }

    /// 既に読み出されたか
    pub fn is_consumed(&self) -> bool {
        self.body.is_none()
    }

    /// 本文を全て読み出す。二回目以降は [`BodyError::AlreadyConsumed`]
    pub async fn read_once(&mut self) -> Result<Bytes, BodyError> {
        let body = self.body.take().ok_or(BodyError::AlreadyConsumed)?;
        axum::body::to_bytes(body, usize::MAX)
            .await
            .map_err(|e| BodyError::Read(e.to_string()))
    }

    /// `limit` バイトまで読み出す
    ///
    /// 上限を超えた時点で読み出しを止め、読み出し済みのチャンクと未読の残りを
    /// 同じ順序でつないだ本文を [`BodyRead::Oversized`] として返す。
    pub async fn read_limited(&mut self, limit: usize) -> Result<BodyRead, BodyError> {
        let body = self.body.take().ok_or(BodyError::AlreadyConsumed)?;
        let mut data = body.into_data_stream();
        let mut chunks: Vec<Bytes> = Vec::new();
        let mut len = 0usize;

        while let Some(chunk) = data.next().await {
            let chunk = chunk.map_err(|e| BodyError::Read(e.to_string()))?;
            len += chunk.len();
            chunks.push(chunk);
            if len > limit {
                let head = stream::iter(chunks.into_iter().map(Ok::<_, axum::Error>));
                return Ok(BodyRead::Oversized(Body::from_stream(head.chain(data))));
            }
        }

        if chunks.len() == 1 {
            return Ok(BodyRead::Complete(chunks.remove(0)));
        }
        let mut buf = Vec::with_capacity(len);
        for chunk in &chunks {
            buf.extend_from_slice(chunk);
        }
        Ok(BodyRead::Complete(Bytes::from(buf)))
    }
}
