//! リクエストキャプチャミドルウェア
//!
//! リクエスト本文をバッファしてハンドラーへ再送し、レスポンス本文を読み出して
//! 同じステータス・ヘッダーで再構築する。ストリーミングレスポンスはバッファせずそのまま返す。
//! 除外パスは本文を一切読まずに素通しする。

use async_trait::async_trait;
use axum::{
    body::{Body, Bytes},
    extract::{Request, State},
    http::{header::CONTENT_TYPE, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use http_body::Body as HttpBody;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, trace, warn};

use crate::common::ip;
use crate::config::CaptureConfig;
use crate::request_log::body::{BodyRead, OnceBody};
use crate::request_log::types::{CapturedBody, Snapshot};
use crate::request_log::writer::RequestLogWriter;
use crate::AppState;

/// リクエストを横取りしてレスポンスを返すインターフェース
///
/// HTTPフレームワークごとのミドルウェア登録はこのtraitに合わせて薄く実装する。
#[async_trait]
pub trait Interceptor: Send + Sync {
    /// `next` を呼び出してレスポンスを返す
    async fn intercept(&self, request: Request, next: Next) -> Response;
}

/// リクエスト/レスポンスを記録するインターセプター
#[derive(Clone)]
pub struct RequestCapture {
    config: Arc<CaptureConfig>,
    writer: RequestLogWriter,
}

impl RequestCapture {
    /// 新しいキャプチャを作成
    pub fn new(config: Arc<CaptureConfig>, writer: RequestLogWriter) -> Self {
        Self { config, writer }
    }

    /// ログライター
    pub fn writer(&self) -> &RequestLogWriter {
        &self.writer
    }

    /// レスポンス本文を読み出して再構築する
    ///
    /// ストリーミングの場合は読み出さずにセンチネルを返す。HEADレスポンスと
    /// 上限を超える本文はクライアントへそのまま流し、本文は記録しない。
    async fn materialize(
        &self,
        response: Response,
        method: &str,
        path: &str,
        is_head: bool,
    ) -> (Response, CapturedBody) {
        // HEADの本文はクライアントに送られない
        if is_head {
            return (response, CapturedBody::Omitted);
        }
        if is_streaming(&response) {
            return (response, CapturedBody::Streaming);
        }

        let limit = self.config.max_body_bytes;
        if HttpBody::size_hint(response.body())
            .exact()
            .is_some_and(|len| len > limit as u64)
        {
            debug!(method = %method, path = %path, limit, "Response body exceeds capture limit, not recorded");
            return (response, CapturedBody::Omitted);
        }

        let (parts, body) = response.into_parts();
        match OnceBody::new(body).read_once().await {
            Ok(bytes) => {
                let rebuilt = Response::from_parts(parts, Body::from(bytes.clone()));
                (rebuilt, CapturedBody::Buffered(bytes))
            }
            Err(e) => {
                warn!(method = %method, path = %path, "Failed to drain response body: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR.into_response(),
                    CapturedBody::Buffered(Bytes::new()),
                )
            }
        }
    }
}

/// レスポンスがストリーミングか判定する
///
/// 本文サイズが確定していない、または `text/event-stream` の場合はストリーミングとみなす。
pub fn is_streaming(response: &Response) -> bool {
    let event_stream = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("text/event-stream"));

    event_stream || HttpBody::size_hint(response.body()).exact().is_none()
}

#[async_trait]
impl Interceptor for RequestCapture {
    async fn intercept(&self, request: Request, next: Next) -> Response {
        // 除外判定は本文に触れる前に行う
        if self.config.is_excluded(request.uri().path()) {
            return next.run(request).await;
        }

        let start = Instant::now();
        let is_head = *request.method() == Method::HEAD;
        let method = request.method().to_string();
        let path = request.uri().path().to_string();
        let query_string = request.uri().query().unwrap_or_default().to_string();
        // 値はそのまま使う。UTF-8として読めないものだけ捨てる
        let user_id = request
            .headers()
            .get(self.config.identity_header.as_str())
            .and_then(|v| String::from_utf8(v.as_bytes().to_vec()).ok());
        let client_host = ip::client_host(&request, self.config.trust_forwarded_for);

        let (parts, body) = request.into_parts();
        let mut request_body = OnceBody::new(body);
        let (request_bytes, response) =
            match request_body.read_limited(self.config.max_body_bytes).await {
                Ok(BodyRead::Complete(bytes)) => {
                    let replay = Request::from_parts(parts, Body::from(bytes.clone()));
                    (bytes, next.run(replay).await)
                }
                Ok(BodyRead::Oversized(body)) => {
                    debug!(method = %method, path = %path, "Request body exceeds capture limit, not recorded");
                    (Bytes::new(), next.run(Request::from_parts(parts, body)).await)
                }
                Err(e) => {
                    warn!(method = %method, path = %path, "Failed to read request body: {}", e);
                    (
                        Bytes::new(),
                        (StatusCode::BAD_REQUEST, "Failed to read request body").into_response(),
                    )
                }
            };

        let (response, response_body) = self.materialize(response, &method, &path, is_head).await;
        let duration = start.elapsed();
        let status_code = response.status().as_u16();

        trace!(
            method = %method,
            path = %path,
            status = status_code,
            duration_ms = duration.as_secs_f64() * 1000.0,
            "request captured"
        );

        self.writer
            .record(Snapshot {
                method,
                path,
                query_string,
                request_body: request_bytes,
                response_body,
                status_code,
                duration,
                user_id,
                client_host,
            })
            .await;

        response
    }
}

/// axumミドルウェアとしての登録口
pub async fn capture_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    state.capture.intercept(request, next).await
}
