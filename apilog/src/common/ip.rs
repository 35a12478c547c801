//! IPアドレス正規化ユーティリティ
//!
//! IPv4-mapped IPv6アドレスをIPv4に正規化し、リクエストから呼び出し元ホストを取り出す

use axum::{extract::ConnectInfo, http::Request};
use std::net::{IpAddr, SocketAddr};

/// IPアドレスを正規化する
///
/// IPv4-mapped IPv6（::ffff:x.x.x.x）をIPv4に変換。
/// それ以外はそのまま返す。
pub fn normalize_ip(addr: IpAddr) -> IpAddr {
    match addr {
        IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
            Some(v4) => IpAddr::V4(v4),
            None => IpAddr::V6(v6),
        },
        v4 => v4,
    }
}

/// プロキシヘッダー（x-forwarded-for / x-real-ip）の先頭エントリを取り出す
pub fn forwarded_host<B>(request: &Request<B>) -> Option<String> {
    request
        .headers()
        .get("x-forwarded-for")
        .or_else(|| request.headers().get("x-real-ip"))
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// リクエストから呼び出し元ホストを取得する
///
/// `trust_forwarded_for` が有効な場合はプロキシヘッダーを優先し、
/// それ以外は接続元ソケット（`ConnectInfo`）のアドレスを使う。
pub fn client_host<B>(request: &Request<B>, trust_forwarded_for: bool) -> Option<String> {
    if trust_forwarded_for {
        if let Some(host) = forwarded_host(request) {
            return Some(host);
        }
    }
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| normalize_ip(addr.ip()).to_string())
}
