//! 共通型定義

/// エラー型
pub mod error;

/// クライアントアドレスの正規化・抽出
pub mod ip;
