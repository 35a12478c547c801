//! データベースアクセス層
//!
//! SQLiteベースのデータ永続化。業務データとリクエストログは別のデータベースに置く。

/// データベース初期化・マイグレーション
pub mod migrations;

/// リクエストログストレージ
pub mod request_log;

/// Repository traitパターン（テスタビリティ向上）
pub mod traits;

/// ユーザー管理
pub mod users;
