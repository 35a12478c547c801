//! apilog Server
//!
//! ユーザーCRUD APIと、全リクエストを記録するリクエストログ基盤

#![warn(missing_docs)]

/// 共通型定義（エラー・IPユーティリティ）
pub mod common;

/// REST APIハンドラー
pub mod api;

/// サーバー初期化
pub mod bootstrap;

/// CLIインターフェース
pub mod cli;

/// 設定管理（環境変数ヘルパー）
pub mod config;

/// データベースアクセス
pub mod db;

/// ロギング初期化ユーティリティ
pub mod logging;

/// リクエストログ（キャプチャ・書き込み・閲覧）
pub mod request_log;

/// HTTPサーバー起動
pub mod server;

/// アプリケーション状態
#[derive(Clone)]
pub struct AppState {
    /// 起動時に確定した設定
    pub config: std::sync::Arc<config::AppConfig>,
    /// ユーザーストレージ
    pub users: db::users::UserStorage,
    /// リクエストログリーダー
    pub request_log_reader: request_log::RequestLogReader,
    /// リクエストキャプチャ
    pub capture: request_log::RequestCapture,
}
