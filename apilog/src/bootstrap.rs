//! サーバー初期化ロジック
//!
//! データベース接続とマイグレーション、リクエストログ関連コンポーネントの組み立てを担当する。

use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::info;

use crate::common::error::ServiceResult;
use crate::config::AppConfig;
use crate::db::migrations::{initialize_database, APP_MIGRATOR, LOG_MIGRATOR};
use crate::db::request_log::RequestLogStorage;
use crate::db::users::UserStorage;
use crate::request_log::{RequestCapture, RequestLogReader, RequestLogWriter};
use crate::AppState;

/// サーバー初期化を実行する
///
/// 業務DBとログDBをそれぞれ開いてマイグレーションを適用し、`AppState` を返す。
pub async fn initialize(config: AppConfig) -> ServiceResult<AppState> {
    info!("apilog v{}", env!("CARGO_PKG_VERSION"));

    let app_pool = initialize_database(&config.database.app_database_url, &APP_MIGRATOR).await?;
    info!(url = %config.database.app_database_url, "Application database ready");

    let log_pool = initialize_database(&config.database.log_database_url, &LOG_MIGRATOR).await?;
    info!(url = %config.database.log_database_url, "Request log database ready");

    Ok(build_state(config, app_pool, log_pool))
}

/// 接続済みプールから `AppState` を組み立てる
///
/// ライターとリーダーは同じログストレージを共有する。
pub fn build_state(config: AppConfig, app_pool: SqlitePool, log_pool: SqlitePool) -> AppState {
    let config = Arc::new(config);
    let log_storage = Arc::new(RequestLogStorage::new(log_pool));

    let writer = RequestLogWriter::new(log_storage.clone(), config.capture.write_timeout);
    let capture = RequestCapture::new(Arc::new(config.capture.clone()), writer);
    let request_log_reader = RequestLogReader::new(log_storage, config.pagination);

    info!(
        excluded = ?config.capture.excluded_prefixes,
        identity_header = %config.capture.identity_header,
        "Request capture configured"
    );

    AppState {
        config,
        users: UserStorage::new(app_pool),
        request_log_reader,
        capture,
    }
}
