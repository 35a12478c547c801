//! データベース初期化とマイグレーション実行

use crate::common::error::{ServiceError, ServiceResult};
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode};
use sqlx::SqlitePool;
use std::str::FromStr;

/// 業務データ（users）用マイグレーション
pub static APP_MIGRATOR: Migrator = sqlx::migrate!("./migrations/app");

/// リクエストログ用マイグレーション
pub static LOG_MIGRATOR: Migrator = sqlx::migrate!("./migrations/logs");

/// SQLiteファイルの親ディレクトリを作成する
///
/// `sqlite::memory:` のような特殊指定は何もしない。
fn ensure_parent_dir(database_url: &str) -> ServiceResult<()> {
    let Some(path) = database_url.strip_prefix("sqlite:") else {
        return Ok(());
    };
    if path.starts_with(':') {
        return Ok(());
    }
    // `sqlite://` 形式に備えてスラッシュを除去し、クエリ部分を除外
    let normalized = path.trim_start_matches("//");
    let path_without_params = normalized.split('?').next().unwrap_or(normalized);
    if let Some(parent) = std::path::Path::new(path_without_params).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ServiceError::Database(format!(
                    "Failed to create database directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }
    Ok(())
}

/// SQLite接続プールを作成してマイグレーションを実行
///
/// # Arguments
/// * `database_url` - データベースURL（例: "sqlite:data/request_logs.db"）
/// * `migrator` - 適用するマイグレーション
pub async fn initialize_database(
    database_url: &str,
    migrator: &Migrator,
) -> ServiceResult<SqlitePool> {
    ensure_parent_dir(database_url)?;

    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| ServiceError::Database(format!("Invalid database URL: {}", e)))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal);

    let pool = SqlitePool::connect_with(options)
        .await
        .map_err(|e| ServiceError::Database(format!("Failed to connect to database: {}", e)))?;

    run_migrations(&pool, migrator).await?;

    Ok(pool)
}

/// マイグレーションを実行
pub async fn run_migrations(pool: &SqlitePool, migrator: &Migrator) -> ServiceResult<()> {
    tracing::info!("Running database migrations");

    migrator
        .run(pool)
        .await
        .map_err(|e| ServiceError::Database(format!("Failed to run migrations: {}", e)))?;

    tracing::info!("Database migrations completed successfully");
    Ok(())
}
