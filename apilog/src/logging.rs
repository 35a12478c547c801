//! ロギング初期化ユーティリティ

use crate::config::get_env_with_fallback;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// ログレベル未指定時のフィルタ
const DEFAULT_FILTER: &str = "info";

/// 環境変数からフィルタ文字列を決定する
///
/// `APILOG_LOG_LEVEL`（旧: `RUST_LOG`）を優先し、未設定なら `info`。
fn filter_directive() -> String {
    get_env_with_fallback("APILOG_LOG_LEVEL", "RUST_LOG")
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_FILTER.to_string())
}

/// tracingサブスクライバーを初期化する
///
/// プロセス起動時に一度だけ呼び出す。二重初期化はエラーを返す。
pub fn init() -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(filter_directive())
        .or_else(|_| EnvFilter::try_new(DEFAULT_FILTER))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .try_init()?;

    Ok(())
}
