//! Configuration management via environment variables
//!
//! `AppConfig` is built once at process start and passed into the capture
//! layer, the writer and the reader. Nothing reads the environment after that.

use std::time::Duration;

/// Get an environment variable with fallback to a deprecated name
///
/// If the new variable name is set, returns its value.
/// If only the old (deprecated) variable name is set, returns its value
/// and logs a deprecation warning.
pub fn get_env_with_fallback(new_name: &str, old_name: &str) -> Option<String> {
    if let Ok(val) = std::env::var(new_name) {
        return Some(val);
    }
    if let Ok(val) = std::env::var(old_name) {
        tracing::warn!(
            "Environment variable '{}' is deprecated, use '{}' instead",
            old_name,
            new_name
        );
        return Some(val);
    }
    None
}

/// Get an environment variable with fallback and default value
pub fn get_env_with_fallback_or(new_name: &str, old_name: &str, default: &str) -> String {
    get_env_with_fallback(new_name, old_name).unwrap_or_else(|| default.to_string())
}

/// Get an environment variable with fallback, parsing to a specific type
///
/// Returns `default` if neither variable is set or parsing fails.
pub fn get_env_with_fallback_parse<T: std::str::FromStr>(
    new_name: &str,
    old_name: &str,
    default: T,
) -> T {
    get_env_with_fallback(new_name, old_name)
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// キャプチャ対象外のデフォルトパス接頭辞
///
/// 管理画面のログ閲覧APIを記録すると再帰的にログが増えるため必ず除外する。
pub const DEFAULT_EXCLUDED_PREFIXES: &[&str] =
    &["/admin/logs", "/docs", "/redoc", "/openapi.json", "/health"];

/// 呼び出し元ユーザーIDを運ぶヘッダー名のデフォルト
pub const DEFAULT_IDENTITY_HEADER: &str = "x-user-id";

/// ログ書き込みタイムアウトのデフォルト（ミリ秒）
pub const DEFAULT_WRITE_TIMEOUT_MS: u64 = 5_000;

/// 記録する本文サイズ上限のデフォルト（axumの `DefaultBodyLimit` と同じ2MB）
pub const DEFAULT_MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// HTTPサーバー設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// バインドアドレス
    pub host: String,
    /// 待ち受けポート
    pub port: u16,
}

impl ServerConfig {
    /// Load server configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: get_env_with_fallback_or("APILOG_HOST", "HOST", "0.0.0.0"),
            port: get_env_with_fallback_parse("APILOG_PORT", "PORT", 8000),
        }
    }

    /// `host:port` 形式のバインドアドレス
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// データベース接続設定
///
/// リクエストログは業務テーブルとは別のデータベースに保存する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// 業務データ（users）のデータベースURL
    pub app_database_url: String,
    /// リクエストログのデータベースURL
    pub log_database_url: String,
}

impl DatabaseConfig {
    /// Load database configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            app_database_url: get_env_with_fallback_or(
                "APILOG_DATABASE_URL",
                "DATABASE_URL",
                "sqlite:data/app.db",
            ),
            log_database_url: get_env_with_fallback_or(
                "APILOG_LOG_DATABASE_URL",
                "LOG_DATABASE_URL",
                "sqlite:data/request_logs.db",
            ),
        }
    }
}

/// リクエストキャプチャ設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureConfig {
    /// キャプチャを行わないパス接頭辞
    pub excluded_prefixes: Vec<String>,
    /// ユーザーIDを読み取るヘッダー名（小文字）
    pub identity_header: String,
    /// x-forwarded-for / x-real-ip を信頼するか
    pub trust_forwarded_for: bool,
    /// ログ書き込みのタイムアウト（`None` は無制限）
    pub write_timeout: Option<Duration>,
    /// 記録する本文の上限（超えた本文は記録せずにそのまま流す）
    pub max_body_bytes: usize,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            excluded_prefixes: DEFAULT_EXCLUDED_PREFIXES
                .iter()
                .map(|p| p.to_string())
                .collect(),
            identity_header: DEFAULT_IDENTITY_HEADER.to_string(),
            trust_forwarded_for: false,
            write_timeout: Some(Duration::from_millis(DEFAULT_WRITE_TIMEOUT_MS)),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl CaptureConfig {
    /// Load capture configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let excluded_prefixes = get_env_with_fallback(
            "APILOG_EXCLUDED_PREFIXES",
            "EXCLUDED_PREFIXES",
        )
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or(defaults.excluded_prefixes);

        let identity_header = get_env_with_fallback_or(
            "APILOG_IDENTITY_HEADER",
            "IDENTITY_HEADER",
            DEFAULT_IDENTITY_HEADER,
        )
        .to_ascii_lowercase();

        let trust_forwarded_for =
            get_env_with_fallback("APILOG_TRUST_FORWARDED_FOR", "TRUST_FORWARDED_FOR")
                .map(|v| parse_bool(&v))
                .unwrap_or(false);

        let timeout_ms = get_env_with_fallback_parse(
            "APILOG_LOG_WRITE_TIMEOUT_MS",
            "LOG_WRITE_TIMEOUT_MS",
            DEFAULT_WRITE_TIMEOUT_MS,
        );

        let max_body_bytes = get_env_with_fallback_parse(
            "APILOG_MAX_LOGGED_BODY_BYTES",
            "MAX_LOGGED_BODY_BYTES",
            DEFAULT_MAX_BODY_BYTES,
        );

        Self {
            excluded_prefixes,
            identity_header,
            trust_forwarded_for,
            write_timeout: (timeout_ms > 0).then(|| Duration::from_millis(timeout_ms)),
            max_body_bytes,
        }
    }

    /// パスが除外対象か判定する（生のパスに対する接頭辞一致）
    pub fn is_excluded(&self, path: &str) -> bool {
        self.excluded_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }
}

/// ログ閲覧APIのページネーション設定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationConfig {
    /// `per_page` 省略時の件数
    pub default_per_page: u32,
    /// `per_page` の上限
    pub max_per_page: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_per_page: 10,
            max_per_page: 100,
        }
    }
}

/// アプリケーション全体の設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// HTTPサーバー
    pub server: ServerConfig,
    /// データベース
    pub database: DatabaseConfig,
    /// リクエストキャプチャ
    pub capture: CaptureConfig,
    /// ページネーション
    pub pagination: PaginationConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
            },
            database: DatabaseConfig {
                app_database_url: "sqlite:data/app.db".to_string(),
                log_database_url: "sqlite:data/request_logs.db".to_string(),
            },
            capture: CaptureConfig::default(),
            pagination: PaginationConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load the full configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig::from_env(),
            database: DatabaseConfig::from_env(),
            capture: CaptureConfig::from_env(),
            pagination: PaginationConfig::default(),
        }
    }
}
