//! CLI module for apilog
//!
//! Provides command-line interface for the server.

/// serve サブコマンド
pub mod serve;

use clap::{Parser, Subcommand};

/// apilog - users API with request/response logging
#[derive(Parser, Debug)]
#[command(name = "apilog")]
#[command(version, about, long_about = None)]
#[command(after_help = r#"ENVIRONMENT VARIABLES:
    APILOG_HOST                   Bind address (default: 0.0.0.0)
    APILOG_PORT                   Listen port (default: 8000)
    APILOG_LOG_LEVEL              Log level (default: info)
    APILOG_DATABASE_URL           Users database URL (default: sqlite:data/app.db)
    APILOG_LOG_DATABASE_URL       Request log database URL (default: sqlite:data/request_logs.db)
    APILOG_EXCLUDED_PREFIXES      Comma separated path prefixes that are not logged
    APILOG_IDENTITY_HEADER        Header carrying the caller id (default: x-user-id)
    APILOG_TRUST_FORWARDED_FOR    Use x-forwarded-for / x-real-ip as client host
    APILOG_LOG_WRITE_TIMEOUT_MS   Request log write timeout, 0 disables (default: 5000)
"#)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the API server
    Serve(serve::ServeArgs),
}
