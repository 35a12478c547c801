//! serve サブコマンド
//!
//! APIサーバーを起動します。

use clap::Args;

use crate::config::ServerConfig;

/// serve サブコマンドの引数
///
/// 省略したものは環境変数（`APILOG_HOST` / `APILOG_PORT`）の値を使う。
#[derive(Args, Debug, Clone, Default)]
pub struct ServeArgs {
    /// Listen port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Bind address
    #[arg(short = 'H', long)]
    pub host: Option<String>,
}

impl ServeArgs {
    /// 引数で指定された値でサーバー設定を上書きする
    pub fn apply(&self, server: &mut ServerConfig) {
        if let Some(port) = self.port {
            server.port = port;
        }
        if let Some(ref host) = self.host {
            server.host = host.clone();
        }
    }
}
