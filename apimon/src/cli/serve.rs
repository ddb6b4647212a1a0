//! serve サブコマンド
//!
//! 監視サーバーを起動します。

use clap::Args;
use std::path::PathBuf;

/// serve サブコマンドの引数
#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Listen port
    #[arg(short, long, default_value = "3000", env = "APIMON_PORT")]
    pub port: u16,

    /// Bind address
    #[arg(short = 'H', long, default_value = "0.0.0.0", env = "APIMON_HOST")]
    pub host: String,

    /// Service config file (YAML or JSON)
    #[arg(short, long, env = "APIMON_CONFIG")]
    pub config: Option<PathBuf>,
}
