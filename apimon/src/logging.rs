//! ロギング初期化
//!
//! 標準エラー出力には人間向けフォーマット、`APIMON_LOG_DIR`が設定されていれば
//! 日次ローテーションのJSONファイルにも出力する。

use crate::config::get_env_with_fallback;
use tracing_appender::rolling;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// ログファイル名のプレフィックス
const LOG_FILE_PREFIX: &str = "apimon.log";

/// ログレベルのデフォルト
const DEFAULT_LOG_FILTER: &str = "info";

/// tracing サブスクライバーを初期化する
///
/// フィルタは `APIMON_LOG_LEVEL`（旧: `LOG_LEVEL`）、未設定なら `RUST_LOG`、
/// どちらもなければ `info`。
pub fn init() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = build_filter()?;

    let stderr_layer = fmt::layer().with_writer(std::io::stderr);

    let file_layer = match get_env_with_fallback("APIMON_LOG_DIR", "LOG_DIR") {
        Some(dir) => {
            std::fs::create_dir_all(&dir)?;
            Some(
                fmt::layer()
                    .with_writer(rolling::daily(dir, LOG_FILE_PREFIX))
                    .with_ansi(false)
                    .json(),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()?;

    Ok(())
}

fn build_filter() -> Result<EnvFilter, Box<dyn std::error::Error + Send + Sync>> {
    match get_env_with_fallback("APIMON_LOG_LEVEL", "LOG_LEVEL") {
        Some(level) => Ok(EnvFilter::try_new(level)?),
        None => Ok(EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))),
    }
}
