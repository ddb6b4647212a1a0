//! check サブコマンド
//!
//! 監視ラウンドを1回だけ実行し、結果をJSONで標準出力に出す。

use crate::alert::create_shared_alert_bus;
use crate::bootstrap;
use crate::config::MonitorConfig;
use crate::registry::RoundMode;
use clap::Args;
use std::path::PathBuf;

/// check サブコマンドの引数
#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    /// Service config file (YAML or JSON)
    #[arg(short, long, env = "APIMON_CONFIG")]
    pub config: Option<PathBuf>,

    /// Check services one at a time in registration order
    #[arg(long, default_value_t = false)]
    pub sequential: bool,
}

/// check サブコマンドを実行
///
/// 全サービスのチェックが完了した場合は`true`を返す。
pub async fn execute(args: &CheckArgs) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
    let mut config = MonitorConfig::from_env();
    if let Some(path) = &args.config {
        config.config_path = Some(path.clone());
    }
    if args.sequential {
        config.round_mode = RoundMode::Sequential;
    }

    let bus = create_shared_alert_bus();
    let sink = bootstrap::build_alert_sink(&config, &bus)?;
    let registry = bootstrap::build_registry(&config, sink).await?;

    let results = registry.run_round().await?;
    println!("{}", serde_json::to_string_pretty(&results)?);

    Ok(results.iter().all(|result| !result.is_failure()))
}
