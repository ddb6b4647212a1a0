//! モニター初期化ロジック
//!
//! HTTPクライアント・アラートシンク・レジストリ・定期スケジューラなど
//! サーバー起動に必要なコンポーネントの初期化を担当する。

use crate::alert::{
    create_shared_alert_bus, CompositeAlertSink, SharedAlertBus, SharedAlertSink,
    TracingAlertSink, WebhookAlertSink,
};
use crate::common::error::{CommonError, CommonResult, MonitorResult};
use crate::common::types::duration_millis;
use crate::config::{load_services, MonitorConfig};
use crate::health::IntervalScheduler;
use crate::registry::MonitorRegistry;
use crate::shutdown::ShutdownController;
use crate::AppState;
use reqwest::Client;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

/// Webhook送信のタイムアウト
const WEBHOOK_TIMEOUT_SECS: u64 = 5;

/// 初期化結果
pub struct InitContext {
    /// アプリケーション状態
    pub state: AppState,
    /// 定期スケジューラのタスク（無効時は空）
    pub scheduler_handles: Vec<JoinHandle<()>>,
}

/// チェック用HTTPクライアントを作成
pub fn build_http_client() -> CommonResult<Client> {
    Client::builder()
        .user_agent(concat!("apimon/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| CommonError::Config(format!("failed to build HTTP client: {}", e)))
}

/// アラートシンクを構築
///
/// 常にtracingとイベントバスへ配送し、Webhookが設定されていればそれにも配送する。
pub fn build_alert_sink(config: &MonitorConfig, bus: &SharedAlertBus) -> CommonResult<SharedAlertSink> {
    let mut sink = CompositeAlertSink::new()
        .with(Arc::new(TracingAlertSink))
        .with(bus.clone());

    if let Some(url) = &config.alert_webhook_url {
        let webhook =
            WebhookAlertSink::new(url, std::time::Duration::from_secs(WEBHOOK_TIMEOUT_SECS))?;
        info!(url = %webhook.url(), "Alert webhook enabled");
        sink = sink.with(Arc::new(webhook));
    }

    Ok(Arc::new(sink))
}

/// 設定からレジストリを構築し、サービスを登録する
pub async fn build_registry(
    config: &MonitorConfig,
    sink: SharedAlertSink,
) -> MonitorResult<MonitorRegistry> {
    let services = load_services(config.config_path.as_deref())?;
    let registry = MonitorRegistry::new(build_http_client()?, sink, config.request_timeout)
        .with_mode(config.round_mode);

    let count = registry.register_all(services).await?;
    info!(
        services = count,
        mode = %registry.mode(),
        timeout_ms = duration_millis(config.request_timeout),
        "Monitor registry initialized"
    );

    Ok(registry)
}

/// サーバー初期化を実行する
pub async fn initialize(config: MonitorConfig) -> MonitorResult<InitContext> {
    let alert_bus = create_shared_alert_bus();
    let sink = build_alert_sink(&config, &alert_bus)?;
    let registry = build_registry(&config, sink).await?;
    let shutdown = ShutdownController::default();

    let scheduler_handles = if config.scheduler_enabled {
        IntervalScheduler::new(registry.clone(), shutdown.clone())
            .start()
            .await
    } else {
        Vec::new()
    };

    Ok(InitContext {
        state: AppState {
            registry,
            alert_bus,
            shutdown,
        },
        scheduler_handles,
    })
}
