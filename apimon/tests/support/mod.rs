//! 共通テストユーティリティ

use apimon::alert::{create_shared_alert_bus, AlertEvent, AlertSink, SharedAlertSink};
use apimon::common::error::AlertError;
use apimon::registry::{MonitorRegistry, RoundMode};
use apimon::shutdown::ShutdownController;
use apimon::AppState;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// 受け取ったイベントを記録するシンク
#[allow(dead_code)]
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<AlertEvent>>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn events(&self) -> Vec<AlertEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn threshold_alerts_for(&self, service: &str) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, AlertEvent::ThresholdExceeded { .. }) && e.service() == service)
            .count()
    }

    pub fn failure_alerts_for(&self, service: &str) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, AlertEvent::ExecutionFailure { .. }) && e.service() == service)
            .count()
    }
}

impl AlertSink for RecordingSink {
    fn record(&self, event: &AlertEvent) -> Result<(), AlertError> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

/// 常に失敗するシンク
#[allow(dead_code)]
pub struct FailingSink;

impl AlertSink for FailingSink {
    fn record(&self, _event: &AlertEvent) -> Result<(), AlertError> {
        Err(AlertError::Webhook("alert backend unavailable".to_string()))
    }
}

/// 指定パスで固定ステータスを返すモックを登録
#[allow(dead_code)]
pub async fn mount_service(server: &MockServer, route: &str, status: u16, delay: Duration) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_delay(delay))
        .mount(server)
        .await;
}

/// テスト用レジストリを作成
#[allow(dead_code)]
pub fn test_registry(sink: SharedAlertSink, timeout: Duration, mode: RoundMode) -> MonitorRegistry {
    MonitorRegistry::new(reqwest::Client::new(), sink, timeout).with_mode(mode)
}

/// テスト用AppStateを作成
#[allow(dead_code)]
pub fn test_state(registry: MonitorRegistry) -> AppState {
    AppState {
        registry,
        alert_bus: create_shared_alert_bus(),
        shutdown: ShutdownController::default(),
    }
}

/// 到達不能なURL（discardポートへの接続は拒否される）
#[allow(dead_code)]
pub const UNREACHABLE_URL: &str = "http://127.0.0.1:9/api";

#[allow(dead_code)]
pub fn recording_sink() -> (Arc<RecordingSink>, SharedAlertSink) {
    let sink = Arc::new(RecordingSink::default());
    let shared: SharedAlertSink = sink.clone();
    (sink, shared)
}
