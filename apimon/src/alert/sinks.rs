//! アラートシンク実装

use super::{AlertEvent, AlertSink, SharedAlertSink};
use crate::common::error::{AlertError, CommonError, CommonResult};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

/// tracingへアラートを出力するシンク
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAlertSink;

impl AlertSink for TracingAlertSink {
    fn record(&self, event: &AlertEvent) -> Result<(), AlertError> {
        match event {
            AlertEvent::ThresholdExceeded {
                service,
                url,
                latency_ms,
                threshold_ms,
                status,
                ..
            } => warn!(
                service = %service,
                url = %url,
                latency_ms = latency_ms,
                threshold_ms = threshold_ms,
                status = status,
                "{}",
                event.message()
            ),
            AlertEvent::ExecutionFailure {
                service,
                url,
                error,
                ..
            } => warn!(
                service = %service,
                url = %url,
                error = %error,
                "{}",
                event.message()
            ),
        }
        Ok(())
    }
}

/// Webhookへイベントを POST するシンク
///
/// 送信はバックグラウンドタスクで行い、`record`は即座に戻る。
#[derive(Clone)]
pub struct WebhookAlertSink {
    client: Client,
    url: String,
}

impl WebhookAlertSink {
    /// 新しいWebhookシンクを作成
    pub fn new(url: impl Into<String>, timeout: Duration) -> CommonResult<Self> {
        let url = url.into();
        reqwest::Url::parse(&url).map_err(|e| {
            CommonError::Config(format!("invalid alert webhook url '{}': {}", url, e))
        })?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CommonError::Config(format!("failed to build webhook client: {}", e)))?;
        Ok(Self { client, url })
    }

    /// 送信先URL
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl AlertSink for WebhookAlertSink {
    fn record(&self, event: &AlertEvent) -> Result<(), AlertError> {
        let handle = tokio::runtime::Handle::try_current().map_err(|_| AlertError::NoRuntime)?;
        let body = serde_json::to_value(event)?;
        let client = self.client.clone();
        let url = self.url.clone();
        let service = event.service().to_string();

        handle.spawn(async move {
            match client.post(&url).json(&body).send().await {
                Ok(response) if response.status().is_success() => {
                    debug!(service = %service, "Alert delivered to webhook");
                }
                Ok(response) => {
                    warn!(
                        service = %service,
                        status = %response.status(),
                        "Alert webhook rejected event"
                    );
                }
                Err(e) => {
                    warn!(service = %service, error = %e, "Alert webhook delivery failed");
                }
            }
        });

        Ok(())
    }
}

/// 複数シンクへ配送するシンク
///
/// あるシンクが失敗しても残りのシンクには配送する。最初のエラーを返す。
#[derive(Clone, Default)]
pub struct CompositeAlertSink {
    sinks: Vec<SharedAlertSink>,
}

impl CompositeAlertSink {
    /// 空のシンクを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// シンクを追加
    pub fn with(mut self, sink: SharedAlertSink) -> Self {
        self.sinks.push(sink);
        self
    }

    /// 登録済みシンク数
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    /// シンクが空かどうか
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl AlertSink for CompositeAlertSink {
    fn record(&self, event: &AlertEvent) -> Result<(), AlertError> {
        let mut first_error = None;
        for sink in &self.sinks {
            if let Err(e) = sink.record(event) {
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
