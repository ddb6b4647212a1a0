//! サービスチェッカー
//!
//! 1つのサービス記述子に対して、計時付きのHTTPリクエストを1回だけ実行する。
//!
//! - 成功時: リモートのステータスと経過時間を返す（非2xxもそのまま返す）
//! - 失敗時: ステータス500・レスポンスタイム0・エラー内容を返す
//! - 閾値超過・失敗時はアラートシンクへ転送する（シンクの失敗は握りつぶす）
//! - リトライはしない

use crate::alert::{AlertEvent, SharedAlertSink};
use crate::common::types::{duration_millis, CheckResult, ServiceDescriptor};
use reqwest::Client;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// サービスチェッカー
///
/// 記述子・HTTPクライアント・アラートシンクを束ねる。
/// クローンは安価で、並列ラウンドではタスクごとにクローンを渡す。
#[derive(Clone)]
pub struct ServiceChecker {
    /// 対象サービス
    descriptor: Arc<ServiceDescriptor>,
    /// HTTPクライアント
    client: Client,
    /// アラートシンク
    sink: SharedAlertSink,
    /// リクエストタイムアウト
    timeout: Duration,
}

impl ServiceChecker {
    /// 新しいチェッカーを作成
    ///
    /// 記述子にタイムアウトがあればそれを、なければ`default_timeout`を使う。
    pub fn new(
        descriptor: ServiceDescriptor,
        client: Client,
        sink: SharedAlertSink,
        default_timeout: Duration,
    ) -> Self {
        let timeout = descriptor.timeout().unwrap_or(default_timeout);
        Self {
            descriptor: Arc::new(descriptor),
            client,
            sink,
            timeout,
        }
    }

    /// 対象サービスの記述子
    pub fn descriptor(&self) -> &ServiceDescriptor {
        &self.descriptor
    }

    /// 実効リクエストタイムアウト
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// チェックを1回実行
    pub async fn execute(&self) -> CheckResult {
        let start = Instant::now();
        let outcome = self
            .client
            .get(self.descriptor.url())
            .timeout(self.timeout)
            .send()
            .await;
        let elapsed = start.elapsed();

        match outcome {
            Ok(response) => {
                let result = CheckResult::success(response.status().as_u16(), elapsed);

                if let Some(event) = self.threshold_alert(&result) {
                    self.forward(event);
                } else {
                    debug!(
                        service = %self.descriptor.name(),
                        status = result.status,
                        latency_ms = result.response_time,
                        "Check succeeded"
                    );
                }

                result
            }
            Err(e) => {
                let description = self.describe_error(&e);
                debug!(
                    service = %self.descriptor.name(),
                    error = %e,
                    "Check failed"
                );
                self.forward(AlertEvent::execution_failure(
                    &self.descriptor,
                    description.clone(),
                ));
                CheckResult::failure(description)
            }
        }
    }

    /// 成功結果の`response_time`が閾値を厳密に超えていれば閾値超過イベントを作る
    ///
    /// 判定とイベントは結果と同じミリ秒値を使う。
    fn threshold_alert(&self, result: &CheckResult) -> Option<AlertEvent> {
        let threshold_ms = duration_millis(self.descriptor.threshold());
        (result.response_time > threshold_ms).then(|| {
            AlertEvent::threshold_exceeded(&self.descriptor, result.response_time, result.status)
        })
    }

    fn describe_error(&self, e: &reqwest::Error) -> String {
        if e.is_timeout() {
            format!("request timed out after {}ms", self.timeout.as_millis())
        } else if e.is_connect() {
            format!("connection failed: {}", e)
        } else {
            format!("request failed: {}", e)
        }
    }

    fn forward(&self, event: AlertEvent) {
        if let Err(e) = self.sink.record(&event) {
            warn!(
                service = %self.descriptor.name(),
                error = %e,
                "Failed to forward alert event"
            );
        }
    }
}
