//! アラート通知
//!
//! 閾値超過・チェック実行失敗をアラートシンクへ転送する。
//! シンクの失敗は監視結果に影響させない。

pub mod bus;
pub mod sinks;

pub use bus::{create_shared_alert_bus, AlertEventBus, SharedAlertBus};
pub use sinks::{CompositeAlertSink, TracingAlertSink, WebhookAlertSink};

use crate::common::error::AlertError;
use crate::common::types::{duration_millis, ServiceDescriptor};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// アラートイベント
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum AlertEvent {
    /// レイテンシが閾値を超過した
    ThresholdExceeded {
        /// サービス名
        service: String,
        /// 監視URL
        url: String,
        /// 観測レイテンシ（ミリ秒）
        latency_ms: u64,
        /// 設定閾値（ミリ秒）
        threshold_ms: u64,
        /// リモートのHTTPステータス
        status: u16,
        /// 発生日時
        raised_at: DateTime<Utc>,
    },
    /// チェックを完了できなかった
    ExecutionFailure {
        /// サービス名
        service: String,
        /// 監視URL
        url: String,
        /// 失敗内容
        error: String,
        /// 発生日時
        raised_at: DateTime<Utc>,
    },
}

impl AlertEvent {
    /// 閾値超過イベントを作成
    ///
    /// `latency_ms`はチェック結果の`response_time`と同じミリ秒値を渡す。
    pub fn threshold_exceeded(descriptor: &ServiceDescriptor, latency_ms: u64, status: u16) -> Self {
        Self::ThresholdExceeded {
            service: descriptor.name().to_string(),
            url: descriptor.url().to_string(),
            latency_ms,
            threshold_ms: duration_millis(descriptor.threshold()),
            status,
            raised_at: Utc::now(),
        }
    }

    /// 実行失敗イベントを作成
    pub fn execution_failure(descriptor: &ServiceDescriptor, error: impl Into<String>) -> Self {
        Self::ExecutionFailure {
            service: descriptor.name().to_string(),
            url: descriptor.url().to_string(),
            error: error.into(),
            raised_at: Utc::now(),
        }
    }

    /// 対象サービス名
    pub fn service(&self) -> &str {
        match self {
            Self::ThresholdExceeded { service, .. } | Self::ExecutionFailure { service, .. } => {
                service
            }
        }
    }

    /// 人間向けメッセージ
    pub fn message(&self) -> String {
        match self {
            Self::ThresholdExceeded {
                latency_ms,
                threshold_ms,
                ..
            } => format!(
                "Response time exceeded threshold: {}ms > {}ms",
                latency_ms, threshold_ms
            ),
            Self::ExecutionFailure { error, .. } => format!("Check failed: {}", error),
        }
    }
}

/// アラートシンク
///
/// 並行に呼び出されても安全であること。`record`はブロックせずに戻ること
/// （配送に時間がかかるシンクは内部でタスクを起動する）。
pub trait AlertSink: Send + Sync {
    /// イベントを記録する
    fn record(&self, event: &AlertEvent) -> Result<(), AlertError>;
}

/// 共有可能なアラートシンク
pub type SharedAlertSink = Arc<dyn AlertSink>;
