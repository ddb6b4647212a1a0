//! 監視対象サービスとチェック結果の型定義

use crate::common::error::{CommonError, CommonResult};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// チェックを実行できなかったことを表すステータス
///
/// リモートが実際に返した500とは`error`の有無で区別する（`CheckResult::is_failure`）。
pub const FAILURE_SENTINEL_STATUS: u16 = 500;

/// サービス設定（設定ファイル・環境変数での表現）
///
/// `interval`は秒、`threshold`と`timeout`はミリ秒。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// サービス名
    pub name: String,
    /// 監視URL
    pub url: String,
    /// ポーリング間隔（秒）
    pub interval: u64,
    /// レイテンシ閾値（ミリ秒）
    pub threshold: u64,
    /// リクエストタイムアウト（ミリ秒）。未指定時はグローバル設定を使う
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

/// 監視対象サービスの記述子
///
/// 登録時に作成され、以後変更されない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDescriptor {
    name: String,
    url: String,
    interval: Duration,
    threshold: Duration,
    timeout: Option<Duration>,
}

impl ServiceDescriptor {
    /// 新しい記述子を作成
    ///
    /// 検証は`validate`（レジストリ登録時）で行う。
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        interval: Duration,
        threshold: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            interval,
            threshold,
            timeout: None,
        }
    }

    /// サービス固有のリクエストタイムアウトを設定
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// サービス名
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 監視URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// ポーリング間隔（外部スケジューラ向けのメタデータ）
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// レイテンシ閾値
    pub fn threshold(&self) -> Duration {
        self.threshold
    }

    /// サービス固有のリクエストタイムアウト
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// 記述子を検証する
    ///
    /// - 名前が空でないこと
    /// - URLが絶対http(s) URLであること
    /// - 間隔・閾値・タイムアウトが正の値であること
    pub fn validate(&self) -> CommonResult<()> {
        if self.name.trim().is_empty() {
            return Err(CommonError::Validation(
                "service name must not be empty".to_string(),
            ));
        }

        let url = Url::parse(&self.url).map_err(|e| {
            CommonError::Validation(format!(
                "invalid url '{}' for service '{}': {}",
                self.url, self.name, e
            ))
        })?;
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return Err(CommonError::Validation(format!(
                "url '{}' for service '{}' must be an absolute http(s) url",
                self.url, self.name
            )));
        }

        if self.interval.is_zero() {
            return Err(CommonError::Validation(format!(
                "interval for service '{}' must be positive",
                self.name
            )));
        }
        if self.threshold.is_zero() {
            return Err(CommonError::Validation(format!(
                "threshold for service '{}' must be positive",
                self.name
            )));
        }
        if self.timeout.is_some_and(|t| t.is_zero()) {
            return Err(CommonError::Validation(format!(
                "timeout for service '{}' must be positive",
                self.name
            )));
        }

        Ok(())
    }
}

impl From<ServiceConfig> for ServiceDescriptor {
    fn from(config: ServiceConfig) -> Self {
        let descriptor = ServiceDescriptor::new(
            config.name,
            config.url,
            Duration::from_secs(config.interval),
            Duration::from_millis(config.threshold),
        );
        match config.timeout {
            Some(ms) => descriptor.with_timeout(Duration::from_millis(ms)),
            None => descriptor,
        }
    }
}

impl From<&ServiceDescriptor> for ServiceConfig {
    fn from(descriptor: &ServiceDescriptor) -> Self {
        Self {
            name: descriptor.name.clone(),
            url: descriptor.url.clone(),
            interval: descriptor.interval.as_secs(),
            threshold: duration_millis(descriptor.threshold),
            timeout: descriptor.timeout.map(duration_millis),
        }
    }
}

/// 1回のチェック結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResult {
    /// リモートのHTTPステータス（実行失敗時は`FAILURE_SENTINEL_STATUS`）
    pub status: u16,
    /// レスポンスタイム（ミリ秒、実行失敗時は0）
    pub response_time: u64,
    /// 実行失敗の内容（ステータスを取得できなかった場合のみ）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CheckResult {
    /// レスポンスを受信できたチェック結果
    pub fn success(status: u16, elapsed: Duration) -> Self {
        Self {
            status,
            response_time: duration_millis(elapsed),
            error: None,
        }
    }

    /// 実行に失敗したチェック結果
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            status: FAILURE_SENTINEL_STATUS,
            response_time: 0,
            error: Some(error.into()),
        }
    }

    /// チェック自体が完了しなかったかどうか
    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }
}

/// 1ラウンドの結果（登録順）
pub type RoundResult = Vec<CheckResult>;

/// ミリ秒に切り捨てる（`u64`に収まらない場合は飽和する）
pub(crate) fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
