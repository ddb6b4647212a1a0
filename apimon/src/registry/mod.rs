//! モニターレジストリ
//!
//! サービス記述子とチェッカーを保持し、1ラウンド分のチェックを実行する。
//!
//! - ラウンド結果は常に登録順（完了順には依存しない）
//! - 個々のチェック失敗は結果に埋め込まれ、ラウンドは失敗しない
//! - ラウンド実行中は読み取りロックを保持し、登録は排他される

use crate::alert::SharedAlertSink;
use crate::common::error::{CommonError, MonitorError, MonitorResult};
use crate::common::types::{
    duration_millis, CheckResult, RoundResult, ServiceConfig, ServiceDescriptor,
};
use crate::health::ServiceChecker;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{error, info};
use uuid::Uuid;

/// ラウンド内のチェック実行方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundMode {
    /// サービスごとにタスクを起動して並列に実行
    #[default]
    Parallel,
    /// 登録順に1件ずつ実行
    Sequential,
}

impl RoundMode {
    /// 文字列表現
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Parallel => "parallel",
            Self::Sequential => "sequential",
        }
    }
}

impl fmt::Display for RoundMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoundMode {
    type Err = CommonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "parallel" => Ok(Self::Parallel),
            "sequential" => Ok(Self::Sequential),
            other => Err(CommonError::Config(format!("unknown round mode: {}", other))),
        }
    }
}

/// モニターレジストリ
///
/// クローンは同じサービス集合を共有する。
#[derive(Clone)]
pub struct MonitorRegistry {
    /// 登録順のチェッカー
    checkers: Arc<RwLock<Vec<ServiceChecker>>>,
    /// チェッカー間で共有するHTTPクライアント
    client: Client,
    /// アラートシンク
    sink: SharedAlertSink,
    /// デフォルトのリクエストタイムアウト
    request_timeout: Duration,
    /// ラウンド実行方式
    mode: RoundMode,
}

impl MonitorRegistry {
    /// 空のレジストリを作成
    pub fn new(client: Client, sink: SharedAlertSink, request_timeout: Duration) -> Self {
        Self {
            checkers: Arc::new(RwLock::new(Vec::new())),
            client,
            sink,
            request_timeout,
            mode: RoundMode::default(),
        }
    }

    /// ラウンド実行方式を設定
    pub fn with_mode(mut self, mode: RoundMode) -> Self {
        self.mode = mode;
        self
    }

    /// ラウンド実行方式
    pub fn mode(&self) -> RoundMode {
        self.mode
    }

    /// サービスを登録
    ///
    /// 記述子が不正な場合や同名のサービスが登録済みの場合は失敗し、
    /// レジストリは変更されない。
    pub async fn register(&self, descriptor: ServiceDescriptor) -> MonitorResult<()> {
        descriptor.validate()?;

        let mut checkers = self.checkers.write().await;
        if checkers
            .iter()
            .any(|checker| checker.descriptor().name() == descriptor.name())
        {
            return Err(MonitorError::DuplicateService(descriptor.name().to_string()));
        }

        info!(
            service = %descriptor.name(),
            url = %descriptor.url(),
            threshold_ms = duration_millis(descriptor.threshold()),
            interval_secs = descriptor.interval().as_secs(),
            "Service registered"
        );

        checkers.push(ServiceChecker::new(
            descriptor,
            self.client.clone(),
            self.sink.clone(),
            self.request_timeout,
        ));
        Ok(())
    }

    /// 設定リストからまとめて登録
    ///
    /// 最初に失敗した設定でエラーを返す（それ以前の登録は残る）。
    pub async fn register_all(
        &self,
        configs: impl IntoIterator<Item = ServiceConfig>,
    ) -> MonitorResult<usize> {
        let mut count = 0;
        for config in configs {
            self.register(ServiceDescriptor::from(config)).await?;
            count += 1;
        }
        Ok(count)
    }

    /// 登録サービス数
    pub async fn len(&self) -> usize {
        self.checkers.read().await.len()
    }

    /// 登録サービスがないかどうか
    pub async fn is_empty(&self) -> bool {
        self.checkers.read().await.is_empty()
    }

    /// 登録順の記述子一覧
    pub async fn descriptors(&self) -> Vec<ServiceDescriptor> {
        self.checkers
            .read()
            .await
            .iter()
            .map(|checker| checker.descriptor().clone())
            .collect()
    }

    /// 登録順のチェッカー一覧（スナップショット）
    pub async fn checkers(&self) -> Vec<ServiceChecker> {
        self.checkers.read().await.clone()
    }

    /// 1ラウンドを実行
    ///
    /// 登録された全サービスをチェックし、登録順の結果を返す。
    /// エラーになるのはチェックタスクが異常終了した場合のみ。その場合も
    /// 他のチェックの完了を待ってから返す。
    pub async fn run_round(&self) -> MonitorResult<RoundResult> {
        let checkers = self.checkers.read().await;
        let round_id = Uuid::new_v4();
        let started = Instant::now();

        info!(
            %round_id,
            services = checkers.len(),
            mode = %self.mode,
            "Starting monitoring round"
        );

        let results = match self.mode {
            RoundMode::Sequential => run_sequential(&checkers).await,
            RoundMode::Parallel => run_parallel(&checkers).await?,
        };

        let failures = results.iter().filter(|r| r.is_failure()).count();
        info!(
            %round_id,
            services = results.len(),
            failures = failures,
            elapsed_ms = duration_millis(started.elapsed()),
            "Monitoring round completed"
        );

        Ok(results)
    }
}

async fn run_sequential(checkers: &[ServiceChecker]) -> RoundResult {
    let mut results = Vec::with_capacity(checkers.len());
    for checker in checkers {
        results.push(checker.execute().await);
    }
    results
}

async fn run_parallel(checkers: &[ServiceChecker]) -> MonitorResult<RoundResult> {
    let handles: Vec<_> = checkers
        .iter()
        .cloned()
        .map(|checker| tokio::spawn(async move { checker.execute().await }))
        .collect();

    // ハンドルを登録順に待つことで結果の順序を保つ。
    // 異常終了したタスクがあっても残りのハンドルはすべて待ってからエラーを返す。
    let mut results: Vec<CheckResult> = Vec::with_capacity(handles.len());
    let mut join_failure = None;
    for (handle, checker) in handles.into_iter().zip(checkers) {
        match handle.await {
            Ok(result) => results.push(result),
            Err(e) => {
                error!(
                    service = %checker.descriptor().name(),
                    error = %e,
                    "Check task join error"
                );
                join_failure.get_or_insert_with(|| {
                    MonitorError::Internal(format!(
                        "check task for service '{}' did not complete: {}",
                        checker.descriptor().name(),
                        e
                    ))
                });
            }
        }
    }

    match join_failure {
        Some(err) => Err(err),
        None => Ok(results),
    }
}
