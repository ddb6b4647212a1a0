//! 定期チェックスケジューラ
//!
//! 各サービスの`interval`に従ってチェックをバックグラウンドで繰り返す。
//! ラウンド（`MonitorRegistry::run_round`）とは独立しており、起動時に
//! 登録済みのチェッカーをスナップショットして使う。

use super::ServiceChecker;
use crate::registry::MonitorRegistry;
use crate::shutdown::ShutdownController;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

/// 定期チェックスケジューラ
#[derive(Clone)]
pub struct IntervalScheduler {
    /// モニターレジストリ
    registry: MonitorRegistry,
    /// シャットダウン通知
    shutdown: ShutdownController,
}

impl IntervalScheduler {
    /// 新しいスケジューラを作成
    pub fn new(registry: MonitorRegistry, shutdown: ShutdownController) -> Self {
        Self { registry, shutdown }
    }

    /// サービスごとの監視ループを起動
    ///
    /// 返されたハンドルはシャットダウン要求後に終了する。
    pub async fn start(&self) -> Vec<JoinHandle<()>> {
        let checkers = self.registry.checkers().await;

        info!(services = checkers.len(), "Interval scheduler started");

        checkers
            .into_iter()
            .map(|checker| tokio::spawn(service_loop(checker, self.shutdown.clone())))
            .collect()
    }
}

async fn service_loop(checker: ServiceChecker, shutdown: ShutdownController) {
    let mut timer = interval(checker.descriptor().interval());
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = timer.tick() => {
                let result = checker.execute().await;
                debug!(
                    service = %checker.descriptor().name(),
                    status = result.status,
                    latency_ms = result.response_time,
                    failed = result.is_failure(),
                    "Scheduled check completed"
                );
            }
            _ = shutdown.wait() => {
                debug!(service = %checker.descriptor().name(), "Scheduled checks stopped");
                break;
            }
        }
    }
}
