//! アラートイベントバス
//!
//! アラートイベントをWebSocketクライアント（`/ws/alerts`）に
//! ブロードキャストするための基盤

use super::{AlertEvent, AlertSink};
use crate::common::error::AlertError;
use std::sync::Arc;
use tokio::sync::broadcast;

/// イベントバスのチャネル容量
const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// アラートイベントバス
#[derive(Clone)]
pub struct AlertEventBus {
    sender: broadcast::Sender<AlertEvent>,
}

impl Default for AlertEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl AlertEventBus {
    /// 新しいイベントバスを作成
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { sender }
    }

    /// イベントバスを購読
    pub fn subscribe(&self) -> broadcast::Receiver<AlertEvent> {
        self.sender.subscribe()
    }

    /// イベントを発行
    ///
    /// 購読者がいない場合でもエラーにはならない
    pub fn publish(&self, event: AlertEvent) {
        let _ = self.sender.send(event);
    }

    /// 現在の購読者数を取得
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl AlertSink for AlertEventBus {
    fn record(&self, event: &AlertEvent) -> Result<(), AlertError> {
        self.publish(event.clone());
        Ok(())
    }
}

/// Arc でラップされたイベントバス
pub type SharedAlertBus = Arc<AlertEventBus>;

/// 共有可能なイベントバスを作成
pub fn create_shared_alert_bus() -> SharedAlertBus {
    Arc::new(AlertEventBus::new())
}
