//! API service monitor
//!
//! 登録されたHTTPサービスを定期的にチェックし、応答時間の閾値超過や
//! チェック失敗をアラートとして通知する監視サーバー

#![warn(missing_docs)]

/// 共通型定義・エラー型
pub mod common;

/// REST APIハンドラー
pub mod api;

/// アラートイベント・シンク
pub mod alert;

/// サービスチェック実行・定期スケジューラ
pub mod health;

/// 監視対象サービスのレジストリ
pub mod registry;

/// ロギング初期化ユーティリティ
pub mod logging;

/// 設定管理（環境変数ヘルパー・サービス設定読み込み）
pub mod config;

/// CLIインターフェース
pub mod cli;

/// Cooperative shutdown controller
pub mod shutdown;

/// サーバー初期化
pub mod bootstrap;

/// axumサーバー起動
pub mod server;

/// アプリケーション状態
#[derive(Clone)]
pub struct AppState {
    /// 監視対象サービスのレジストリ
    pub registry: registry::MonitorRegistry,
    /// アラートイベントバス（WebSocket配信用）
    pub alert_bus: alert::SharedAlertBus,
    /// Cooperative shutdown controller
    pub shutdown: shutdown::ShutdownController,
}
