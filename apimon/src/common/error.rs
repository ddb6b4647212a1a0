//! エラー型定義
//!
//! 統一エラー型（thiserror使用）
//!
//! チェック実行の失敗はエラーではなく`CheckResult`として表現されるため、
//! ここに定義するのは設定・登録・内部障害・アラート送信の失敗のみ。

use axum::http::StatusCode;
use thiserror::Error;

/// Common layer error type
#[derive(Debug, Error)]
pub enum CommonError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parse error
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Monitor error type
#[derive(Debug, Error)]
pub enum MonitorError {
    /// Common layer error
    #[error(transparent)]
    Common(#[from] CommonError),

    /// A service with the same name is already registered
    #[error("Service already registered: {0}")]
    DuplicateService(String),

    /// Internal error (e.g. a check task could not be joined)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl MonitorError {
    /// Returns a safe error message for external clients.
    ///
    /// Target URLs and upstream error details stay in the server logs.
    pub fn external_message(&self) -> &'static str {
        match self {
            Self::Common(CommonError::Validation(_)) => "Invalid service descriptor",
            Self::Common(_) => "Configuration error",
            Self::DuplicateService(_) => "Service already registered",
            Self::Internal(_) => "Internal server error",
        }
    }

    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Common(CommonError::Validation(_)) => StatusCode::BAD_REQUEST,
            Self::Common(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::DuplicateService(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 登録時に同期的に検出される設定エラーかどうか
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::Common(_) | Self::DuplicateService(_))
    }
}

/// Alert sink error type
///
/// アラートシンクの失敗は監視結果に影響させない（呼び出し側で握りつぶす）。
#[derive(Debug, Error)]
pub enum AlertError {
    /// Webhook delivery error
    #[error("Webhook error: {0}")]
    Webhook(String),

    /// No tokio runtime available to deliver the event
    #[error("No async runtime available for alert delivery")]
    NoRuntime,

    /// Event serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias (Common)
pub type CommonResult<T> = Result<T, CommonError>;

/// Result type alias (Monitor)
pub type MonitorResult<T> = Result<T, MonitorError>;
