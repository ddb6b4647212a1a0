//! Configuration management via environment variables and service files
//!
//! Provides helper functions for reading environment variables with fallback
//! to deprecated variable names, the monitor runtime settings, and loading of
//! the monitored service list.

use crate::common::error::{CommonError, CommonResult};
use crate::common::types::ServiceConfig;
use crate::registry::RoundMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Default listen port
pub const DEFAULT_PORT: u16 = 3000;

/// Default bind address
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default per-request timeout (milliseconds)
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

/// Get an environment variable with fallback to a deprecated name
///
/// If the new variable name is set, returns its value.
/// If only the old (deprecated) variable name is set, returns its value
/// and logs a deprecation warning.
///
/// # Example
/// ```
/// use apimon::config::get_env_with_fallback;
///
/// let port = get_env_with_fallback("APIMON_PORT", "PORT");
/// ```
pub fn get_env_with_fallback(new_name: &str, old_name: &str) -> Option<String> {
    if let Ok(val) = std::env::var(new_name) {
        return Some(val);
    }
    if let Ok(val) = std::env::var(old_name) {
        tracing::warn!(
            "Environment variable '{}' is deprecated, use '{}' instead",
            old_name,
            new_name
        );
        return Some(val);
    }
    None
}

/// Get an environment variable with fallback and default value
pub fn get_env_with_fallback_or(new_name: &str, old_name: &str, default: &str) -> String {
    get_env_with_fallback(new_name, old_name).unwrap_or_else(|| default.to_string())
}

/// Get an environment variable with fallback, parsing to a specific type
///
/// Returns `default` if neither variable is set or parsing fails.
pub fn get_env_with_fallback_parse<T: std::str::FromStr>(
    new_name: &str,
    old_name: &str,
    default: T,
) -> T {
    get_env_with_fallback(new_name, old_name)
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// `true/1/yes/on` を真とみなす
pub fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// モニター実行設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    /// デフォルトのリクエストタイムアウト
    pub request_timeout: Duration,
    /// ラウンド実行方式
    pub round_mode: RoundMode,
    /// アラートWebhook URL
    pub alert_webhook_url: Option<String>,
    /// 定期チェックスケジューラの有効/無効
    pub scheduler_enabled: bool,
    /// サービス設定ファイルのパス
    pub config_path: Option<PathBuf>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            round_mode: RoundMode::default(),
            alert_webhook_url: None,
            scheduler_enabled: false,
            config_path: None,
        }
    }
}

impl MonitorConfig {
    /// Load monitor configuration from environment variables.
    pub fn from_env() -> Self {
        let timeout_ms = get_env_with_fallback_parse(
            "APIMON_REQUEST_TIMEOUT_MS",
            "REQUEST_TIMEOUT_MS",
            DEFAULT_REQUEST_TIMEOUT_MS,
        );
        let timeout_ms = if timeout_ms == 0 {
            warn!("Request timeout must be positive, using default");
            DEFAULT_REQUEST_TIMEOUT_MS
        } else {
            timeout_ms
        };

        let round_mode = match get_env_with_fallback("APIMON_ROUND_MODE", "ROUND_MODE") {
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                warn!("{}, using {}", e, RoundMode::default());
                RoundMode::default()
            }),
            None => RoundMode::default(),
        };

        Self {
            request_timeout: Duration::from_millis(timeout_ms),
            round_mode,
            alert_webhook_url: get_env_with_fallback(
                "APIMON_ALERT_WEBHOOK_URL",
                "ALERT_WEBHOOK_URL",
            )
            .filter(|url| !url.trim().is_empty()),
            scheduler_enabled: get_env_with_fallback(
                "APIMON_SCHEDULER_ENABLED",
                "SCHEDULER_ENABLED",
            )
            .map(|v| is_truthy(&v))
            .unwrap_or(false),
            config_path: get_env_with_fallback("APIMON_CONFIG", "MONITOR_CONFIG").map(PathBuf::from),
        }
    }
}

/// サービス設定ファイル
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServicesFile {
    /// 監視対象サービス（登録順）
    pub services: Vec<ServiceConfig>,
}

/// サービス設定ファイルを読み込む
///
/// 拡張子が`.yaml`/`.yml`ならYAML、それ以外はJSONとして解釈する。
pub fn load_services_file(path: &Path) -> CommonResult<Vec<ServiceConfig>> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        CommonError::Config(format!(
            "failed to read service config {}: {}",
            path.display(),
            e
        ))
    })?;

    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| matches!(ext.to_ascii_lowercase().as_str(), "yaml" | "yml"));

    let file: ServicesFile = if is_yaml {
        serde_yaml::from_str(&raw)?
    } else {
        serde_json::from_str(&raw)?
    };
    Ok(file.services)
}

/// JSON配列形式のサービス一覧を解釈する（`APIMON_SERVICES`）
pub fn parse_services_json(raw: &str) -> CommonResult<Vec<ServiceConfig>> {
    Ok(serde_json::from_str(raw)?)
}

/// 設定がない場合のサンプルサービス
pub fn default_services() -> Vec<ServiceConfig> {
    vec![
        ServiceConfig {
            name: "Service A".to_string(),
            url: "https://service-a.com/api".to_string(),
            interval: 30,
            threshold: 200,
            timeout: None,
        },
        ServiceConfig {
            name: "Service B".to_string(),
            url: "https://service-b.com/api".to_string(),
            interval: 60,
            threshold: 500,
            timeout: None,
        },
    ]
}

/// 監視対象サービスを読み込む
///
/// 優先順位: 設定ファイル → `APIMON_SERVICES` → サンプルサービス
pub fn load_services(path: Option<&Path>) -> CommonResult<Vec<ServiceConfig>> {
    if let Some(path) = path {
        let services = load_services_file(path)?;
        info!(
            path = %path.display(),
            count = services.len(),
            "Loaded services from config file"
        );
        return Ok(services);
    }

    if let Some(raw) = get_env_with_fallback("APIMON_SERVICES", "MONITOR_SERVICES") {
        let services = parse_services_json(&raw)?;
        info!(count = services.len(), "Loaded services from environment");
        return Ok(services);
    }

    info!("No service configuration found, using built-in sample services");
    Ok(default_services())
}
