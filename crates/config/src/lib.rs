//! spot-config - 配置加载库

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    Load(#[from] figment::Error),

    #[error("Invalid config value: {0}")]
    Invalid(String),
}

/// 遥测配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// 生产环境使用 JSON 日志
    #[serde(default)]
    pub json_logs: bool,
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logs: false,
            metrics_enabled: true,
        }
    }
}

/// 审核流程配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModerationConfig {
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,
    /// 会话有效期（分钟）
    #[serde(default = "default_session_ttl_minutes")]
    pub session_ttl_minutes: i64,
}

fn default_page_size() -> u32 {
    20
}

fn default_max_page_size() -> u32 {
    100
}

fn default_session_ttl_minutes() -> i64 {
    60
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            session_ttl_minutes: default_session_ttl_minutes(),
        }
    }
}

/// 导航访问规则（字符串形式，由服务在启动时解析）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationRuleConfig {
    pub destination: String,
    #[serde(default)]
    pub allow_unauthenticated: bool,
    #[serde(default)]
    pub require_authentication: bool,
    #[serde(default)]
    pub required_role: Option<String>,
    #[serde(default)]
    pub required_permission: Option<String>,
    #[serde(default)]
    pub min_rank: Option<u8>,
}

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_app_name")]
    pub app_name: String,
    #[serde(default = "default_app_env")]
    pub app_env: String,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    #[serde(default)]
    pub moderation: ModerationConfig,
    /// 覆盖或追加内置导航规则
    #[serde(default)]
    pub navigation: Vec<NavigationRuleConfig>,
}

fn default_app_name() -> String {
    "content-moderation".to_string()
}

fn default_app_env() -> String {
    "development".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            app_env: default_app_env(),
            telemetry: TelemetryConfig::default(),
            moderation: ModerationConfig::default(),
            navigation: Vec::new(),
        }
    }
}

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    ///
    /// 顺序: 内置默认值 -> `{dir}/default.toml` -> `{dir}/{APP_ENV}.toml` -> `SPOT_` 环境变量
    pub fn load(config_dir: &str) -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| default_app_env());

        let figment = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(format!("{}/default.toml", config_dir)))
            .merge(Toml::file(format!("{}/{}.toml", config_dir, env)))
            .merge(Env::prefixed("SPOT_").split("__"));

        Self::from_figment(figment)
    }

    /// 从任意 figment 提取并校验配置
    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let moderation = &self.moderation;
        if moderation.max_page_size == 0 {
            return Err(ConfigError::Invalid(
                "moderation.max_page_size must be greater than zero".to_string(),
            ));
        }
        if moderation.default_page_size == 0 || moderation.default_page_size > moderation.max_page_size {
            return Err(ConfigError::Invalid(format!(
                "moderation.default_page_size must be within 1..={}",
                moderation.max_page_size
            )));
        }
        if moderation.session_ttl_minutes <= 0 {
            return Err(ConfigError::Invalid(
                "moderation.session_ttl_minutes must be positive".to_string(),
            ));
        }
        if let Some(rule) = self.navigation.iter().find(|r| r.destination.trim().is_empty()) {
            return Err(ConfigError::Invalid(format!(
                "navigation rule without destination: {:?}",
                rule
            )));
        }
        Ok(())
    }

    /// 是否为生产环境
    pub fn is_production(&self) -> bool {
        self.app_env == "production"
    }

    /// 是否为开发环境
    pub fn is_development(&self) -> bool {
        self.app_env == "development"
    }
}
