//! 服务配置
//!
//! 将通用 `AppConfig` 解析为服务内部使用的强类型设置。

use chrono::Duration;
use spot_common::Pagination;
use spot_config::{AppConfig, ModerationConfig};

use crate::domain::navigation::NavigationTable;
use crate::error::ModerationError;

/// 审核流程设置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkflowSettings {
    pub default_page_size: u32,
    pub max_page_size: u32,
}

impl WorkflowSettings {
    /// 缺省时使用默认页大小，并限制在最大页大小以内
    pub fn resolve_pagination(&self, pagination: Option<Pagination>) -> Pagination {
        pagination
            .unwrap_or_else(|| Pagination::new(1, self.default_page_size))
            .clamped(self.max_page_size)
    }
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self::from(&ModerationConfig::default())
    }
}

impl From<&ModerationConfig> for WorkflowSettings {
    fn from(config: &ModerationConfig) -> Self {
        Self {
            default_page_size: config.default_page_size,
            max_page_size: config.max_page_size,
        }
    }
}

/// 会话有效期上限：30 天
pub const MAX_SESSION_TTL_MINUTES: i64 = 30 * 24 * 60;

/// 服务设置
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub workflow: WorkflowSettings,
    pub navigation: NavigationTable,
    pub session_ttl: Duration,
}

impl ServiceSettings {
    pub fn from_app_config(config: &AppConfig) -> Result<Self, ModerationError> {
        Ok(Self {
            workflow: WorkflowSettings::from(&config.moderation),
            navigation: NavigationTable::from_config(&config.navigation)?,
            session_ttl: session_ttl(config.moderation.session_ttl_minutes)?,
        })
    }
}

fn session_ttl(minutes: i64) -> Result<Duration, ModerationError> {
    Some(minutes)
        .filter(|m| (1..=MAX_SESSION_TTL_MINUTES).contains(m))
        .and_then(Duration::try_minutes)
        .ok_or(ModerationError::InvalidSessionTtl {
            minutes,
            max: MAX_SESSION_TTL_MINUTES,
        })
}
