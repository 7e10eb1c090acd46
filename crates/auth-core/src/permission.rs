//! 权限模型
//!
//! 原子能力 (`Capability`) 是封闭枚举；权限集合 (`Permissions`) 是位图，
//! 只支持并集与包含判断。

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// 权限集合，按能力序号占位
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct Permissions: u32 {
        const CREATE_CONTENT        = 1 << 0;
        const VALIDATE_CONTENT      = 1 << 1;
        const MODERATE_CONTENT      = 1 << 2;
        const MANAGE_ORGANIZATION   = 1 << 3;
        const PROFESSIONAL_FEATURES = 1 << 4;
        const NOMINATE_MODERATORS   = 1 << 5;
        const ADMIN_ACCESS          = 1 << 6;
        const MANAGE_USERS          = 1 << 7;
        const VIEW_MODERATION_LOGS  = 1 << 8;
        const VIEW_ANALYTICS        = 1 << 9;
    }
}

/// 原子能力
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    CreateContent,
    ValidateContent,
    ModerateContent,
    ManageOrganization,
    ProfessionalFeatures,
    NominateModerators,
    AdminAccess,
    ManageUsers,
    ViewModerationLogs,
    ViewAnalytics,
}

impl Capability {
    pub const ALL: [Capability; 10] = [
        Capability::CreateContent,
        Capability::ValidateContent,
        Capability::ModerateContent,
        Capability::ManageOrganization,
        Capability::ProfessionalFeatures,
        Capability::NominateModerators,
        Capability::AdminAccess,
        Capability::ManageUsers,
        Capability::ViewModerationLogs,
        Capability::ViewAnalytics,
    ];

    /// 对应的位
    pub const fn flag(self) -> Permissions {
        match self {
            Capability::CreateContent => Permissions::CREATE_CONTENT,
            Capability::ValidateContent => Permissions::VALIDATE_CONTENT,
            Capability::ModerateContent => Permissions::MODERATE_CONTENT,
            Capability::ManageOrganization => Permissions::MANAGE_ORGANIZATION,
            Capability::ProfessionalFeatures => Permissions::PROFESSIONAL_FEATURES,
            Capability::NominateModerators => Permissions::NOMINATE_MODERATORS,
            Capability::AdminAccess => Permissions::ADMIN_ACCESS,
            Capability::ManageUsers => Permissions::MANAGE_USERS,
            Capability::ViewModerationLogs => Permissions::VIEW_MODERATION_LOGS,
            Capability::ViewAnalytics => Permissions::VIEW_ANALYTICS,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Capability::CreateContent => "create_content",
            Capability::ValidateContent => "validate_content",
            Capability::ModerateContent => "moderate_content",
            Capability::ManageOrganization => "manage_organization",
            Capability::ProfessionalFeatures => "professional_features",
            Capability::NominateModerators => "nominate_moderators",
            Capability::AdminAccess => "admin_access",
            Capability::ManageUsers => "manage_users",
            Capability::ViewModerationLogs => "view_moderation_logs",
            Capability::ViewAnalytics => "view_analytics",
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Capability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Capability::ALL
            .into_iter()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| format!("unknown capability: {}", s))
    }
}

impl From<Capability> for Permissions {
    fn from(capability: Capability) -> Self {
        capability.flag()
    }
}

impl Permissions {
    /// 版主加成：激活状态的专家版主额外获得
    pub const MODERATOR_BONUS: Self = Self::VALIDATE_CONTENT.union(Self::MODERATE_CONTENT);

    /// 认证专业人士加成
    pub const PROFESSIONAL_BONUS: Self =
        Self::PROFESSIONAL_FEATURES.union(Self::MANAGE_ORGANIZATION);

    pub fn contains_capability(&self, capability: Capability) -> bool {
        self.contains(capability.flag())
    }

    pub fn with_capability(self, capability: Capability) -> Self {
        self.union(capability.flag())
    }

    /// 从能力列表构建集合
    pub fn from_capabilities(capabilities: &[Capability]) -> Self {
        capabilities
            .iter()
            .fold(Self::empty(), |acc, c| acc.with_capability(*c))
    }

    /// 集合中的能力，按序号排列
    pub fn capabilities(&self) -> Vec<Capability> {
        Capability::ALL
            .into_iter()
            .filter(|c| self.contains_capability(*c))
            .collect()
    }
}
