//! 账户与角色层级

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use spot_common::UserId;

use crate::permission::Permissions;

/// 账户类型（角色）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    Standard,
    ExpertModerator,
    VerifiedProfessional,
    Administrator,
}

impl AccountType {
    pub const ALL: [AccountType; 4] = [
        AccountType::Standard,
        AccountType::ExpertModerator,
        AccountType::VerifiedProfessional,
        AccountType::Administrator,
    ];

    /// 层级序号: Standard=0 < ExpertModerator=1 < VerifiedProfessional=2 < Administrator=3
    pub const fn rank(self) -> u8 {
        match self {
            AccountType::Standard => 0,
            AccountType::ExpertModerator => 1,
            AccountType::VerifiedProfessional => 2,
            AccountType::Administrator => 3,
        }
    }

    /// 角色自带的权限
    pub const fn role_permissions(self) -> Permissions {
        match self {
            AccountType::Standard => Permissions::CREATE_CONTENT,
            AccountType::ExpertModerator => {
                Permissions::CREATE_CONTENT.union(Permissions::VIEW_MODERATION_LOGS)
            }
            AccountType::VerifiedProfessional => {
                Permissions::CREATE_CONTENT.union(Permissions::VIEW_ANALYTICS)
            }
            AccountType::Administrator => Permissions::all(),
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            AccountType::Standard => "standard",
            AccountType::ExpertModerator => "expert_moderator",
            AccountType::VerifiedProfessional => "verified_professional",
            AccountType::Administrator => "administrator",
        }
    }

    /// 边界处的宽松解析：无法识别的类型按最低权限处理
    pub fn parse_or_standard(s: &str) -> Self {
        s.parse().unwrap_or(AccountType::Standard)
    }
}

/// 按名称取层级序号，未知类型返回 0
pub fn hierarchy_rank(account_type: &str) -> u8 {
    AccountType::parse_or_standard(account_type).rank()
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AccountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();
        AccountType::ALL
            .into_iter()
            .find(|t| t.as_str().replace('_', "") == normalized)
            .ok_or_else(|| format!("unknown account type: {}", s))
    }
}

/// 版主激活状态
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModeratorStatus {
    #[default]
    Inactive,
    Active,
}

/// 版主专长领域
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Specialization {
    #[default]
    None,
    Mycology,
    Botany,
    Ecology,
    FoodSafety,
}

impl Specialization {
    pub const fn as_str(self) -> &'static str {
        match self {
            Specialization::None => "none",
            Specialization::Mycology => "mycology",
            Specialization::Botany => "botany",
            Specialization::Ecology => "ecology",
            Specialization::FoodSafety => "food_safety",
        }
    }
}

impl std::fmt::Display for Specialization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 经验等级（有序）
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ExpertiseLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

/// 账户
///
/// 由外部持久化层拥有，这里只作为值传入决策函数。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: UserId,
    pub display_name: String,
    pub account_type: AccountType,
    /// 显式授予的权限
    pub permissions: Permissions,
    pub specialization: Specialization,
    pub moderator_status: ModeratorStatus,
    pub expertise_level: ExpertiseLevel,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn new(display_name: impl Into<String>, account_type: AccountType) -> Self {
        Self {
            id: UserId::new(),
            display_name: display_name.into(),
            account_type,
            permissions: Permissions::empty(),
            specialization: Specialization::None,
            moderator_status: ModeratorStatus::Inactive,
            expertise_level: ExpertiseLevel::Beginner,
            created_at: Utc::now(),
        }
    }

    pub fn with_id(mut self, id: UserId) -> Self {
        self.id = id;
        self
    }

    pub fn with_permissions(mut self, permissions: Permissions) -> Self {
        self.permissions = permissions;
        self
    }

    pub fn with_specialization(mut self, specialization: Specialization) -> Self {
        self.specialization = specialization;
        self
    }

    pub fn with_moderator_status(mut self, status: ModeratorStatus) -> Self {
        self.moderator_status = status;
        self
    }

    pub fn with_expertise(mut self, level: ExpertiseLevel) -> Self {
        self.expertise_level = level;
        self
    }

    /// 快速创建激活状态的专家版主
    pub fn active_moderator(display_name: impl Into<String>, specialization: Specialization) -> Self {
        Self::new(display_name, AccountType::ExpertModerator)
            .with_specialization(specialization)
            .with_moderator_status(ModeratorStatus::Active)
            .with_expertise(ExpertiseLevel::Expert)
    }

    pub fn rank(&self) -> u8 {
        self.account_type.rank()
    }

    pub fn is_administrator(&self) -> bool {
        self.account_type == AccountType::Administrator
    }

    pub fn is_active_moderator(&self) -> bool {
        self.account_type == AccountType::ExpertModerator
            && self.moderator_status == ModeratorStatus::Active
    }
}
