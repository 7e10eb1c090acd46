//! 目的地与访问要求
//!
//! 规则表在启动时构建一次，之后只读共享。

use std::borrow::Borrow;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use spot_auth_core::{AccountType, Capability};
use spot_config::NavigationRuleConfig;

use crate::error::ModerationError;

/// 内置目的地标识
pub mod destinations {
    pub const HOME: &str = "home";
    pub const LOGIN: &str = "login";
    pub const FIELD_GUIDE: &str = "field_guide";
    pub const SPOT_DETAILS: &str = "spot_details";
    pub const MY_SPOTS: &str = "my_spots";
    pub const CREATE_SPOT: &str = "create_spot";
    pub const MODERATION_QUEUE: &str = "moderation_queue";
    pub const SAFETY_REVIEW_QUEUE: &str = "safety_review_queue";
    pub const MODERATION_LOGS: &str = "moderation_logs";
    pub const ANALYTICS_DASHBOARD: &str = "analytics_dashboard";
    pub const PROFESSIONAL_TOOLS: &str = "professional_tools";
    pub const ORGANIZATION_SETTINGS: &str = "organization_settings";
    pub const NOMINATE_MODERATORS: &str = "nominate_moderators";
    pub const USER_MANAGEMENT: &str = "user_management";
    pub const ADMIN_DASHBOARD: &str = "admin_dashboard";
}

/// 目的地 ID（稳定字符串，不绑定 UI 类型）
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DestinationId(String);

impl DestinationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DestinationId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl Borrow<str> for DestinationId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DestinationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// 单个目的地的访问要求
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationRequirement {
    pub allow_unauthenticated: bool,
    pub require_authentication: bool,
    pub required_role: Option<AccountType>,
    pub required_permission: Option<Capability>,
    pub min_rank: Option<u8>,
}

impl NavigationRequirement {
    /// 任何人可访问
    pub fn public() -> Self {
        Self {
            allow_unauthenticated: true,
            ..Self::default()
        }
    }

    /// 需要登录
    pub fn authenticated() -> Self {
        Self {
            require_authentication: true,
            ..Self::default()
        }
    }

    pub fn with_role(mut self, role: AccountType) -> Self {
        self.required_role = Some(role);
        self
    }

    pub fn with_permission(mut self, capability: Capability) -> Self {
        self.required_permission = Some(capability);
        self
    }

    pub fn with_min_rank(mut self, rank: u8) -> Self {
        self.min_rank = Some(rank);
        self
    }
}

impl TryFrom<&NavigationRuleConfig> for NavigationRequirement {
    type Error = ModerationError;

    fn try_from(rule: &NavigationRuleConfig) -> Result<Self, Self::Error> {
        let invalid = |reason: String| {
            ModerationError::InvalidNavigationRule(format!("{}: {}", rule.destination, reason))
        };

        let required_role = rule
            .required_role
            .as_deref()
            .map(str::parse::<AccountType>)
            .transpose()
            .map_err(invalid)?;

        let required_permission = rule
            .required_permission
            .as_deref()
            .map(str::parse::<Capability>)
            .transpose()
            .map_err(invalid)?;

        let max_rank = AccountType::Administrator.rank();
        if let Some(rank) = rule.min_rank.filter(|rank| *rank > max_rank) {
            return Err(invalid(format!("min_rank {} exceeds {}", rank, max_rank)));
        }

        let restricted =
            required_role.is_some() || required_permission.is_some() || rule.min_rank.is_some();
        if rule.allow_unauthenticated && (rule.require_authentication || restricted) {
            return Err(invalid(
                "allow_unauthenticated cannot be combined with other requirements".to_string(),
            ));
        }

        Ok(Self {
            allow_unauthenticated: rule.allow_unauthenticated,
            require_authentication: rule.require_authentication,
            required_role,
            required_permission,
            min_rank: rule.min_rank,
        })
    }
}

/// 目的地 -> 访问要求
#[derive(Debug, Clone, Default)]
pub struct NavigationTable {
    routes: HashMap<DestinationId, NavigationRequirement>,
}

impl NavigationTable {
    pub fn new(routes: impl IntoIterator<Item = (DestinationId, NavigationRequirement)>) -> Self {
        Self {
            routes: routes.into_iter().collect(),
        }
    }

    /// 内置规则表
    pub fn with_defaults() -> Self {
        use self::destinations::*;

        let authenticated = NavigationRequirement::authenticated;
        Self::new([
            (DestinationId::new(HOME), NavigationRequirement::public()),
            (DestinationId::new(LOGIN), NavigationRequirement::public()),
            (DestinationId::new(FIELD_GUIDE), NavigationRequirement::public()),
            (DestinationId::new(SPOT_DETAILS), authenticated()),
            (DestinationId::new(MY_SPOTS), authenticated()),
            (
                DestinationId::new(CREATE_SPOT),
                authenticated().with_permission(Capability::CreateContent),
            ),
            (
                DestinationId::new(MODERATION_QUEUE),
                authenticated().with_permission(Capability::ValidateContent),
            ),
            (
                DestinationId::new(SAFETY_REVIEW_QUEUE),
                authenticated()
                    .with_permission(Capability::ValidateContent)
                    .with_min_rank(AccountType::ExpertModerator.rank()),
            ),
            (
                DestinationId::new(MODERATION_LOGS),
                authenticated().with_permission(Capability::ViewModerationLogs),
            ),
            (
                DestinationId::new(ANALYTICS_DASHBOARD),
                authenticated().with_permission(Capability::ViewAnalytics),
            ),
            (
                DestinationId::new(PROFESSIONAL_TOOLS),
                authenticated().with_permission(Capability::ProfessionalFeatures),
            ),
            (
                DestinationId::new(ORGANIZATION_SETTINGS),
                authenticated().with_permission(Capability::ManageOrganization),
            ),
            (
                DestinationId::new(NOMINATE_MODERATORS),
                authenticated().with_permission(Capability::NominateModerators),
            ),
            (
                DestinationId::new(USER_MANAGEMENT),
                authenticated().with_permission(Capability::ManageUsers),
            ),
            (
                DestinationId::new(ADMIN_DASHBOARD),
                authenticated().with_role(AccountType::Administrator),
            ),
        ])
    }

    /// 内置规则 + 配置覆盖；任一配置项非法则整体失败
    pub fn from_config(rules: &[NavigationRuleConfig]) -> Result<Self, ModerationError> {
        let mut table = Self::with_defaults();
        for rule in rules {
            let requirement = NavigationRequirement::try_from(rule)?;
            table.routes.insert(DestinationId::new(&rule.destination), requirement);
        }
        Ok(table)
    }

    pub fn get(&self, destination: &str) -> Option<&NavigationRequirement> {
        self.routes.get(destination.trim())
    }

    pub fn contains(&self, destination: &str) -> bool {
        self.get(destination).is_some()
    }

    /// 所有已注册目的地，按 ID 排序
    pub fn destinations(&self) -> Vec<&DestinationId> {
        let mut ids: Vec<&DestinationId> = self.routes.keys().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(destination: &str) -> NavigationRuleConfig {
        NavigationRuleConfig {
            destination: destination.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults_cover_public_and_admin_routes() {
        let table = NavigationTable::with_defaults();
        assert!(table.get(destinations::HOME).unwrap().allow_unauthenticated);
        assert_eq!(
            table.get(destinations::ADMIN_DASHBOARD).unwrap().required_role,
            Some(AccountType::Administrator)
        );
        assert!(table.get("unknown_place").is_none());
    }

    #[test]
    fn test_config_overrides_default() {
        let mut analytics = rule(destinations::ANALYTICS_DASHBOARD);
        analytics.require_authentication = true;
        analytics.min_rank = Some(3);

        let table = NavigationTable::from_config(&[analytics]).unwrap();
        let requirement = table.get(destinations::ANALYTICS_DASHBOARD).unwrap();
        assert_eq!(requirement.min_rank, Some(3));
        assert_eq!(requirement.required_permission, None);
    }

    #[test]
    fn test_config_adds_destination() {
        let mut calendar = rule("foraging_calendar");
        calendar.require_authentication = true;
        calendar.required_permission = Some("view_analytics".to_string());
        calendar.required_role = Some("verified_professional".to_string());

        let table = NavigationTable::from_config(&[calendar]).unwrap();
        let requirement = table.get("foraging_calendar").unwrap();
        assert_eq!(requirement.required_permission, Some(Capability::ViewAnalytics));
        assert_eq!(requirement.required_role, Some(AccountType::VerifiedProfessional));
        assert_eq!(table.len(), NavigationTable::with_defaults().len() + 1);
    }

    #[test]
    fn test_unknown_permission_is_rejected() {
        let mut bad = rule("secret_grove");
        bad.required_permission = Some("summon_mushrooms".to_string());

        let err = NavigationTable::from_config(&[bad]).unwrap_err();
        assert!(matches!(err, ModerationError::InvalidNavigationRule(_)));
        assert!(err.to_string().contains("secret_grove"));
    }

    #[test]
    fn test_unknown_role_is_rejected() {
        let mut bad = rule("secret_grove");
        bad.required_role = Some("wizard".to_string());
        assert!(NavigationTable::from_config(&[bad]).is_err());
    }

    #[test]
    fn test_rank_out_of_range_is_rejected() {
        let mut bad = rule("secret_grove");
        bad.min_rank = Some(4);
        assert!(NavigationTable::from_config(&[bad]).is_err());
    }

    #[test]
    fn test_public_rule_with_restrictions_is_rejected() {
        let mut bad = rule("secret_grove");
        bad.allow_unauthenticated = true;
        bad.min_rank = Some(1);
        assert!(NavigationTable::from_config(&[bad]).is_err());
    }

    #[test]
    fn test_destinations_are_sorted() {
        let table = NavigationTable::with_defaults();
        let ids: Vec<&str> = table.destinations().into_iter().map(DestinationId::as_str).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }
}
