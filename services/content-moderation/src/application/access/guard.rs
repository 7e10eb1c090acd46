//! 访问守卫
//!
//! 决策逻辑（按顺序，第一个失败的规则即为拒绝原因）:
//! 1. 未注册的目的地：已登录且会话有效则允许
//! 2. 允许匿名访问：直接允许
//! 3. 要求登录但未登录：拒绝
//! 4. 会话已失效：拒绝
//! 5. 角色不符：拒绝
//! 6. 缺少权限：拒绝
//! 7. 层级不足：拒绝
//! 8. 允许

use std::sync::Arc;

use chrono::{DateTime, Utc};
use metrics::counter;
use spot_auth_core::{AccountType, ActorContext, ActorSession, Capability, has_permission};

use crate::domain::navigation::{DestinationId, NavigationTable};

/// 导航拒绝原因
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationDenial {
    NotAuthenticated,
    SessionExpired,
    RoleMismatch {
        required: AccountType,
        actual: AccountType,
    },
    MissingPermission(Capability),
    InsufficientRank {
        required: u8,
        actual: u8,
    },
}

impl NavigationDenial {
    /// 失败规则名称（日志与指标标签）
    pub const fn rule(&self) -> &'static str {
        match self {
            NavigationDenial::NotAuthenticated => "require_authentication",
            NavigationDenial::SessionExpired => "session_validity",
            NavigationDenial::RoleMismatch { .. } => "required_role",
            NavigationDenial::MissingPermission(_) => "required_permission",
            NavigationDenial::InsufficientRank { .. } => "min_rank",
        }
    }

    /// 面向用户的提示
    pub fn message(&self) -> String {
        match self {
            NavigationDenial::NotAuthenticated => "Please sign in to continue.".to_string(),
            NavigationDenial::SessionExpired => {
                "Your session has expired. Please sign in again.".to_string()
            }
            NavigationDenial::RoleMismatch { required, .. } => {
                format!("This area is only available to {} accounts.", required.as_str())
            }
            NavigationDenial::MissingPermission(capability) => {
                format!("You need the '{}' permission to open this page.", capability)
            }
            NavigationDenial::InsufficientRank { .. } => {
                "Your account level does not allow access to this page.".to_string()
            }
        }
    }
}

/// 导航决策
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationDecision {
    Allowed,
    Denied(NavigationDenial),
}

impl NavigationDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, NavigationDecision::Allowed)
    }

    pub fn denial(&self) -> Option<&NavigationDenial> {
        match self {
            NavigationDecision::Allowed => None,
            NavigationDecision::Denied(denial) => Some(denial),
        }
    }
}

/// 访问守卫
#[derive(Clone)]
pub struct AccessGuard {
    table: Arc<NavigationTable>,
}

impl AccessGuard {
    pub fn new(table: NavigationTable) -> Self {
        Self {
            table: Arc::new(table),
        }
    }

    pub fn table(&self) -> &NavigationTable {
        &self.table
    }

    /// 评估导航请求（纯函数，不记录日志）
    pub fn evaluate(&self, session: &ActorSession, destination: &str) -> NavigationDecision {
        self.evaluate_at(session, destination, Utc::now())
    }

    /// 在指定时间点评估导航请求
    pub fn evaluate_at(
        &self,
        session: &ActorSession,
        destination: &str,
        now: DateTime<Utc>,
    ) -> NavigationDecision {
        use NavigationDecision::{Allowed, Denied};

        let Some(requirement) = self.table.get(destination) else {
            return match validate_session(session, now) {
                Some(denial) => Denied(denial),
                None => Allowed,
            };
        };

        if requirement.allow_unauthenticated {
            return Allowed;
        }

        if requirement.require_authentication && !session.is_authenticated() {
            return Denied(NavigationDenial::NotAuthenticated);
        }

        if let Some(denial) = validate_session(session, now) {
            return Denied(denial);
        }

        let Some(actor) = session.actor() else {
            return Denied(NavigationDenial::NotAuthenticated);
        };

        if let Some(required) = requirement
            .required_role
            .filter(|role| *role != actor.account_type)
        {
            return Denied(NavigationDenial::RoleMismatch {
                required,
                actual: actor.account_type,
            });
        }

        if let Some(capability) = requirement
            .required_permission
            .filter(|capability| !has_permission(Some(actor), *capability))
        {
            return Denied(NavigationDenial::MissingPermission(capability));
        }

        if let Some(required) = requirement.min_rank.filter(|rank| actor.rank() < *rank) {
            return Denied(NavigationDenial::InsufficientRank {
                required,
                actual: actor.rank(),
            });
        }

        Allowed
    }

    /// 能否导航到目的地，拒绝时记录日志
    pub fn can_navigate_to(&self, session: &ActorSession, destination: &str) -> bool {
        match self.evaluate(session, destination) {
            NavigationDecision::Allowed => {
                counter!("navigation_checks_total", "allowed" => "true").increment(1);
                true
            }
            NavigationDecision::Denied(denial) => {
                tracing::warn!(
                    destination = destination,
                    rule = denial.rule(),
                    user_id = ?session.actor_id(),
                    "Navigation denied"
                );
                counter!("navigation_checks_total", "allowed" => "false").increment(1);
                counter!("navigation_denials_total", "rule" => denial.rule()).increment(1);
                false
            }
        }
    }

    /// 拒绝原因（允许时为 None）
    pub fn access_denied_message(&self, session: &ActorSession, destination: &str) -> Option<String> {
        self.evaluate(session, destination)
            .denial()
            .map(NavigationDenial::message)
    }

    /// 基于环境会话的 `can_navigate_to`
    pub fn can_navigate_current<C: ActorContext + ?Sized>(&self, context: &C, destination: &str) -> bool {
        self.can_navigate_to(&context.current_session(), destination)
    }

    /// 基于环境会话的 `access_denied_message`
    pub fn access_denied_message_current<C: ActorContext + ?Sized>(
        &self,
        context: &C,
        destination: &str,
    ) -> Option<String> {
        self.access_denied_message(&context.current_session(), destination)
    }

    /// 会话可访问的全部已注册目的地（按 ID 排序）
    pub fn accessible_destinations(&self, session: &ActorSession) -> Vec<DestinationId> {
        let now = Utc::now();
        self.table
            .destinations()
            .into_iter()
            .filter(|id| self.evaluate_at(session, id.as_str(), now).is_allowed())
            .cloned()
            .collect()
    }
}

/// 会话必须已登录且未过期
fn validate_session(session: &ActorSession, now: DateTime<Utc>) -> Option<NavigationDenial> {
    if !session.is_authenticated() {
        Some(NavigationDenial::NotAuthenticated)
    } else if !session.is_valid_at(now) {
        Some(NavigationDenial::SessionExpired)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::navigation::{NavigationRequirement, destinations};
    use chrono::Duration;
    use spot_auth_core::{Account, Specialization};

    fn guard() -> AccessGuard {
        AccessGuard::new(NavigationTable::with_defaults())
    }

    fn session_for(account: Account) -> ActorSession {
        ActorSession::with_ttl(account, Duration::minutes(30))
    }

    #[test]
    fn test_public_destination_allows_anonymous() {
        let session = ActorSession::anonymous();
        assert!(guard().can_navigate_to(&session, destinations::HOME));
        assert_eq!(guard().access_denied_message(&session, destinations::HOME), None);
    }

    #[test]
    fn test_unregistered_destination_requires_login() {
        let guard = guard();
        assert_eq!(
            guard.evaluate(&ActorSession::anonymous(), "mystery_meadow"),
            NavigationDecision::Denied(NavigationDenial::NotAuthenticated)
        );

        let walker = session_for(Account::new("walker", AccountType::Standard));
        assert!(guard.can_navigate_to(&walker, "mystery_meadow"));
    }

    #[test]
    fn test_protected_destination_denies_anonymous() {
        let decision = guard().evaluate(&ActorSession::anonymous(), destinations::MY_SPOTS);
        assert_eq!(decision, NavigationDecision::Denied(NavigationDenial::NotAuthenticated));
    }

    #[test]
    fn test_expired_session_is_denied() {
        let account = Account::new("admin", AccountType::Administrator);
        let session = ActorSession::authenticated(account, Utc::now() - Duration::minutes(5));

        let decision = guard().evaluate(&session, destinations::ADMIN_DASHBOARD);
        assert_eq!(decision, NavigationDecision::Denied(NavigationDenial::SessionExpired));
    }

    #[test]
    fn test_role_mismatch() {
        let moderator = session_for(Account::active_moderator("mod", Specialization::Mycology));
        let decision = guard().evaluate(&moderator, destinations::ADMIN_DASHBOARD);
        assert_eq!(decision.denial().map(NavigationDenial::rule), Some("required_role"));
    }

    #[test]
    fn test_missing_permission_message_names_capability() {
        let walker = session_for(Account::new("walker", AccountType::Standard));
        let message = guard()
            .access_denied_message(&walker, destinations::MODERATION_QUEUE)
            .unwrap();
        assert!(message.contains("validate_content"));
    }

    #[test]
    fn test_min_rank() {
        let table = NavigationTable::new([(
            DestinationId::new("research_archive"),
            NavigationRequirement::authenticated().with_min_rank(2),
        )]);
        let guard = AccessGuard::new(table);

        let moderator = session_for(Account::active_moderator("mod", Specialization::Botany));
        assert_eq!(
            guard.evaluate(&moderator, "research_archive"),
            NavigationDecision::Denied(NavigationDenial::InsufficientRank { required: 2, actual: 1 })
        );

        let professional = session_for(Account::new("pro", AccountType::VerifiedProfessional));
        assert!(guard.can_navigate_to(&professional, "research_archive"));
    }

    #[test]
    fn test_administrator_opens_everything() {
        let guard = guard();
        let admin = session_for(Account::new("admin", AccountType::Administrator));
        let accessible = guard.accessible_destinations(&admin);
        assert_eq!(accessible.len(), guard.table().len());
    }

    #[test]
    fn test_accessible_destinations_for_anonymous_are_public_only() {
        let accessible = guard().accessible_destinations(&ActorSession::anonymous());
        let ids: Vec<&str> = accessible.iter().map(DestinationId::as_str).collect();
        assert_eq!(
            ids,
            vec![destinations::FIELD_GUIDE, destinations::HOME, destinations::LOGIN]
        );
    }

    #[test]
    fn test_ambient_form_reads_context() {
        let guard = guard();
        let session = session_for(Account::new("pro", AccountType::VerifiedProfessional));
        assert!(guard.can_navigate_current(&session, destinations::ANALYTICS_DASHBOARD));
        assert!(guard
            .access_denied_message_current(&session, destinations::USER_MANAGEMENT)
            .is_some());
    }
}
