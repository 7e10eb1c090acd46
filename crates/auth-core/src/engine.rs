//! 授权决策引擎
//!
//! 全部为纯函数：输入账户与资源的值，输出决策。缺失数据一律按最严格结果处理
//! （拒绝 / false / 空集合）。

use serde::{Deserialize, Serialize};
use spot_common::UserId;
use spot_errors::{AppError, AppResult};

use crate::account::{Account, AccountType, Specialization};
use crate::permission::{Capability, Permissions};

/// 内容操作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentAction {
    View,
    Create,
    Edit,
    Delete,
    Validate,
    Reject,
    Archive,
    Moderate,
    SafetyReview,
}

impl ContentAction {
    pub const ALL: [ContentAction; 9] = [
        ContentAction::View,
        ContentAction::Create,
        ContentAction::Edit,
        ContentAction::Delete,
        ContentAction::Validate,
        ContentAction::Reject,
        ContentAction::Archive,
        ContentAction::Moderate,
        ContentAction::SafetyReview,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            ContentAction::View => "view",
            ContentAction::Create => "create",
            ContentAction::Edit => "edit",
            ContentAction::Delete => "delete",
            ContentAction::Validate => "validate",
            ContentAction::Reject => "reject",
            ContentAction::Archive => "archive",
            ContentAction::Moderate => "moderate",
            ContentAction::SafetyReview => "safety_review",
        }
    }
}

impl std::fmt::Display for ContentAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ContentAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        ContentAction::ALL
            .into_iter()
            .find(|a| a.as_str() == normalized)
            .ok_or_else(|| format!("unknown content action: {}", s))
    }
}

/// 受控内容需要暴露给引擎的最小视图
pub trait ContentResource {
    fn creator_id(&self) -> &UserId;

    /// 审核该内容所需的专长（目前仅记录，不参与基础判定）
    fn required_specialization(&self) -> Option<Specialization> {
        None
    }
}

/// 拒绝原因
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenialReason {
    /// 没有操作者
    NoActor,
    /// 缺少权限
    MissingPermission(Capability),
    /// 既不是创建者也没有权限
    NotCreator(Capability),
    /// 有权限但不具备审核该内容的资格
    NotQualifiedValidator,
    /// 无法识别的操作
    UnknownAction(String),
}

impl std::fmt::Display for DenialReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DenialReason::NoActor => write!(f, "no acting user"),
            DenialReason::MissingPermission(c) => write!(f, "missing permission: {}", c),
            DenialReason::NotCreator(c) => {
                write!(f, "not the creator and missing permission: {}", c)
            }
            DenialReason::NotQualifiedValidator => {
                write!(f, "not qualified to validate this content")
            }
            DenialReason::UnknownAction(a) => write!(f, "unknown action: {}", a),
        }
    }
}

/// 授权决策
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationDecision {
    Allowed,
    Denied(DenialReason),
}

impl AuthorizationDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AuthorizationDecision::Allowed)
    }

    pub fn denial_reason(&self) -> Option<&DenialReason> {
        match self {
            AuthorizationDecision::Allowed => None,
            AuthorizationDecision::Denied(reason) => Some(reason),
        }
    }

    fn require(actor: &Account, capability: Capability) -> Self {
        if has_permission(Some(actor), capability) {
            AuthorizationDecision::Allowed
        } else {
            AuthorizationDecision::Denied(DenialReason::MissingPermission(capability))
        }
    }
}

/// 计算有效权限
///
/// 显式权限 ∪ 角色权限 ∪ 版主加成（激活的专家版主）∪ 专业人士加成。
/// 管理员直接替换为全集，不做并集，也不可单独撤销。
pub fn effective_permissions(account: Option<&Account>) -> Permissions {
    let Some(account) = account else {
        return Permissions::empty();
    };

    if account.account_type == AccountType::Administrator {
        return Permissions::all();
    }

    let mut permissions = account.permissions | account.account_type.role_permissions();

    if account.is_active_moderator() {
        permissions |= Permissions::MODERATOR_BONUS;
    }

    if account.account_type == AccountType::VerifiedProfessional {
        permissions |= Permissions::PROFESSIONAL_BONUS;
    }

    permissions
}

/// 操作者是否拥有某项能力
pub fn has_permission(actor: Option<&Account>, capability: Capability) -> bool {
    effective_permissions(actor).contains_capability(capability)
}

/// 操作者是否有资格审核指定内容
///
/// 管理员总是可以；激活的专家版主可以审核任何内容。专长与内容要求的匹配
/// 在这里是扩展点，目前不强制。
pub fn can_validate_content<C: ContentResource + ?Sized>(actor: &Account, _content: &C) -> bool {
    actor.is_administrator() || actor.is_active_moderator()
}

/// 带原因的内容操作授权
pub fn authorize_content_action<C: ContentResource + ?Sized>(
    actor: Option<&Account>,
    content: &C,
    action: ContentAction,
) -> AuthorizationDecision {
    if action == ContentAction::View {
        return AuthorizationDecision::Allowed;
    }

    let Some(actor) = actor else {
        return AuthorizationDecision::Denied(DenialReason::NoActor);
    };

    let is_creator = &actor.id == content.creator_id();

    match action {
        ContentAction::View => AuthorizationDecision::Allowed,
        ContentAction::Create => AuthorizationDecision::require(actor, Capability::CreateContent),
        ContentAction::Edit => {
            if is_creator || has_permission(Some(actor), Capability::ValidateContent) {
                AuthorizationDecision::Allowed
            } else {
                AuthorizationDecision::Denied(DenialReason::NotCreator(Capability::ValidateContent))
            }
        }
        ContentAction::Delete => {
            if is_creator || has_permission(Some(actor), Capability::AdminAccess) {
                AuthorizationDecision::Allowed
            } else {
                AuthorizationDecision::Denied(DenialReason::NotCreator(Capability::AdminAccess))
            }
        }
        ContentAction::Validate | ContentAction::Reject => {
            if !has_permission(Some(actor), Capability::ValidateContent) {
                AuthorizationDecision::Denied(DenialReason::MissingPermission(
                    Capability::ValidateContent,
                ))
            } else if !can_validate_content(actor, content) {
                AuthorizationDecision::Denied(DenialReason::NotQualifiedValidator)
            } else {
                AuthorizationDecision::Allowed
            }
        }
        ContentAction::Archive => AuthorizationDecision::require(actor, Capability::AdminAccess),
        ContentAction::Moderate | ContentAction::SafetyReview => {
            AuthorizationDecision::require(actor, Capability::ValidateContent)
        }
    }
}

/// 操作者能否对内容执行操作
pub fn can_perform_content_action<C: ContentResource + ?Sized>(
    actor: Option<&Account>,
    content: &C,
    action: ContentAction,
) -> bool {
    authorize_content_action(actor, content, action).is_allowed()
}

/// 按名称的操作授权，未知操作一律拒绝
pub fn authorize_named_action<C: ContentResource + ?Sized>(
    actor: Option<&Account>,
    content: &C,
    action: &str,
) -> AuthorizationDecision {
    match action.parse::<ContentAction>() {
        Ok(action) => authorize_content_action(actor, content, action),
        Err(_) => AuthorizationDecision::Denied(DenialReason::UnknownAction(action.to_string())),
    }
}

/// 授权失败时转换为 Forbidden 错误
pub fn ensure_content_action<C: ContentResource + ?Sized>(
    actor: &Account,
    content: &C,
    action: ContentAction,
) -> AppResult<()> {
    match authorize_content_action(Some(actor), content, action) {
        AuthorizationDecision::Allowed => Ok(()),
        AuthorizationDecision::Denied(reason) => Err(AppError::forbidden(format!(
            "User {} may not {} this content: {}",
            actor.id, action, reason
        ))),
    }
}

/// 操作者能否审核某专长领域
pub fn can_moderate_specialization(actor: Option<&Account>, specialization: Specialization) -> bool {
    let Some(actor) = actor else {
        return false;
    };

    match actor.account_type {
        AccountType::Administrator => true,
        AccountType::ExpertModerator => {
            actor.is_active_moderator() && actor.specialization == specialization
        }
        AccountType::Standard | AccountType::VerifiedProfessional => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::ModeratorStatus;

    struct Spot {
        creator: UserId,
    }

    impl ContentResource for Spot {
        fn creator_id(&self) -> &UserId {
            &self.creator
        }
    }

    fn spot_by(creator: &Account) -> Spot {
        Spot { creator: creator.id }
    }

    fn someone_elses_spot() -> Spot {
        Spot { creator: UserId::new() }
    }

    #[test]
    fn test_null_actor_has_nothing() {
        assert_eq!(effective_permissions(None), Permissions::empty());
        for capability in Capability::ALL {
            assert!(!has_permission(None, capability));
        }
    }

    #[test]
    fn test_standard_role_permissions() {
        let account = Account::new("walker", AccountType::Standard);
        let permissions = effective_permissions(Some(&account));
        assert_eq!(permissions, Permissions::CREATE_CONTENT);
    }

    #[test]
    fn test_moderator_bonus_requires_active_status() {
        let inactive = Account::new("mod", AccountType::ExpertModerator);
        assert!(!has_permission(Some(&inactive), Capability::ValidateContent));
        assert!(has_permission(Some(&inactive), Capability::ViewModerationLogs));

        let active = inactive.with_moderator_status(ModeratorStatus::Active);
        assert!(has_permission(Some(&active), Capability::ValidateContent));
        assert!(has_permission(Some(&active), Capability::ModerateContent));
        assert!(!has_permission(Some(&active), Capability::AdminAccess));
    }

    #[test]
    fn test_professional_bonus() {
        let account = Account::new("guide", AccountType::VerifiedProfessional);
        assert!(has_permission(Some(&account), Capability::ProfessionalFeatures));
        assert!(has_permission(Some(&account), Capability::ManageOrganization));
        assert!(has_permission(Some(&account), Capability::ViewAnalytics));
        assert!(!has_permission(Some(&account), Capability::ValidateContent));
    }

    #[test]
    fn test_administrator_always_full_set() {
        let admin = Account::new("root", AccountType::Administrator);
        assert_eq!(effective_permissions(Some(&admin)), Permissions::all());

        let with_explicit = admin.with_permissions(Permissions::VIEW_ANALYTICS);
        assert_eq!(effective_permissions(Some(&with_explicit)), Permissions::all());
    }

    #[test]
    fn test_effective_permissions_monotone() {
        for account_type in AccountType::ALL {
            for status in [ModeratorStatus::Inactive, ModeratorStatus::Active] {
                let base = Account::new("a", account_type).with_moderator_status(status);
                let before = effective_permissions(Some(&base));
                for capability in Capability::ALL {
                    let extended = base.clone().with_permissions(capability.flag());
                    let after = effective_permissions(Some(&extended));
                    assert!(after.contains(before), "{:?} lost permissions", account_type);
                    assert!(after.contains_capability(capability));
                }
            }
        }
    }

    #[test]
    fn test_view_always_allowed() {
        let spot = someone_elses_spot();
        assert!(can_perform_content_action(None, &spot, ContentAction::View));
    }

    #[test]
    fn test_null_actor_denied_everything_but_view() {
        let spot = someone_elses_spot();
        for action in ContentAction::ALL {
            let allowed = can_perform_content_action(None, &spot, action);
            assert_eq!(allowed, action == ContentAction::View, "{}", action);
        }
    }

    #[test]
    fn test_edit_creator_or_validator() {
        let creator = Account::new("creator", AccountType::Standard);
        let stranger = Account::new("stranger", AccountType::VerifiedProfessional);
        let moderator = Account::active_moderator("mod", Specialization::Botany);
        let spot = spot_by(&creator);

        assert!(can_perform_content_action(Some(&creator), &spot, ContentAction::Edit));
        assert!(can_perform_content_action(Some(&moderator), &spot, ContentAction::Edit));
        assert!(!can_perform_content_action(Some(&stranger), &spot, ContentAction::Edit));

        let explicit = stranger.with_permissions(Permissions::VALIDATE_CONTENT);
        assert!(can_perform_content_action(Some(&explicit), &spot, ContentAction::Edit));
    }

    #[test]
    fn test_delete_creator_or_admin() {
        let creator = Account::new("creator", AccountType::Standard);
        let moderator = Account::active_moderator("mod", Specialization::Botany);
        let admin = Account::new("admin", AccountType::Administrator);
        let spot = spot_by(&creator);

        assert!(can_perform_content_action(Some(&creator), &spot, ContentAction::Delete));
        assert!(can_perform_content_action(Some(&admin), &spot, ContentAction::Delete));
        assert!(!can_perform_content_action(Some(&moderator), &spot, ContentAction::Delete));
    }

    #[test]
    fn test_validate_scenario_standard_vs_moderator() {
        let spot = someone_elses_spot();
        let standard = Account::new("walker", AccountType::Standard)
            .with_permissions(Permissions::CREATE_CONTENT);
        assert!(!can_perform_content_action(Some(&standard), &spot, ContentAction::Validate));

        let moderator = Account::active_moderator("mod", Specialization::Mycology);
        assert!(can_perform_content_action(Some(&moderator), &spot, ContentAction::Validate));
    }

    #[test]
    fn test_validate_requires_qualified_validator() {
        // 显式授予 ValidateContent 的普通用户仍不具备审核资格
        let spot = someone_elses_spot();
        let standard = Account::new("walker", AccountType::Standard)
            .with_permissions(Permissions::VALIDATE_CONTENT);
        let decision = authorize_content_action(Some(&standard), &spot, ContentAction::Reject);
        assert_eq!(
            decision,
            AuthorizationDecision::Denied(DenialReason::NotQualifiedValidator)
        );
        assert!(can_perform_content_action(Some(&standard), &spot, ContentAction::Moderate));
    }

    #[test]
    fn test_archive_requires_admin_access() {
        let spot = someone_elses_spot();
        let moderator = Account::active_moderator("mod", Specialization::Ecology);
        let admin = Account::new("admin", AccountType::Administrator);
        assert!(!can_perform_content_action(Some(&moderator), &spot, ContentAction::Archive));
        assert!(can_perform_content_action(Some(&admin), &spot, ContentAction::Archive));
    }

    #[test]
    fn test_unknown_named_action_denied() {
        let admin = Account::new("admin", AccountType::Administrator);
        let spot = someone_elses_spot();
        let decision = authorize_named_action(Some(&admin), &spot, "publish_to_twitter");
        assert!(!decision.is_allowed());
        assert!(authorize_named_action(Some(&admin), &spot, "archive").is_allowed());
    }

    #[test]
    fn test_ensure_content_action_forbidden_message() {
        let spot = someone_elses_spot();
        let standard = Account::new("walker", AccountType::Standard);
        let err = ensure_content_action(&standard, &spot, ContentAction::Validate).unwrap_err();
        assert_eq!(err.kind(), spot_errors::ErrorKind::Forbidden);
        assert!(err.message().contains("validate_content"));
    }

    #[test]
    fn test_can_moderate_specialization() {
        let admin = Account::new("admin", AccountType::Administrator);
        assert!(can_moderate_specialization(Some(&admin), Specialization::FoodSafety));

        let mycologist = Account::active_moderator("mod", Specialization::Mycology);
        assert!(can_moderate_specialization(Some(&mycologist), Specialization::Mycology));
        assert!(!can_moderate_specialization(Some(&mycologist), Specialization::Botany));

        let inactive = mycologist.with_moderator_status(ModeratorStatus::Inactive);
        assert!(!can_moderate_specialization(Some(&inactive), Specialization::Mycology));

        let professional = Account::new("pro", AccountType::VerifiedProfessional)
            .with_specialization(Specialization::Mycology);
        assert!(!can_moderate_specialization(Some(&professional), Specialization::Mycology));
        assert!(!can_moderate_specialization(None, Specialization::Mycology));
    }
}
