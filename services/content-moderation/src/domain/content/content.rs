//! 内容记录（spot）聚合

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use spot_auth_core::{ContentResource, Specialization};
use spot_common::{AuditInfo, ContentId, UserId};
use spot_domain_core::{AggregateRoot, Entity};

use super::status::ValidationStatus;
use crate::error::ModerationError;

/// 带时间戳的安全备注
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetyNote {
    pub author_id: UserId,
    pub text: String,
    pub recorded_at: DateTime<Utc>,
}

/// 内容记录
///
/// 状态字段私有，只能经由 `transition_to` 按状态图变更。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentRecord {
    pub id: ContentId,
    pub creator_id: UserId,
    pub title: String,
    status: ValidationStatus,
    pub required_specialization: Option<Specialization>,
    pub reviewed_by: Option<UserId>,
    pub rejection_reasons: Vec<String>,
    pub safety_notes: Vec<SafetyNote>,
    pub audit_info: AuditInfo,
    version: u64,
}

impl ContentRecord {
    /// 创建待审核内容
    pub fn new(creator_id: UserId, title: impl Into<String>) -> Self {
        Self {
            id: ContentId::new(),
            creator_id,
            title: title.into(),
            status: ValidationStatus::Pending,
            required_specialization: None,
            reviewed_by: None,
            rejection_reasons: Vec::new(),
            safety_notes: Vec::new(),
            audit_info: AuditInfo::new(Some(creator_id)),
            version: 0,
        }
    }

    pub fn with_id(mut self, id: ContentId) -> Self {
        self.id = id;
        self
    }

    pub fn with_required_specialization(mut self, specialization: Specialization) -> Self {
        self.required_specialization = Some(specialization);
        self
    }

    pub fn status(&self) -> ValidationStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.audit_info.created_at
    }

    /// 按状态图转换，返回转换前的状态
    pub fn transition_to(
        &mut self,
        next: ValidationStatus,
        actor_id: UserId,
    ) -> Result<ValidationStatus, ModerationError> {
        let previous = self.status;
        if !previous.can_transition_to(next) {
            return Err(ModerationError::InvalidTransition {
                content_id: self.id,
                from: previous,
                to: next,
            });
        }

        self.status = next;
        self.audit_info.update(Some(actor_id));
        Ok(previous)
    }

    /// 记录审核结论的审核人
    pub fn mark_reviewed(&mut self, reviewer_id: UserId) {
        self.reviewed_by = Some(reviewer_id);
    }

    /// 追加安全备注
    pub fn add_safety_note(&mut self, author_id: UserId, text: impl Into<String>) {
        self.safety_notes.push(SafetyNote {
            author_id,
            text: text.into(),
            recorded_at: Utc::now(),
        });
    }

    pub fn record_rejection(&mut self, reasons: &[String]) {
        self.rejection_reasons.extend(reasons.iter().cloned());
    }
}

impl ContentResource for ContentRecord {
    fn creator_id(&self) -> &UserId {
        &self.creator_id
    }

    fn required_specialization(&self) -> Option<Specialization> {
        self.required_specialization
    }
}

impl Entity for ContentRecord {
    type Id = ContentId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl AggregateRoot for ContentRecord {
    fn audit_info(&self) -> &AuditInfo {
        &self.audit_info
    }

    fn audit_info_mut(&mut self) -> &mut AuditInfo {
        &mut self.audit_info
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn set_version(&mut self, version: u64) {
        self.version = version;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_content_is_pending() {
        let creator = UserId::new();
        let content = ContentRecord::new(creator, "Chanterelles by the creek");
        assert_eq!(content.status(), ValidationStatus::Pending);
        assert_eq!(content.version(), 0);
        assert_eq!(content.audit_info.created_by, Some(creator));
    }

    #[test]
    fn test_valid_transition_returns_previous() {
        let mut content = ContentRecord::new(UserId::new(), "Morels");
        let reviewer = UserId::new();

        let previous = content
            .transition_to(ValidationStatus::UnderReview, reviewer)
            .unwrap();

        assert_eq!(previous, ValidationStatus::Pending);
        assert_eq!(content.status(), ValidationStatus::UnderReview);
        assert_eq!(content.audit_info.updated_by, Some(reviewer));
    }

    #[test]
    fn test_invalid_transition_leaves_status() {
        let mut content = ContentRecord::new(UserId::new(), "Morels");
        let err = content
            .transition_to(ValidationStatus::Approved, UserId::new())
            .unwrap_err();

        assert!(matches!(err, ModerationError::InvalidTransition { .. }));
        assert_eq!(content.status(), ValidationStatus::Pending);
    }

    #[test]
    fn test_safety_notes_are_appended() {
        let mut content = ContentRecord::new(UserId::new(), "Amanita patch");
        let author = UserId::new();
        content.add_safety_note(author, "Looks like a death cap");
        content.add_safety_note(author, "Confirmed by spore print");

        assert_eq!(content.safety_notes.len(), 2);
        assert_eq!(content.safety_notes[1].text, "Confirmed by spore print");
        assert!(content.safety_notes[0].recorded_at <= content.safety_notes[1].recorded_at);
    }

    #[test]
    fn test_resource_view_exposes_specialization() {
        let content = ContentRecord::new(UserId::new(), "Ramps")
            .with_required_specialization(Specialization::Botany);
        assert_eq!(
            ContentResource::required_specialization(&content),
            Some(Specialization::Botany)
        );
    }
}
