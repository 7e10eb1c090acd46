//! 内容审核领域事件

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use spot_common::{ContentId, UserId};
use spot_event_core::DomainEvent;
use uuid::Uuid;

use super::status::ValidationStatus;

/// 安全问题严重程度
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SafetySeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl SafetySeverity {
    pub const fn as_str(self) -> &'static str {
        match self {
            SafetySeverity::Low => "low",
            SafetySeverity::Medium => "medium",
            SafetySeverity::High => "high",
            SafetySeverity::Critical => "critical",
        }
    }
}

/// 安全标记
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetyFlag {
    pub severity: SafetySeverity,
    pub details: String,
}

impl SafetyFlag {
    pub fn new(severity: SafetySeverity, details: impl Into<String>) -> Self {
        Self {
            severity,
            details: details.into(),
        }
    }
}

/// 安全复审结论
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SafetyOutcome {
    /// 确认安全，内容通过
    Cleared,
    /// 确认不安全，内容驳回
    Unsafe,
}

impl SafetyOutcome {
    pub const fn target_status(self) -> ValidationStatus {
        match self {
            SafetyOutcome::Cleared => ValidationStatus::Approved,
            SafetyOutcome::Unsafe => ValidationStatus::Rejected,
        }
    }
}

/// 所有审核事件共有的转换信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionInfo {
    pub event_id: Uuid,
    pub content_id: ContentId,
    pub actor_id: UserId,
    /// 新建内容没有前一状态
    pub previous_status: Option<ValidationStatus>,
    pub new_status: ValidationStatus,
    pub occurred_at: DateTime<Utc>,
}

impl TransitionInfo {
    pub fn new(
        content_id: ContentId,
        actor_id: UserId,
        previous_status: Option<ValidationStatus>,
        new_status: ValidationStatus,
    ) -> Self {
        Self {
            event_id: Uuid::now_v7(),
            content_id,
            actor_id,
            previous_status,
            new_status,
            occurred_at: Utc::now(),
        }
    }

    /// 同一次转换派生的另一个事件使用新的事件 ID
    fn reissue(&self) -> Self {
        Self {
            event_id: Uuid::now_v7(),
            ..self.clone()
        }
    }
}

/// 内容审核领域事件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ValidationEvent {
    ContentSubmitted {
        transition: TransitionInfo,
        title: String,
    },
    ReviewAssigned {
        transition: TransitionInfo,
        notes: Option<String>,
    },
    ContentApproved {
        transition: TransitionInfo,
        notes: Option<String>,
    },
    ContentRejected {
        transition: TransitionInfo,
        reasons: Vec<String>,
    },
    ContentFlaggedForSafety {
        transition: TransitionInfo,
        flag: SafetyFlag,
    },
    SafetyReviewCompleted {
        transition: TransitionInfo,
        outcome: SafetyOutcome,
        notes: Option<String>,
    },
    ContentArchived {
        transition: TransitionInfo,
        reason: Option<String>,
    },
    /// 每次状态转换都会额外发出
    StatusChanged { transition: TransitionInfo },
}

/// 事件标签（不含负载）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValidationEventKind {
    ContentSubmitted,
    ReviewAssigned,
    ContentApproved,
    ContentRejected,
    ContentFlaggedForSafety,
    SafetyReviewCompleted,
    ContentArchived,
    StatusChanged,
}

impl ValidationEventKind {
    pub const ALL: [ValidationEventKind; 8] = [
        ValidationEventKind::ContentSubmitted,
        ValidationEventKind::ReviewAssigned,
        ValidationEventKind::ContentApproved,
        ValidationEventKind::ContentRejected,
        ValidationEventKind::ContentFlaggedForSafety,
        ValidationEventKind::SafetyReviewCompleted,
        ValidationEventKind::ContentArchived,
        ValidationEventKind::StatusChanged,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ContentSubmitted => "ContentSubmitted",
            Self::ReviewAssigned => "ReviewAssigned",
            Self::ContentApproved => "ContentApproved",
            Self::ContentRejected => "ContentRejected",
            Self::ContentFlaggedForSafety => "ContentFlaggedForSafety",
            Self::SafetyReviewCompleted => "SafetyReviewCompleted",
            Self::ContentArchived => "ContentArchived",
            Self::StatusChanged => "StatusChanged",
        }
    }
}

impl ValidationEvent {
    /// 转换信息
    pub fn transition(&self) -> &TransitionInfo {
        match self {
            Self::ContentSubmitted { transition, .. }
            | Self::ReviewAssigned { transition, .. }
            | Self::ContentApproved { transition, .. }
            | Self::ContentRejected { transition, .. }
            | Self::ContentFlaggedForSafety { transition, .. }
            | Self::SafetyReviewCompleted { transition, .. }
            | Self::ContentArchived { transition, .. }
            | Self::StatusChanged { transition } => transition,
        }
    }

    pub fn content_id(&self) -> ContentId {
        self.transition().content_id
    }

    pub fn actor_id(&self) -> UserId {
        self.transition().actor_id
    }

    /// 为同一次转换生成对应的 StatusChanged 事件
    pub fn status_changed(&self) -> ValidationEvent {
        ValidationEvent::StatusChanged {
            transition: self.transition().reissue(),
        }
    }
}

impl DomainEvent for ValidationEvent {
    type Kind = ValidationEventKind;

    fn kind(&self) -> ValidationEventKind {
        match self {
            Self::ContentSubmitted { .. } => ValidationEventKind::ContentSubmitted,
            Self::ReviewAssigned { .. } => ValidationEventKind::ReviewAssigned,
            Self::ContentApproved { .. } => ValidationEventKind::ContentApproved,
            Self::ContentRejected { .. } => ValidationEventKind::ContentRejected,
            Self::ContentFlaggedForSafety { .. } => ValidationEventKind::ContentFlaggedForSafety,
            Self::SafetyReviewCompleted { .. } => ValidationEventKind::SafetyReviewCompleted,
            Self::ContentArchived { .. } => ValidationEventKind::ContentArchived,
            Self::StatusChanged { .. } => ValidationEventKind::StatusChanged,
        }
    }

    fn event_id(&self) -> Uuid {
        self.transition().event_id
    }

    fn event_type(&self) -> &'static str {
        self.kind().as_str()
    }

    fn aggregate_type(&self) -> &'static str {
        "Content"
    }

    fn aggregate_id(&self) -> String {
        self.content_id().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info() -> TransitionInfo {
        TransitionInfo::new(
            ContentId::new(),
            UserId::new(),
            Some(ValidationStatus::UnderReview),
            ValidationStatus::Rejected,
        )
    }

    #[test]
    fn test_kind_matches_variant() {
        let event = ValidationEvent::ContentRejected {
            transition: info(),
            reasons: vec!["Misidentified species".into()],
        };
        assert_eq!(event.kind(), ValidationEventKind::ContentRejected);
        assert_eq!(event.event_type(), "ContentRejected");
        assert_eq!(event.aggregate_type(), "Content");
    }

    #[test]
    fn test_status_changed_shares_transition() {
        let event = ValidationEvent::ContentApproved { transition: info(), notes: None };
        let changed = event.status_changed();

        assert_eq!(changed.kind(), ValidationEventKind::StatusChanged);
        assert_eq!(changed.content_id(), event.content_id());
        assert_eq!(changed.transition().new_status, event.transition().new_status);
        assert_ne!(changed.event_id(), event.event_id());
    }

    #[test]
    fn test_safety_outcome_targets() {
        assert_eq!(SafetyOutcome::Cleared.target_status(), ValidationStatus::Approved);
        assert_eq!(SafetyOutcome::Unsafe.target_status(), ValidationStatus::Rejected);
    }

    #[test]
    fn test_event_serializes_with_type_tag() {
        let event = ValidationEvent::StatusChanged { transition: info() };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "StatusChanged");
        assert_eq!(json["transition"]["new_status"], "rejected");
    }
}
