//! 审核状态

use serde::{Deserialize, Serialize};

/// 内容审核状态
///
/// ```text
/// Pending ──> UnderReview ──> Approved
///    │             │  └─────> Rejected
///    │             └──> SafetyReview ──> Approved / Rejected
///    └──────────────> Archived <── (UnderReview, SafetyReview)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    Pending,
    UnderReview,
    Approved,
    Rejected,
    SafetyReview,
    Archived,
}

impl ValidationStatus {
    pub const ALL: [ValidationStatus; 6] = [
        ValidationStatus::Pending,
        ValidationStatus::UnderReview,
        ValidationStatus::Approved,
        ValidationStatus::Rejected,
        ValidationStatus::SafetyReview,
        ValidationStatus::Archived,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            ValidationStatus::Pending => "pending",
            ValidationStatus::UnderReview => "under_review",
            ValidationStatus::Approved => "approved",
            ValidationStatus::Rejected => "rejected",
            ValidationStatus::SafetyReview => "safety_review",
            ValidationStatus::Archived => "archived",
        }
    }

    /// 终态不允许任何后续转换
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            ValidationStatus::Approved | ValidationStatus::Rejected | ValidationStatus::Archived
        )
    }

    /// 状态图中是否存在 `self -> next` 的边
    pub const fn can_transition_to(self, next: ValidationStatus) -> bool {
        use ValidationStatus::*;

        matches!(
            (self, next),
            (Pending, UnderReview)
                | (Pending, Archived)
                | (UnderReview, Approved)
                | (UnderReview, Rejected)
                | (UnderReview, SafetyReview)
                | (UnderReview, Archived)
                | (SafetyReview, Approved)
                | (SafetyReview, Rejected)
                | (SafetyReview, Archived)
        )
    }
}

impl std::fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
