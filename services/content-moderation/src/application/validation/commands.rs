//! 审核流程命令定义

use spot_auth_core::Specialization;
use spot_common::utils::is_blank;
use spot_common::{ContentId, UserId};

use crate::domain::content::{SafetyFlag, SafetyOutcome};
use crate::error::ModerationError;

/// 提交内容命令
#[derive(Debug, Clone)]
pub struct SubmitContentCommand {
    pub actor_id: UserId,
    pub title: String,
    pub required_specialization: Option<Specialization>,
}

impl SubmitContentCommand {
    pub fn new(actor_id: UserId, title: impl Into<String>) -> Self {
        Self {
            actor_id,
            title: title.into(),
            required_specialization: None,
        }
    }

    pub fn validate(&self) -> Result<(), ModerationError> {
        if is_blank(&self.title) {
            return Err(ModerationError::EmptyTitle);
        }
        Ok(())
    }
}

/// 分配审核命令
#[derive(Debug, Clone)]
pub struct AssignForReviewCommand {
    pub content_id: ContentId,
    pub actor_id: UserId,
    pub notes: Option<String>,
}

/// 审核通过命令
#[derive(Debug, Clone)]
pub struct ApproveContentCommand {
    pub content_id: ContentId,
    pub actor_id: UserId,
    pub notes: Option<String>,
}

/// 审核驳回命令
#[derive(Debug, Clone)]
pub struct RejectContentCommand {
    pub content_id: ContentId,
    pub actor_id: UserId,
    pub reasons: Vec<String>,
}

impl RejectContentCommand {
    /// 至少一条非空原因
    pub fn validate(&self) -> Result<(), ModerationError> {
        if self.reasons.iter().all(|reason| is_blank(reason)) {
            return Err(ModerationError::MissingRejectionReason);
        }
        Ok(())
    }

    /// 去除空白原因
    pub fn normalized_reasons(&self) -> Vec<String> {
        self.reasons
            .iter()
            .filter(|reason| !is_blank(reason))
            .map(|reason| reason.trim().to_string())
            .collect()
    }
}

/// 标记安全复审命令
#[derive(Debug, Clone)]
pub struct FlagForSafetyReviewCommand {
    pub content_id: ContentId,
    pub actor_id: UserId,
    pub flag: SafetyFlag,
}

impl FlagForSafetyReviewCommand {
    pub fn validate(&self) -> Result<(), ModerationError> {
        if is_blank(&self.flag.details) {
            return Err(ModerationError::MissingSafetyDetails);
        }
        Ok(())
    }
}

/// 完成安全复审命令
#[derive(Debug, Clone)]
pub struct CompleteSafetyReviewCommand {
    pub content_id: ContentId,
    pub actor_id: UserId,
    pub outcome: SafetyOutcome,
    pub notes: Option<String>,
}

/// 归档命令
#[derive(Debug, Clone)]
pub struct ArchiveContentCommand {
    pub content_id: ContentId,
    pub actor_id: UserId,
    pub reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::content::SafetySeverity;

    #[test]
    fn test_reject_requires_reason() {
        let mut cmd = RejectContentCommand {
            content_id: ContentId::new(),
            actor_id: UserId::new(),
            reasons: vec![],
        };
        assert!(cmd.validate().is_err());

        cmd.reasons = vec!["   ".to_string(), String::new()];
        assert!(cmd.validate().is_err());

        cmd.reasons.push(" Poisonous look-alike ".to_string());
        assert!(cmd.validate().is_ok());
        assert_eq!(cmd.normalized_reasons(), vec!["Poisonous look-alike".to_string()]);
    }

    #[test]
    fn test_flag_requires_details() {
        let cmd = FlagForSafetyReviewCommand {
            content_id: ContentId::new(),
            actor_id: UserId::new(),
            flag: SafetyFlag::new(SafetySeverity::High, "\t"),
        };
        assert!(matches!(cmd.validate(), Err(ModerationError::MissingSafetyDetails)));
    }

    #[test]
    fn test_submit_requires_title() {
        assert!(SubmitContentCommand::new(UserId::new(), " ").validate().is_err());
        assert!(SubmitContentCommand::new(UserId::new(), "Oyster log").validate().is_ok());
    }
}
