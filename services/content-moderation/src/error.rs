use spot_common::{ContentId, UserId};
use spot_errors::AppError;
use thiserror::Error;

use crate::domain::content::ValidationStatus;

#[derive(Debug, Error)]
pub enum ModerationError {
    #[error("Content not found: {0}")]
    ContentNotFound(ContentId),
    #[error("Account not found: {0}")]
    AccountNotFound(UserId),
    #[error("Content {content_id} cannot move from {from} to {to}")]
    InvalidTransition {
        content_id: ContentId,
        from: ValidationStatus,
        to: ValidationStatus,
    },
    #[error("Content {content_id} must be {expected} to {operation}, but is {actual}")]
    UnexpectedStatus {
        content_id: ContentId,
        operation: &'static str,
        expected: &'static str,
        actual: ValidationStatus,
    },
    #[error("Rejection requires at least one reason")]
    MissingRejectionReason,
    #[error("Safety flag requires details")]
    MissingSafetyDetails,
    #[error("Content title must not be empty")]
    EmptyTitle,
    #[error("Content {content_id} was modified concurrently (expected version {expected}, found {actual})")]
    VersionConflict {
        content_id: ContentId,
        expected: u64,
        actual: u64,
    },
    #[error("Content already exists: {0}")]
    ContentAlreadyExists(ContentId),
    #[error("Invalid navigation rule: {0}")]
    InvalidNavigationRule(String),
    #[error("Session TTL must be within 1..={max} minutes, got {minutes}")]
    InvalidSessionTtl { minutes: i64, max: i64 },
    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<ModerationError> for AppError {
    fn from(error: ModerationError) -> Self {
        let message = error.to_string();
        match error {
            ModerationError::ContentNotFound(_) | ModerationError::AccountNotFound(_) => {
                AppError::NotFound(message)
            }
            ModerationError::InvalidTransition { .. } | ModerationError::UnexpectedStatus { .. } => {
                AppError::InvalidState(message)
            }
            ModerationError::MissingRejectionReason
            | ModerationError::MissingSafetyDetails
            | ModerationError::EmptyTitle => AppError::Validation(message),
            ModerationError::VersionConflict { .. } | ModerationError::ContentAlreadyExists(_) => {
                AppError::Conflict(message)
            }
            ModerationError::InvalidNavigationRule(_) | ModerationError::InvalidSessionTtl { .. } => {
                AppError::Configuration(message)
            }
            ModerationError::Storage(_) => AppError::Persistence(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spot_errors::ErrorKind;

    #[test]
    fn test_error_kinds() {
        let id = ContentId::new();
        let cases = [
            (ModerationError::ContentNotFound(id), ErrorKind::NotFound),
            (
                ModerationError::InvalidTransition {
                    content_id: id,
                    from: ValidationStatus::Pending,
                    to: ValidationStatus::Approved,
                },
                ErrorKind::InvalidState,
            ),
            (ModerationError::MissingRejectionReason, ErrorKind::Validation),
            (
                ModerationError::VersionConflict { content_id: id, expected: 1, actual: 2 },
                ErrorKind::Conflict,
            ),
            (ModerationError::Storage("disk full".into()), ErrorKind::Persistence),
            (
                ModerationError::InvalidSessionTtl { minutes: -5, max: 43_200 },
                ErrorKind::Configuration,
            ),
        ];

        for (error, kind) in cases {
            assert_eq!(AppError::from(error).kind(), kind);
        }
    }

    #[test]
    fn test_transition_message_names_states() {
        let err: AppError = ModerationError::InvalidTransition {
            content_id: ContentId::new(),
            from: ValidationStatus::Pending,
            to: ValidationStatus::Approved,
        }
        .into();
        assert!(err.message().contains("pending"));
        assert!(err.message().contains("approved"));
    }
}
