//! spot-errors - 统一错误处理
//!
//! 错误分类 + 对调用方统一的 `OperationResult` 返回结构

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 应用错误类型
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Handler failure: {0}")]
    HandlerFailure(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// 错误类别（不带消息，便于调用方匹配）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    NotFound,
    Forbidden,
    InvalidState,
    Persistence,
    HandlerFailure,
    Validation,
    Conflict,
    Unauthenticated,
    Configuration,
    Internal,
}

impl ErrorKind {
    /// 稳定的错误码，用于日志和指标标签
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::Forbidden => "FORBIDDEN",
            Self::InvalidState => "INVALID_STATE",
            Self::Persistence => "PERSISTENCE_ERROR",
            Self::HandlerFailure => "HANDLER_FAILURE",
            Self::Validation => "VALIDATION_ERROR",
            Self::Conflict => "CONFLICT",
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::Configuration => "CONFIGURATION_ERROR",
            Self::Internal => "INTERNAL_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }

    pub fn handler_failure(msg: impl Into<String>) -> Self {
        Self::HandlerFailure(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn unauthenticated(msg: impl Into<String>) -> Self {
        Self::Unauthenticated(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::InvalidState(_) => ErrorKind::InvalidState,
            Self::Persistence(_) => ErrorKind::Persistence,
            Self::HandlerFailure(_) => ErrorKind::HandlerFailure,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Unauthenticated(_) => ErrorKind::Unauthenticated,
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// 不带前缀的原始消息
    pub fn message(&self) -> &str {
        match self {
            Self::NotFound(msg)
            | Self::Forbidden(msg)
            | Self::InvalidState(msg)
            | Self::Persistence(msg)
            | Self::HandlerFailure(msg)
            | Self::Validation(msg)
            | Self::Conflict(msg)
            | Self::Unauthenticated(msg)
            | Self::Configuration(msg)
            | Self::Internal(msg) => msg,
        }
    }

    /// 面向最终用户的提示文本（内部细节只进日志）
    pub fn user_message(&self) -> String {
        match self {
            Self::Persistence(_) => "The change could not be saved. Please try again.".to_string(),
            Self::Internal(_) => "Something went wrong. Please try again later.".to_string(),
            Self::Conflict(_) => {
                "This item was changed by someone else. Refresh and try again.".to_string()
            }
            _ => self.to_string(),
        }
    }
}

/// Result 类型别名
pub type AppResult<T> = Result<T, AppError>;

/// 对外暴露的统一返回结构
///
/// 预期内的失败（not found / forbidden / invalid state / 持久化失败）都通过该结构返回，
/// 不会以 panic 的形式穿过边界。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationResult<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
}

impl<T> OperationResult<T> {
    pub fn ok(value: T) -> Self {
        Self {
            success: true,
            value: Some(value),
            error_message: None,
            error_kind: None,
        }
    }

    pub fn failure(error: &AppError) -> Self {
        Self {
            success: false,
            value: None,
            error_message: Some(error.user_message()),
            error_kind: Some(error.kind()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn kind(&self) -> Option<ErrorKind> {
        self.error_kind
    }

    pub fn into_value(self) -> Option<T> {
        self.value
    }
}

impl<T> From<AppResult<T>> for OperationResult<T> {
    fn from(result: AppResult<T>) -> Self {
        match result {
            Ok(value) => Self::ok(value),
            Err(error) => Self::failure(&error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_mapping() {
        assert_eq!(AppError::not_found("spot").kind(), ErrorKind::NotFound);
        assert_eq!(AppError::forbidden("nope").kind(), ErrorKind::Forbidden);
        assert_eq!(AppError::invalid_state("x").kind().code(), "INVALID_STATE");
        assert_eq!(AppError::persistence("disk").kind(), ErrorKind::Persistence);
    }

    #[test]
    fn test_message_without_prefix() {
        let err = AppError::forbidden("Missing permission: validate_content");
        assert_eq!(err.message(), "Missing permission: validate_content");
        assert_eq!(err.to_string(), "Forbidden: Missing permission: validate_content");
    }

    #[test]
    fn test_operation_result_from_ok() {
        let result: OperationResult<u32> = Ok(7).into();
        assert!(result.is_success());
        assert_eq!(result.value, Some(7));
        assert!(result.error_message.is_none());
    }

    #[test]
    fn test_operation_result_hides_persistence_detail() {
        let result: OperationResult<u32> =
            Err(AppError::persistence("unique constraint spots_pkey violated")).into();
        assert!(!result.is_success());
        assert_eq!(result.kind(), Some(ErrorKind::Persistence));
        let message = result.error_message.unwrap();
        assert!(!message.contains("spots_pkey"));
    }

    #[test]
    fn test_operation_result_serialization() {
        let result: OperationResult<u32> = Err(AppError::invalid_state("already approved")).into();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error_kind"], "InvalidState");
        assert!(json.get("value").is_none());
    }
}
