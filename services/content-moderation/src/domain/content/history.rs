//! 审核历史

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use spot_common::{ContentId, UserId};
use uuid::Uuid;

use super::status::ValidationStatus;

/// 审核历史条目（每次状态转换一条，只追加）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationHistoryEntry {
    pub id: Uuid,
    pub content_id: ContentId,
    pub validator_id: UserId,
    pub previous_status: Option<ValidationStatus>,
    pub new_status: ValidationStatus,
    pub notes: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

impl ValidationHistoryEntry {
    pub fn new(
        content_id: ContentId,
        validator_id: UserId,
        previous_status: Option<ValidationStatus>,
        new_status: ValidationStatus,
        notes: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            content_id,
            validator_id,
            previous_status,
            new_status,
            notes,
            recorded_at: Utc::now(),
        }
    }
}
