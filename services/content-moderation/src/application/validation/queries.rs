//! 审核流程查询定义

use spot_common::{ContentId, Pagination};

/// 待审核列表查询（UnderReview）
#[derive(Debug, Clone, Copy, Default)]
pub struct ListUnderReviewQuery {
    pub pagination: Option<Pagination>,
}

/// 安全复审列表查询（SafetyReview）
#[derive(Debug, Clone, Copy, Default)]
pub struct ListFlaggedForSafetyQuery {
    pub pagination: Option<Pagination>,
}

/// 审核历史查询
#[derive(Debug, Clone, Copy)]
pub struct ValidationHistoryQuery {
    pub content_id: ContentId,
    pub pagination: Option<Pagination>,
}

impl ValidationHistoryQuery {
    pub fn new(content_id: ContentId) -> Self {
        Self {
            content_id,
            pagination: None,
        }
    }
}
