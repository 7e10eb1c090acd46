//! 内容仓储接口

use async_trait::async_trait;
use spot_common::{ContentId, Pagination};
use spot_errors::AppResult;

use super::content::ContentRecord;
use super::history::ValidationHistoryEntry;
use super::status::ValidationStatus;

/// 内容列表查询条件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentQuery {
    pub status: Option<ValidationStatus>,
    pub pagination: Pagination,
}

impl ContentQuery {
    pub fn by_status(status: ValidationStatus, pagination: Pagination) -> Self {
        Self {
            status: Some(status),
            pagination,
        }
    }
}

/// 内容仓储接口（只读，写入经过 `UnitOfWork`）
#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// 根据 ID 查找内容
    async fn find_by_id(&self, id: &ContentId) -> AppResult<Option<ContentRecord>>;

    /// 分页查询，按创建时间升序，返回 (当前页, 总数)
    async fn query(&self, query: &ContentQuery) -> AppResult<(Vec<ContentRecord>, u64)>;
}

/// 审核历史仓储接口（只读）
#[async_trait]
pub trait ValidationHistoryRepository: Send + Sync {
    /// 按记录时间升序列出某内容的历史，返回 (当前页, 总数)
    async fn list_by_content(
        &self,
        content_id: &ContentId,
        pagination: &Pagination,
    ) -> AppResult<(Vec<ValidationHistoryEntry>, u64)>;
}
