//! Unit of Work 模式
//!
//! 一次状态转换对应一次工作单元：内容更新与历史条目要么一起提交，要么都不生效。

use async_trait::async_trait;
use spot_errors::AppResult;

use crate::domain::content::{ContentRecord, ValidationHistoryEntry};

/// Unit of Work trait
#[async_trait]
pub trait UnitOfWork: Send {
    /// 暂存内容写入，`content.version()` 为读取时的版本，提交时据此做乐观并发检查
    async fn save_content(&mut self, content: &ContentRecord) -> AppResult<()>;

    /// 暂存历史条目
    async fn append_history(&mut self, entry: &ValidationHistoryEntry) -> AppResult<()>;

    /// 提交事务
    async fn commit(self: Box<Self>) -> AppResult<()>;

    /// 回滚事务
    async fn rollback(self: Box<Self>) -> AppResult<()>;
}

/// Unit of Work 工厂 trait
#[async_trait]
pub trait UnitOfWorkFactory: Send + Sync {
    /// 开始新的事务
    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>>;
}
