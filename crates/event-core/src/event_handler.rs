//! Event Handler 定义

use async_trait::async_trait;
use spot_errors::AppResult;

use crate::DomainEvent;

/// Event Handler trait
///
/// 处理器之间互相隔离：返回错误只会被记录，不影响其他处理器和发布方。
#[async_trait]
pub trait EventHandler<E: DomainEvent>: Send + Sync {
    /// 处理器名称（用于日志和指标）
    fn name(&self) -> &'static str;

    async fn handle(&self, event: &E) -> AppResult<()>;
}
