//! 事件发布器
//!
//! 发布是尽力而为的：发布方不会收到处理器的失败。

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use tokio::sync::RwLock;

use crate::DomainEvent;

/// 事件发布器 trait
#[async_trait]
pub trait EventPublisher<E: DomainEvent>: Send + Sync {
    /// 发布单个事件，等待所有处理器执行完毕
    async fn publish(&self, event: E);

    /// 批量发布事件
    async fn publish_batch(&self, events: Vec<E>);
}

/// 内存事件总线实现（记录已发布事件，用于测试和调试）
pub struct InMemoryEventBus<E: DomainEvent> {
    events: Arc<RwLock<Vec<E>>>,
}

impl<E: DomainEvent> InMemoryEventBus<E> {
    pub fn new() -> Self {
        Self {
            events: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// 获取所有发布的事件
    pub async fn get_events(&self) -> Vec<E> {
        self.events.read().await.clone()
    }

    /// 清空事件
    pub async fn clear(&self) {
        self.events.write().await.clear();
    }
}

impl<E: DomainEvent> Default for InMemoryEventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<E: DomainEvent> EventPublisher<E> for InMemoryEventBus<E> {
    async fn publish(&self, event: E) {
        tracing::info!(
            event_type = event.event_type(),
            aggregate_type = event.aggregate_type(),
            aggregate_id = %event.aggregate_id(),
            "Domain event published"
        );
        self.events.write().await.push(event);
    }

    async fn publish_batch(&self, events: Vec<E>) {
        for event in events {
            self.publish(event).await;
        }
    }
}

/// 广播事件发布器
///
/// 将事件同时交给所有注册的发布器（例如：分发器 + 内存记录）
pub struct BroadcastEventPublisher<E: DomainEvent> {
    publishers: Vec<Arc<dyn EventPublisher<E>>>,
}

impl<E: DomainEvent> BroadcastEventPublisher<E> {
    pub fn new(publishers: Vec<Arc<dyn EventPublisher<E>>>) -> Self {
        Self { publishers }
    }
}

#[async_trait]
impl<E: DomainEvent> EventPublisher<E> for BroadcastEventPublisher<E> {
    async fn publish(&self, event: E) {
        join_all(
            self.publishers
                .iter()
                .map(|publisher| publisher.publish(event.clone())),
        )
        .await;
    }

    async fn publish_batch(&self, events: Vec<E>) {
        join_all(
            self.publishers
                .iter()
                .map(|publisher| publisher.publish_batch(events.clone())),
        )
        .await;
    }
}
