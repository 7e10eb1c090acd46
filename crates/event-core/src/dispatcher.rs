//! 事件分发器
//!
//! 对单个事件：并发调用该标签下的全部处理器，等待全部完成后返回。
//! 单个处理器失败（错误或 panic）只记录日志，不影响其他处理器，也不向调用方传播。

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::join_all;
use metrics::counter;
use uuid::Uuid;

use crate::{DomainEvent, EventHandler, EventPublisher, HandlerRegistry};

/// 单次分发结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    pub event_id: Uuid,
    pub event_type: &'static str,
    /// 被调用的处理器数量
    pub attempted: usize,
    /// 失败的处理器名称
    pub failed: Vec<&'static str>,
}

impl DispatchReport {
    pub fn succeeded(&self) -> usize {
        self.attempted - self.failed.len()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Fan-out 分发器
pub struct EventDispatcher<E: DomainEvent> {
    registry: Arc<HandlerRegistry<E>>,
}

impl<E: DomainEvent> Clone for EventDispatcher<E> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<E: DomainEvent> EventDispatcher<E> {
    pub fn new(registry: HandlerRegistry<E>) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    pub fn registry(&self) -> &HandlerRegistry<E> {
        &self.registry
    }

    /// 分发单个事件
    pub async fn dispatch(&self, event: &E) -> DispatchReport {
        let handlers = self.registry.handlers_for(event.kind());

        if handlers.is_empty() {
            tracing::debug!(
                event_id = %event.event_id(),
                event_type = event.event_type(),
                "No handlers registered for event"
            );
        }

        let outcomes = join_all(handlers.iter().map(|handler| invoke(handler.as_ref(), event))).await;
        let failed: Vec<&'static str> = outcomes.into_iter().flatten().collect();

        DispatchReport {
            event_id: event.event_id(),
            event_type: event.event_type(),
            attempted: handlers.len(),
            failed,
        }
    }

    /// 批量分发：事件之间并发，顺序不保证
    pub async fn dispatch_batch(&self, events: &[E]) -> Vec<DispatchReport> {
        join_all(events.iter().map(|event| self.dispatch(event))).await
    }
}

/// 调用单个处理器，失败时返回处理器名称
async fn invoke<E: DomainEvent>(handler: &dyn EventHandler<E>, event: &E) -> Option<&'static str> {
    let name = handler.name();

    match AssertUnwindSafe(handler.handle(event)).catch_unwind().await {
        Ok(Ok(())) => None,
        Ok(Err(e)) => {
            tracing::error!(
                handler = name,
                event_id = %event.event_id(),
                event_type = event.event_type(),
                aggregate_id = %event.aggregate_id(),
                error = %e,
                "Event handler failed"
            );
            counter!("event_handler_failures_total",
                "handler" => name,
                "event_type" => event.event_type()
            )
            .increment(1);
            Some(name)
        }
        Err(_) => {
            tracing::error!(
                handler = name,
                event_id = %event.event_id(),
                event_type = event.event_type(),
                aggregate_id = %event.aggregate_id(),
                "Event handler panicked"
            );
            counter!("event_handler_failures_total",
                "handler" => name,
                "event_type" => event.event_type()
            )
            .increment(1);
            Some(name)
        }
    }
}

#[async_trait]
impl<E: DomainEvent> EventPublisher<E> for EventDispatcher<E> {
    async fn publish(&self, event: E) {
        let report = self.dispatch(&event).await;
        tracing::debug!(
            event_id = %report.event_id,
            event_type = report.event_type,
            attempted = report.attempted,
            failed = report.failed.len(),
            "Domain event dispatched"
        );
    }

    async fn publish_batch(&self, events: Vec<E>) {
        self.dispatch_batch(&events).await;
    }
}
