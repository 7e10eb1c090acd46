//! 处理器注册表
//!
//! 启动时构建，之后以 `Arc` 共享只读使用。

use std::collections::HashMap;
use std::sync::Arc;

use crate::{DomainEvent, EventHandler};

/// 事件标签 -> 处理器列表
pub struct HandlerRegistry<E: DomainEvent> {
    handlers: HashMap<E::Kind, Vec<Arc<dyn EventHandler<E>>>>,
}

impl<E: DomainEvent> HandlerRegistry<E> {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// 为单个事件标签注册处理器
    pub fn register(&mut self, kind: E::Kind, handler: Arc<dyn EventHandler<E>>) -> &mut Self {
        tracing::debug!(handler = handler.name(), kind = ?kind, "Event handler registered");
        self.handlers.entry(kind).or_default().push(handler);
        self
    }

    /// 为多个事件标签注册同一个处理器
    pub fn register_for(
        &mut self,
        kinds: &[E::Kind],
        handler: Arc<dyn EventHandler<E>>,
    ) -> &mut Self {
        for kind in kinds {
            self.register(*kind, Arc::clone(&handler));
        }
        self
    }

    /// 获取某个标签的处理器，按注册顺序
    pub fn handlers_for(&self, kind: E::Kind) -> &[Arc<dyn EventHandler<E>>] {
        self.handlers.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn handler_count(&self, kind: E::Kind) -> usize {
        self.handlers_for(kind).len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.values().all(Vec::is_empty)
    }
}

impl<E: DomainEvent> Default for HandlerRegistry<E> {
    fn default() -> Self {
        Self::new()
    }
}
