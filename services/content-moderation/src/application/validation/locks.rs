//! 按内容 ID 的互斥锁
//!
//! 同一内容的 加载 -> 检查 -> 修改 -> 持久化 串行执行，不同内容互不阻塞。

use std::sync::Arc;

use dashmap::DashMap;
use spot_common::ContentId;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// 空闲锁条目超过该数量时触发清理
const PRUNE_THRESHOLD: usize = 1024;

/// 内容锁注册表
#[derive(Clone, Default)]
pub struct ContentLocks {
    locks: Arc<DashMap<ContentId, Arc<Mutex<()>>>>,
}

impl ContentLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取内容锁，守卫释放即解锁
    pub async fn acquire(&self, content_id: ContentId) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .entry(content_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }

    /// 移除无人持有的锁条目
    pub fn prune_idle(&self) {
        if self.locks.len() > PRUNE_THRESHOLD {
            self.locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        }
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
