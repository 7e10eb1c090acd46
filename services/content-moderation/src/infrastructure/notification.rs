//! 通知发送实现

use async_trait::async_trait;
use spot_auth_core::Account;
use spot_common::UserId;
use spot_errors::{AppError, AppResult};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

use crate::domain::notification::Notifier;

/// 只写日志的通知发送器
pub struct LoggingNotifier;

#[async_trait]
impl Notifier for LoggingNotifier {
    async fn notify(&self, recipient: &Account, subject: &str, body: &str) -> AppResult<()> {
        tracing::info!(
            recipient = %recipient.id,
            display_name = %recipient.display_name,
            subject,
            body,
            "Notification sent"
        );
        Ok(())
    }
}

/// 已发送的通知
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentNotification {
    pub recipient: UserId,
    pub subject: String,
    pub body: String,
}

/// 内存通知发送器（记录已发送通知，用于测试）
#[derive(Default)]
pub struct InMemoryNotifier {
    sent: RwLock<Vec<SentNotification>>,
    unavailable: AtomicBool,
}

impl InMemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// 模拟通知通道不可用
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub async fn sent(&self) -> Vec<SentNotification> {
        self.sent.read().await.clone()
    }
}

#[async_trait]
impl Notifier for InMemoryNotifier {
    async fn notify(&self, recipient: &Account, subject: &str, body: &str) -> AppResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::internal("Notification channel unavailable"));
        }
        self.sent.write().await.push(SentNotification {
            recipient: recipient.id,
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}
