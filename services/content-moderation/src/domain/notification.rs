//! 通知端口

use async_trait::async_trait;
use spot_auth_core::Account;
use spot_errors::AppResult;

/// 通知发送器
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, recipient: &Account, subject: &str, body: &str) -> AppResult<()>;
}
