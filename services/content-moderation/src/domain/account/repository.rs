//! 账户仓储接口

use async_trait::async_trait;
use spot_auth_core::Account;
use spot_common::UserId;
use spot_errors::AppResult;

/// 账户仓储接口
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// 根据 ID 查找账户
    async fn find_by_id(&self, id: &UserId) -> AppResult<Option<Account>>;

    /// 保存账户（新增或覆盖）
    async fn save(&self, account: &Account) -> AppResult<()>;
}
