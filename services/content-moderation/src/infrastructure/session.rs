//! 进程内会话上下文

use std::sync::RwLock;

use chrono::Duration;
use spot_auth_core::{Account, ActorContext, ActorSession};

/// 共享的当前操作者会话
///
/// 锁中毒时视为未登录。
#[derive(Debug, Default)]
pub struct SharedSessionContext {
    session: RwLock<ActorSession>,
}

impl SharedSessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登录并设置有效期
    pub fn sign_in(&self, account: Account, ttl: Duration) {
        let session = ActorSession::with_ttl(account, ttl);
        match self.session.write() {
            Ok(mut current) => *current = session,
            Err(_) => tracing::error!("Session lock poisoned, sign-in ignored"),
        }
    }

    pub fn sign_out(&self) {
        if let Ok(mut current) = self.session.write() {
            *current = ActorSession::anonymous();
        }
    }
}

impl ActorContext for SharedSessionContext {
    fn current_session(&self) -> ActorSession {
        self.session
            .read()
            .map(|session| session.clone())
            .unwrap_or_else(|_| ActorSession::anonymous())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spot_auth_core::AccountType;

    #[test]
    fn test_sign_in_and_out() {
        let context = SharedSessionContext::new();
        assert!(!context.current_session().is_authenticated());

        let account = Account::new("forager", AccountType::Standard);
        context.sign_in(account.clone(), Duration::minutes(10));
        let session = context.current_session();
        assert!(session.is_valid());
        assert_eq!(session.actor_id(), Some(account.id));

        context.sign_out();
        assert!(!context.current_session().is_authenticated());
    }
}
