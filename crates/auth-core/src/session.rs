//! 操作者会话
//!
//! "当前操作者" 以显式的会话值传递，不使用全局可变状态。`CurrentActor` 是边界处的
//! 薄适配层：从 `ActorContext` 读取会话，会话缺失或过期时一律返回 false。

use chrono::{DateTime, Duration, Utc};
use spot_common::UserId;

use crate::account::{Account, Specialization};
use crate::engine::{self, ContentAction, ContentResource};
use crate::permission::Capability;

/// 会话快照
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActorSession {
    actor: Option<Account>,
    expires_at: Option<DateTime<Utc>>,
}

impl ActorSession {
    /// 未登录会话
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(actor: Account, expires_at: DateTime<Utc>) -> Self {
        Self {
            actor: Some(actor),
            expires_at: Some(expires_at),
        }
    }

    /// 从现在起有效 `ttl` 的会话
    pub fn with_ttl(actor: Account, ttl: Duration) -> Self {
        Self::authenticated(actor, Utc::now() + ttl)
    }

    /// 会话中的账户（不检查有效期）
    pub fn actor(&self) -> Option<&Account> {
        self.actor.as_ref()
    }

    pub fn actor_id(&self) -> Option<UserId> {
        self.actor.as_ref().map(|a| a.id)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    pub fn is_authenticated(&self) -> bool {
        self.actor.is_some()
    }

    /// 会话在给定时间点是否仍然有效
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.is_authenticated() && self.expires_at.is_some_and(|exp| now < exp)
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    /// 仅在会话有效时返回账户
    pub fn active_actor(&self) -> Option<&Account> {
        if self.is_valid() { self.actor.as_ref() } else { None }
    }
}

/// 当前操作者上下文（由外部会话管理实现）
pub trait ActorContext: Send + Sync {
    fn current_session(&self) -> ActorSession;
}

impl ActorContext for ActorSession {
    fn current_session(&self) -> ActorSession {
        self.clone()
    }
}

/// 基于环境会话的授权便捷封装
pub struct CurrentActor<'a, C: ActorContext + ?Sized> {
    context: &'a C,
}

impl<'a, C: ActorContext + ?Sized> CurrentActor<'a, C> {
    pub fn new(context: &'a C) -> Self {
        Self { context }
    }

    pub fn session(&self) -> ActorSession {
        self.context.current_session()
    }

    pub fn has_permission(&self, capability: Capability) -> bool {
        let session = self.session();
        match session.active_actor() {
            Some(actor) => engine::has_permission(Some(actor), capability),
            None => false,
        }
    }

    pub fn can_perform_content_action<R: ContentResource + ?Sized>(
        &self,
        content: &R,
        action: ContentAction,
    ) -> bool {
        let session = self.session();
        match session.active_actor() {
            Some(actor) => engine::can_perform_content_action(Some(actor), content, action),
            None => false,
        }
    }

    pub fn can_moderate_specialization(&self, specialization: Specialization) -> bool {
        let session = self.session();
        match session.active_actor() {
            Some(actor) => engine::can_moderate_specialization(Some(actor), specialization),
            None => false,
        }
    }
}
