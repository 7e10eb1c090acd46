//! 服务装配
//!
//! 构建仓储、事件分发器、监听器和应用服务，供入口和集成测试共用。

use std::sync::Arc;

use spot_config::AppConfig;
use spot_errors::AppResult;
use spot_event_core::{EventDispatcher, EventPublisher, HandlerRegistry};

use crate::application::access::AccessGuard;
use crate::application::listeners::{AnalyticsListener, NotificationListener};
use crate::application::validation::ValidationWorkflow;
use crate::config::ServiceSettings;
use crate::domain::content::{ValidationEvent, ValidationEventKind};
use crate::domain::notification::Notifier;
use crate::infrastructure::persistence::{InMemoryAccountRepository, InMemoryModerationStore};

/// 已装配的审核模块
pub struct ModerationModule {
    pub settings: ServiceSettings,
    pub accounts: Arc<InMemoryAccountRepository>,
    pub store: InMemoryModerationStore,
    pub dispatcher: EventDispatcher<ValidationEvent>,
    pub analytics: Arc<AnalyticsListener>,
    pub workflow: Arc<ValidationWorkflow>,
    pub guard: AccessGuard,
}

impl ModerationModule {
    /// 使用内存存储装配
    pub fn in_memory(config: &AppConfig, notifier: Arc<dyn Notifier>) -> AppResult<Self> {
        let settings = ServiceSettings::from_app_config(config)?;

        let accounts = Arc::new(InMemoryAccountRepository::new());
        let store = InMemoryModerationStore::new();
        let analytics = Arc::new(AnalyticsListener::new());

        let notification_listener = Arc::new(NotificationListener::new(
            Arc::new(store.clone()),
            accounts.clone(),
            notifier,
        ));

        let mut registry = HandlerRegistry::<ValidationEvent>::new();
        registry
            .register_for(&NotificationListener::SUBSCRIPTIONS, notification_listener)
            .register_for(&ValidationEventKind::ALL, analytics.clone());
        let dispatcher = EventDispatcher::new(registry);

        let publisher: Arc<dyn EventPublisher<ValidationEvent>> = Arc::new(dispatcher.clone());
        let workflow = ValidationWorkflow::new(
            accounts.clone(),
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            publisher,
        )
        .with_settings(settings.workflow);

        let guard = AccessGuard::new(settings.navigation.clone());

        tracing::info!(
            destinations = guard.table().len(),
            "Content moderation module initialized"
        );

        Ok(Self {
            settings,
            accounts,
            store,
            dispatcher,
            analytics,
            workflow: Arc::new(workflow),
            guard,
        })
    }
}
