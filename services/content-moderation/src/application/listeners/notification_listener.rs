use std::sync::Arc;

use async_trait::async_trait;
use spot_errors::{AppError, AppResult};
use spot_event_core::{DomainEvent, EventHandler};

use crate::domain::account::AccountRepository;
use crate::domain::content::{
    ContentRepository, SafetyOutcome, ValidationEvent, ValidationEventKind,
};
use crate::domain::notification::Notifier;

/// 通知监听器
///
/// 审核结论和安全标记发生时通知内容创建者
pub struct NotificationListener {
    contents: Arc<dyn ContentRepository>,
    accounts: Arc<dyn AccountRepository>,
    notifier: Arc<dyn Notifier>,
}

impl NotificationListener {
    /// 订阅的事件
    pub const SUBSCRIPTIONS: [ValidationEventKind; 4] = [
        ValidationEventKind::ContentApproved,
        ValidationEventKind::ContentRejected,
        ValidationEventKind::ContentFlaggedForSafety,
        ValidationEventKind::SafetyReviewCompleted,
    ];

    pub fn new(
        contents: Arc<dyn ContentRepository>,
        accounts: Arc<dyn AccountRepository>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            contents,
            accounts,
            notifier,
        }
    }

    fn compose(event: &ValidationEvent, title: &str) -> Option<(String, String)> {
        let message = match event {
            ValidationEvent::ContentApproved { .. } => (
                "Your spot was approved".to_string(),
                format!("\"{}\" passed review and is now visible to the community.", title),
            ),
            ValidationEvent::ContentRejected { reasons, .. } => (
                "Your spot was not approved".to_string(),
                format!("\"{}\" was rejected: {}", title, reasons.join("; ")),
            ),
            ValidationEvent::ContentFlaggedForSafety { flag, .. } => (
                "Your spot is under safety review".to_string(),
                format!(
                    "\"{}\" was flagged ({} severity) and is being reviewed by an expert.",
                    title,
                    flag.severity.as_str()
                ),
            ),
            ValidationEvent::SafetyReviewCompleted { outcome, .. } => match outcome {
                SafetyOutcome::Cleared => (
                    "Safety review completed".to_string(),
                    format!("\"{}\" cleared safety review and was approved.", title),
                ),
                SafetyOutcome::Unsafe => (
                    "Safety review completed".to_string(),
                    format!("\"{}\" did not pass safety review and was rejected.", title),
                ),
            },
            _ => return None,
        };
        Some(message)
    }
}

#[async_trait]
impl EventHandler<ValidationEvent> for NotificationListener {
    fn name(&self) -> &'static str {
        "notification_listener"
    }

    async fn handle(&self, event: &ValidationEvent) -> AppResult<()> {
        if !Self::SUBSCRIPTIONS.contains(&event.kind()) {
            return Ok(());
        }

        let content_id = event.content_id();
        let content = self
            .contents
            .find_by_id(&content_id)
            .await?
            .ok_or_else(|| {
                AppError::handler_failure(format!("Content {} not found for notification", content_id))
            })?;

        let Some((subject, body)) = Self::compose(event, &content.title) else {
            return Ok(());
        };

        let creator = self
            .accounts
            .find_by_id(&content.creator_id)
            .await?
            .ok_or_else(|| {
                AppError::handler_failure(format!(
                    "Creator {} of content {} not found",
                    content.creator_id, content_id
                ))
            })?;

        self.notifier
            .notify(&creator, &subject, &body)
            .await
            .map_err(|e| AppError::handler_failure(format!("Failed to notify creator: {}", e)))?;

        tracing::info!(
            content_id = %content_id,
            recipient = %creator.id,
            event_type = event.event_type(),
            "Creator notified"
        );
        Ok(())
    }
}
