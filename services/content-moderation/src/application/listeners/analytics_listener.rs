use std::collections::HashMap;

use async_trait::async_trait;
use dashmap::DashMap;
use metrics::counter;
use spot_errors::AppResult;
use spot_event_core::{DomainEvent, EventHandler};

use crate::domain::content::{ValidationEvent, ValidationEventKind};

/// 审核事件统计
#[derive(Default)]
pub struct AnalyticsListener {
    tallies: DashMap<ValidationEventKind, u64>,
}

impl AnalyticsListener {
    pub fn new() -> Self {
        Self::default()
    }

    /// 某类事件的累计次数
    pub fn count(&self, kind: ValidationEventKind) -> u64 {
        self.tallies.get(&kind).map(|count| *count).unwrap_or(0)
    }

    /// 当前统计快照
    pub fn snapshot(&self) -> HashMap<ValidationEventKind, u64> {
        self.tallies
            .iter()
            .map(|entry| (*entry.key(), *entry.value()))
            .collect()
    }
}

#[async_trait]
impl EventHandler<ValidationEvent> for AnalyticsListener {
    fn name(&self) -> &'static str {
        "analytics_listener"
    }

    async fn handle(&self, event: &ValidationEvent) -> AppResult<()> {
        let kind = event.kind();
        *self.tallies.entry(kind).or_insert(0) += 1;
        counter!("moderation_events_total", "event_type" => event.event_type()).increment(1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::content::{TransitionInfo, ValidationStatus};
    use spot_common::{ContentId, UserId};

    fn approved() -> ValidationEvent {
        ValidationEvent::ContentApproved {
            transition: TransitionInfo::new(
                ContentId::new(),
                UserId::new(),
                Some(ValidationStatus::UnderReview),
                ValidationStatus::Approved,
            ),
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_tallies_per_kind() {
        let listener = AnalyticsListener::new();
        let event = approved();

        listener.handle(&event).await.unwrap();
        listener.handle(&event).await.unwrap();
        listener.handle(&event.status_changed()).await.unwrap();

        assert_eq!(listener.count(ValidationEventKind::ContentApproved), 2);
        assert_eq!(listener.count(ValidationEventKind::StatusChanged), 1);
        assert_eq!(listener.count(ValidationEventKind::ContentRejected), 0);
        assert_eq!(listener.snapshot().len(), 2);
    }
}
