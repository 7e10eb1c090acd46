//! 领域事件监听器

mod analytics_listener;
mod notification_listener;

pub use analytics_listener::AnalyticsListener;
pub use notification_listener::NotificationListener;
