//! spot-event-core - 事件核心库
//!
//! DomainEvent trait、Event Handler、按事件标签分发的 fan-out 发布器

mod dispatcher;
mod domain_event;
mod event_handler;
mod publisher;
mod registry;

pub use dispatcher::*;
pub use domain_event::*;
pub use event_handler::*;
pub use publisher::*;
pub use registry::*;
