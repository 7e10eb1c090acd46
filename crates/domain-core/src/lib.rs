//! spot-domain-core - 跨 context 的领域核心类型
//!
//! 实体 / 聚合根 trait

mod entity;

pub use entity::*;

// Re-export common types
pub use spot_common::{AuditInfo, ContentId, UserId};
