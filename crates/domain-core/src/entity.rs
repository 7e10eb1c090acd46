//! 实体基础 trait

use spot_common::AuditInfo;

/// 实体 trait
pub trait Entity {
    type Id;

    fn id(&self) -> &Self::Id;
}

/// 聚合根 trait
///
/// `version` 每次持久化成功后递增，仓储据此做乐观并发检查。
pub trait AggregateRoot: Entity {
    fn audit_info(&self) -> &AuditInfo;
    fn audit_info_mut(&mut self) -> &mut AuditInfo;

    fn version(&self) -> u64;
    fn set_version(&mut self, version: u64);
}
