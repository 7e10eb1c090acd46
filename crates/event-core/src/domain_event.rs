//! Domain Event 定义

use std::fmt::Debug;
use std::hash::Hash;

use serde::Serialize;
use uuid::Uuid;

/// Domain Event trait
///
/// 事件是封闭的枚举；`kind` 返回不带负载的标签，分发器按标签查找订阅者，
/// 不依赖运行时类型信息。
pub trait DomainEvent: Clone + Debug + Send + Sync + Serialize + 'static {
    /// 事件标签类型
    type Kind: Copy + Eq + Hash + Debug + Send + Sync + 'static;

    /// 事件标签
    fn kind(&self) -> Self::Kind;

    /// 事件 ID
    fn event_id(&self) -> Uuid;

    /// 事件类型名称
    fn event_type(&self) -> &'static str;

    /// 聚合类型
    fn aggregate_type(&self) -> &'static str;

    /// 聚合 ID
    fn aggregate_id(&self) -> String;
}
