//! Content Moderation Service Library
//!
//! 模块划分：
//! - `domain`: 内容记录、审核状态机、事件、导航规则和端口
//! - `application`: 访问守卫、审核流程、事件监听器
//! - `infrastructure`: 内存存储、会话上下文、通知发送
//! - `module`: 装配

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod module;

pub use error::ModerationError;
pub use module::ModerationModule;
