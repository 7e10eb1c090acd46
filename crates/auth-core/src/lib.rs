//! spot-auth-core - 授权核心库
//!
//! 权限模型 / 账户层级 / 授权决策引擎 / 操作者会话

mod account;
mod engine;
mod permission;
mod session;

pub use account::*;
pub use engine::*;
pub use permission::*;
pub use session::*;
