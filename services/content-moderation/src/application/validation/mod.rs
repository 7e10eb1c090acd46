//! 内容审核流程

mod commands;
mod locks;
mod queries;
mod service;

pub use commands::*;
pub use locks::*;
pub use queries::*;
pub use service::*;
