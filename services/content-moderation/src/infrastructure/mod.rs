//! 基础设施层

pub mod notification;
pub mod persistence;
pub mod session;
