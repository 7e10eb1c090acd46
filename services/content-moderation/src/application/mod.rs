//! 应用层

pub mod access;
pub mod listeners;
pub mod validation;
