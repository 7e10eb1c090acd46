//! 导航访问规则

pub mod requirement;

pub use requirement::*;
