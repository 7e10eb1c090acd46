//! 导航访问控制

mod guard;

pub use guard::*;
