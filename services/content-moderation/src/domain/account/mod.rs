//! 账户领域（账户本身由外部身份系统拥有）

pub mod repository;

pub use repository::*;
