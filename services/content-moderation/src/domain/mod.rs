//! 领域层

pub mod account;
pub mod content;
pub mod navigation;
pub mod notification;
pub mod unit_of_work;

pub use unit_of_work::{UnitOfWork, UnitOfWorkFactory};
