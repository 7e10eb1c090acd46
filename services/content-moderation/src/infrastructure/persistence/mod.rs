//! 持久化实现

mod in_memory;

pub use in_memory::*;
