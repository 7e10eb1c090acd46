//! 内容审核领域

pub mod content;
pub mod events;
pub mod history;
pub mod repository;
pub mod status;

pub use content::*;
pub use events::*;
pub use history::*;
pub use repository::*;
pub use status::*;
