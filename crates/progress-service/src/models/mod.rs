//! 领域模型
//!
//! 目录结构 Course -> Module -> Topic 以及徽章、完成记录

mod badge;
mod catalog;
mod enums;
mod progress;

pub use badge::*;
pub use catalog::*;
pub use enums::*;
pub use progress::*;
