//! 服务层
//!
//! ## 模块结构
//!
//! - `ledger`: 完成账本，幂等记录主题完成
//! - `badge_engine`: 模块完成判定与徽章授予
//! - `progress_service`: 编排完成流程并管理事务边界

mod badge_engine;
mod ledger;
mod progress_service;

pub use badge_engine::BadgeEngine;
pub use ledger::{CompletionLedger, RecordedCompletion};
pub use progress_service::{ProgressService, ProgressTracker};
