//! 学习进度服务
//!
//! 记录用户的主题完成情况，并在用户完成某个模块的全部主题时授予
//! "Module Master" 徽章。
//!
//! ## 核心功能
//!
//! - **完成账本**：每个用户已完成主题的集合，插入幂等
//! - **徽章引擎**：根据账本和目录结构判定模块是否完成，按名称懒创建徽章并幂等授予
//! - **进度服务**：`complete_topic` 编排上述两步并在同一事务中提交
//! - **修复**：`reevaluate_user_badges` 基于已存储状态重新评估，补发遗漏的徽章
//!
//! ## 模块结构
//!
//! - `models`: 领域模型定义
//! - `error`: 错误类型定义
//! - `repository`: 存储抽象（事务句柄）及 PostgreSQL / 内存实现
//! - `service`: 账本、徽章引擎与进度服务

pub mod error;
pub mod models;
pub mod repository;
pub mod service;

pub use error::{ProgressError, Result};
pub use models::*;
pub use repository::{MemoryProgressStore, PgProgressStore, ProgressStore, ProgressTx};
pub use service::{
    BadgeEngine, CompletionLedger, ProgressService, ProgressTracker, RecordedCompletion,
};
