//! 学习进度服务错误类型
//!
//! 错误分三类：资源不存在（NotFound）、徽章名并发冲突（Conflict，仅在引擎内部恢复）、
//! 存储失败（Storage，仅瞬时故障可重试）。

use learning_shared::error::is_transient_db_error;
use thiserror::Error;

/// 学习进度服务错误类型
#[derive(Debug, Error)]
pub enum ProgressError {
    // === 资源不存在 ===
    #[error("user not found: {0}")]
    UserNotFound(i64),

    #[error("topic not found: {0}")]
    TopicNotFound(i64),

    #[error("module not found: {0}")]
    ModuleNotFound(i64),

    // === 并发冲突 ===
    /// 同名徽章已被并发事务创建
    #[error("badge name already taken: {0}")]
    BadgeNameConflict(String),

    // === 系统错误 ===
    #[error("storage failure: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

/// 学习进度服务 Result 类型别名
pub type Result<T> = std::result::Result<T, ProgressError>;

impl ProgressError {
    /// 检查是否为可重试的错误
    ///
    /// complete_topic 本身幂等，瞬时的存储故障可以整体原样重试；
    /// 解码错误、约束冲突等确定性故障重试也只会以同样方式失败
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Storage(e) => is_transient_db_error(e),
            _ => false,
        }
    }
}
