//! 统一错误处理模块
//!
//! 基础设施层（配置、连接池、迁移）共享的错误类型。业务错误由各服务自行定义。

use thiserror::Error;

/// PostgreSQL 序列化失败
const SQLSTATE_SERIALIZATION_FAILURE: &str = "40001";
/// PostgreSQL 检测到死锁
const SQLSTATE_DEADLOCK_DETECTED: &str = "40P01";

/// 基础设施错误类型
#[derive(Debug, Error)]
pub enum InfraError {
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    #[error("数据库迁移失败: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("配置错误: {0}")]
    Config(#[from] config::ConfigError),

    #[error("内部错误: {0}")]
    Internal(String),
}

/// 错误结果类型别名
pub type Result<T> = std::result::Result<T, InfraError>;

impl InfraError {
    /// 是否为可重试错误
    ///
    /// 只有瞬时的数据库故障可重试；配置和迁移错误重试无意义
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Database(e) => is_transient_db_error(e),
            _ => false,
        }
    }
}

/// 判断数据库错误是否为瞬时故障
///
/// 连接池超时、连接池关闭、IO 故障，以及 PostgreSQL 的序列化失败和死锁。
/// 解码错误、约束冲突、RowNotFound 等每次都会以同样方式失败，不可重试。
pub fn is_transient_db_error(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => true,
        sqlx::Error::Database(db) => matches!(
            db.code().as_deref(),
            Some(SQLSTATE_SERIALIZATION_FAILURE) | Some(SQLSTATE_DEADLOCK_DETECTED)
        ),
        _ => false,
    }
}
