//! 应用状态定义

use std::sync::Arc;

use learning_progress::ProgressTracker;
use learning_shared::database::Database;
use learning_shared::retry::RetryPolicy;

use crate::auth::JwtManager;

/// Axum 应用共享状态
#[derive(Clone)]
pub struct AppState {
    pub tracker: Arc<dyn ProgressTracker>,
    pub jwt_manager: JwtManager,
    /// complete_topic 遇到存储故障时的重试策略
    pub retry_policy: RetryPolicy,
    /// 就绪探针检查的数据库，内存模式下为空
    pub database: Option<Database>,
}

impl AppState {
    pub fn new(tracker: Arc<dyn ProgressTracker>, jwt_manager: JwtManager) -> Self {
        Self {
            tracker,
            jwt_manager,
            retry_policy: RetryPolicy::default(),
            database: None,
        }
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    pub fn with_database(mut self, database: Database) -> Self {
        self.database = Some(database);
        self
    }
}
