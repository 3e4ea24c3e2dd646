//! 存储 Trait 定义

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{AwardedBadge, Badge, Module, NewBadge, Topic, TopicCompletion, User};

/// 事务句柄
///
/// 一次 `complete_topic` 调用中的所有读写都经过同一个句柄，
/// 调用 `commit` 之前的修改对其它事务不可见，句柄丢弃时回滚。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProgressTx: Send {
    // 目录
    async fn find_user(&mut self, user_id: i64) -> Result<Option<User>>;
    /// 读取用户并锁定该行直到事务结束，同一用户的写事务因此串行执行
    async fn lock_user(&mut self, user_id: i64) -> Result<Option<User>>;
    async fn find_topic(&mut self, topic_id: i64) -> Result<Option<Topic>>;
    async fn find_module(&mut self, module_id: i64) -> Result<Option<Module>>;
    async fn module_topic_ids(&mut self, module_id: i64) -> Result<BTreeSet<i64>>;

    // 完成账本
    async fn completed_topic_ids(&mut self, user_id: i64) -> Result<BTreeSet<i64>>;
    /// 按完成时间排序
    async fn list_completions(&mut self, user_id: i64) -> Result<Vec<TopicCompletion>>;
    /// 用户至少完成过一个主题的模块
    async fn completed_module_ids(&mut self, user_id: i64) -> Result<Vec<i64>>;
    /// 返回 false 表示该记录已存在
    async fn insert_completion(&mut self, user_id: i64, topic_id: i64) -> Result<bool>;

    // 徽章
    async fn find_badge_by_name(&mut self, name: &str) -> Result<Option<Badge>>;
    /// 同名徽章已存在时返回 `ProgressError::BadgeNameConflict`
    async fn create_badge(&mut self, badge: &NewBadge) -> Result<Badge>;
    /// 返回 false 表示用户已持有该徽章
    async fn grant_badge(&mut self, user_id: i64, badge_id: i64) -> Result<bool>;
    /// 按授予时间排序
    async fn list_user_badges(&mut self, user_id: i64) -> Result<Vec<AwardedBadge>>;

    async fn commit(self) -> Result<()>;
}

/// 事务句柄工厂
#[async_trait]
pub trait ProgressStore: Send + Sync + 'static {
    type Tx: ProgressTx + 'static;

    async fn begin(&self) -> Result<Self::Tx>;
}
