//! 学习进度服务
//!
//! 编排完成账本和徽章引擎，负责事务边界：一次 `complete_topic` 中的完成记录、
//! 徽章创建和授予要么一起提交，要么全部回滚。

use std::time::Instant;

use async_trait::async_trait;
use learning_shared::observability::metrics;
use tracing::{info, instrument, warn};

use super::badge_engine::BadgeEngine;
use super::ledger::CompletionLedger;
use crate::error::{ProgressError, Result};
use crate::models::{
    AwardedBadge, Badge, CompletionOutcome, ModuleProgress, User, UserProgress,
};
use crate::repository::{ProgressStore, ProgressTx};

/// 调用方使用的进度接口
///
/// 对象安全，HTTP 层以 `Arc<dyn ProgressTracker>` 持有
#[async_trait]
pub trait ProgressTracker: Send + Sync {
    /// 标记主题完成，必要时授予模块徽章
    async fn complete_topic(&self, user_id: i64, topic_id: i64) -> Result<CompletionOutcome>;

    async fn user_progress(&self, user_id: i64) -> Result<UserProgress>;

    async fn user_badges(&self, user_id: i64) -> Result<Vec<AwardedBadge>>;

    async fn module_progress(&self, user_id: i64, module_id: i64) -> Result<ModuleProgress>;

    /// 基于已存储的完成状态重新评估全部相关模块，返回新授予的徽章
    async fn reevaluate_user_badges(&self, user_id: i64) -> Result<Vec<Badge>>;
}

/// 学习进度服务
pub struct ProgressService<S: ProgressStore> {
    store: S,
    ledger: CompletionLedger,
    engine: BadgeEngine,
}

impl<S: ProgressStore> ProgressService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            ledger: CompletionLedger::new(),
            engine: BadgeEngine::new(),
        }
    }

    /// 在调用方提供的事务中完成主题
    ///
    /// 不提交事务，提交与否由调用方决定。先锁定用户行：同一用户同时完成模块的
    /// 最后两个主题时，后一个事务必须看到前一个的完成记录，徽章才会被授予。
    pub async fn complete_topic_in<T: ProgressTx>(
        &self,
        tx: &mut T,
        user_id: i64,
        topic_id: i64,
    ) -> Result<CompletionOutcome> {
        require_locked_user(tx, user_id).await?;

        let recorded = self.ledger.record_completion(tx, user_id, topic_id).await?;
        if recorded.already_completed {
            return Ok(CompletionOutcome::already_completed(topic_id));
        }

        let awarded = self
            .engine
            .evaluate_module_completion(tx, user_id, &recorded.module)
            .await?;

        Ok(CompletionOutcome::completed(topic_id, awarded))
    }

    async fn complete_topic_tx(&self, user_id: i64, topic_id: i64) -> Result<CompletionOutcome> {
        let mut tx = self.store.begin().await?;
        let outcome = self.complete_topic_in(&mut tx, user_id, topic_id).await?;
        tx.commit().await?;
        Ok(outcome)
    }
}

async fn require_user<T: ProgressTx>(tx: &mut T, user_id: i64) -> Result<User> {
    tx.find_user(user_id)
        .await?
        .ok_or(ProgressError::UserNotFound(user_id))
}

async fn require_locked_user<T: ProgressTx>(tx: &mut T, user_id: i64) -> Result<User> {
    tx.lock_user(user_id)
        .await?
        .ok_or(ProgressError::UserNotFound(user_id))
}

#[async_trait]
impl<S: ProgressStore> ProgressTracker for ProgressService<S> {
    #[instrument(skip(self))]
    async fn complete_topic(&self, user_id: i64, topic_id: i64) -> Result<CompletionOutcome> {
        let start = Instant::now();
        let result = self.complete_topic_tx(user_id, topic_id).await;
        let elapsed = start.elapsed().as_secs_f64();

        match &result {
            Ok(outcome) => {
                metrics::record_topic_completion(outcome.status.as_str(), elapsed);
                if let Some(badge) = &outcome.awarded_badge {
                    metrics::record_badge_award("topic_completion");
                    info!(badge_id = badge.id, "主题完成并获得徽章");
                } else {
                    info!(status = outcome.status.as_str(), "主题完成已记录");
                }
            }
            Err(e) => {
                metrics::record_topic_completion("error", elapsed);
                warn!(error = %e, retryable = e.is_retryable(), "主题完成失败");
            }
        }

        result
    }

    // 只读查询不提交，句柄丢弃即结束事务

    #[instrument(skip(self))]
    async fn user_progress(&self, user_id: i64) -> Result<UserProgress> {
        let mut tx = self.store.begin().await?;
        require_locked_user(&mut tx, user_id).await?;

        let completed_topic_ids = tx
            .list_completions(user_id)
            .await?
            .into_iter()
            .map(|c| c.topic_id)
            .collect();

        Ok(UserProgress {
            user_id,
            completed_topic_ids,
        })
    }

    #[instrument(skip(self))]
    async fn user_badges(&self, user_id: i64) -> Result<Vec<AwardedBadge>> {
        let mut tx = self.store.begin().await?;
        require_user(&mut tx, user_id).await?;
        tx.list_user_badges(user_id).await
    }

    #[instrument(skip(self))]
    async fn module_progress(&self, user_id: i64, module_id: i64) -> Result<ModuleProgress> {
        let mut tx = self.store.begin().await?;
        require_user(&mut tx, user_id).await?;

        let module = tx
            .find_module(module_id)
            .await?
            .ok_or(ProgressError::ModuleNotFound(module_id))?;
        let module_topics = tx.module_topic_ids(module_id).await?;
        let completed = tx.completed_topic_ids(user_id).await?;

        Ok(ModuleProgress::summarize(
            module.id,
            module.name,
            &module_topics,
            &completed,
        ))
    }

    #[instrument(skip(self))]
    async fn reevaluate_user_badges(&self, user_id: i64) -> Result<Vec<Badge>> {
        let mut tx = self.store.begin().await?;
        require_user(&mut tx, user_id).await?;

        let mut awarded = Vec::new();
        for module_id in tx.completed_module_ids(user_id).await? {
            let module = tx
                .find_module(module_id)
                .await?
                .ok_or(ProgressError::ModuleNotFound(module_id))?;

            if let Some(badge) = self
                .engine
                .evaluate_module_completion(&mut tx, user_id, &module)
                .await?
            {
                awarded.push(badge);
            }
        }

        tx.commit().await?;

        for _ in &awarded {
            metrics::record_badge_award("reevaluation");
        }
        info!(awarded = awarded.len(), "徽章重新评估完成");

        Ok(awarded)
    }
}
