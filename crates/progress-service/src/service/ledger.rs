//! 完成账本
//!
//! 每个用户的已完成主题集合，只增不减

use tracing::debug;

use crate::error::{ProgressError, Result};
use crate::models::{Module, Topic};
use crate::repository::ProgressTx;

/// 一次记录的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCompletion {
    pub topic: Topic,
    pub module: Module,
    /// 此前已完成（包括并发的重复插入）
    pub already_completed: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CompletionLedger;

impl CompletionLedger {
    pub fn new() -> Self {
        Self
    }

    /// 记录用户完成了某个主题
    ///
    /// 主题及其所属模块必须存在。插入使用 `ON CONFLICT DO NOTHING`，
    /// 重复调用不会产生第二条记录。
    pub async fn record_completion<T: ProgressTx>(
        &self,
        tx: &mut T,
        user_id: i64,
        topic_id: i64,
    ) -> Result<RecordedCompletion> {
        let topic = tx
            .find_topic(topic_id)
            .await?
            .ok_or(ProgressError::TopicNotFound(topic_id))?;

        let module = tx
            .find_module(topic.module_id)
            .await?
            .ok_or(ProgressError::ModuleNotFound(topic.module_id))?;

        let inserted = tx.insert_completion(user_id, topic_id).await?;
        if !inserted {
            debug!(user_id, topic_id, "主题此前已完成");
        }

        Ok(RecordedCompletion {
            topic,
            module,
            already_completed: !inserted,
        })
    }
}
