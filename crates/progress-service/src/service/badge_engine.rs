//! 徽章引擎
//!
//! 根据账本和目录结构判定用户是否完成了某个模块，
//! 满足条件时懒创建 "Module Master" 徽章并幂等授予。

use tracing::{debug, info, warn};

use crate::error::{ProgressError, Result};
use crate::models::{Badge, Module, NewBadge, module_qualifies};
use crate::repository::ProgressTx;

#[derive(Debug, Clone, Copy, Default)]
pub struct BadgeEngine;

impl BadgeEngine {
    pub fn new() -> Self {
        Self
    }

    /// 评估用户是否完成了模块
    ///
    /// 仅在本次调用新授予徽章时返回 `Some`；未满足条件或用户已持有徽章时返回 `None`。
    pub async fn evaluate_module_completion<T: ProgressTx>(
        &self,
        tx: &mut T,
        user_id: i64,
        module: &Module,
    ) -> Result<Option<Badge>> {
        let module_topics = tx.module_topic_ids(module.id).await?;
        if module_topics.is_empty() {
            warn!(module_id = module.id, module_name = %module.name, "模块没有任何主题，视为已完成");
        }

        let completed = tx.completed_topic_ids(user_id).await?;
        if !module_qualifies(&module_topics, &completed) {
            debug!(
                user_id,
                module_id = module.id,
                remaining = module_topics.difference(&completed).count(),
                "模块尚未完成"
            );
            return Ok(None);
        }

        let badge = self.ensure_module_badge(tx, module).await?;

        if !tx.grant_badge(user_id, badge.id).await? {
            debug!(user_id, badge_id = badge.id, "用户已持有该徽章");
            return Ok(None);
        }

        info!(
            user_id,
            module_id = module.id,
            badge_id = badge.id,
            badge_name = %badge.name,
            "模块完成，徽章已授予"
        );
        Ok(Some(badge))
    }

    /// 按名称查找徽章，不存在则创建
    ///
    /// 并发创建时失败的一方会收到 `BadgeNameConflict`，此时重新按名称读取胜出方的记录。
    async fn ensure_module_badge<T: ProgressTx>(&self, tx: &mut T, module: &Module) -> Result<Badge> {
        let new_badge = NewBadge::module_master(&module.name);

        if let Some(existing) = tx.find_badge_by_name(&new_badge.name).await? {
            return Ok(existing);
        }

        match tx.create_badge(&new_badge).await {
            Ok(created) => {
                info!(badge_id = created.id, badge_name = %created.name, "徽章已创建");
                Ok(created)
            }
            Err(ProgressError::BadgeNameConflict(name)) => {
                debug!(badge_name = %name, "徽章已被并发创建，重新读取");
                tx.find_badge_by_name(&name).await?.ok_or_else(|| {
                    ProgressError::Internal(format!("badge {} missing after name conflict", name))
                })
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockProgressTx;
    use chrono::Utc;
    use mockall::Sequence;
    use std::collections::BTreeSet;

    fn intro() -> Module {
        Module {
            id: 1,
            course_id: 1,
            name: "Intro".to_string(),
            description: None,
        }
    }

    fn intro_badge() -> Badge {
        Badge {
            id: 77,
            name: "Module Master - Intro".to_string(),
            description: "Completed all topics in the Intro module.".to_string(),
            icon: "🏆".to_string(),
            created_at: Utc::now(),
        }
    }

    fn ids(values: &[i64]) -> BTreeSet<i64> {
        values.iter().copied().collect()
    }

    #[tokio::test]
    async fn test_incomplete_module_awards_nothing() {
        let mut tx = MockProgressTx::new();
        tx.expect_module_topic_ids().returning(|_| Ok(ids(&[1, 2, 3])));
        tx.expect_completed_topic_ids().returning(|_| Ok(ids(&[1, 2])));
        tx.expect_find_badge_by_name().never();
        tx.expect_grant_badge().never();

        let awarded = BadgeEngine::new()
            .evaluate_module_completion(&mut tx, 9, &intro())
            .await
            .unwrap();

        assert!(awarded.is_none());
    }

    #[tokio::test]
    async fn test_first_qualifier_creates_and_grants_badge() {
        let mut tx = MockProgressTx::new();
        tx.expect_module_topic_ids().returning(|_| Ok(ids(&[1, 2])));
        tx.expect_completed_topic_ids().returning(|_| Ok(ids(&[1, 2])));
        tx.expect_find_badge_by_name().returning(|_| Ok(None));
        tx.expect_create_badge()
            .withf(|b: &NewBadge| {
                b.name == "Module Master - Intro"
                    && b.description == "Completed all topics in the Intro module."
                    && b.icon == "🏆"
            })
            .times(1)
            .returning(|_| Ok(intro_badge()));
        tx.expect_grant_badge()
            .withf(|user_id, badge_id| *user_id == 9 && *badge_id == 77)
            .times(1)
            .returning(|_, _| Ok(true));

        let awarded = BadgeEngine::new()
            .evaluate_module_completion(&mut tx, 9, &intro())
            .await
            .unwrap();

        assert_eq!(awarded.map(|b| b.id), Some(77));
    }

    #[tokio::test]
    async fn test_existing_badge_is_reused() {
        let mut tx = MockProgressTx::new();
        tx.expect_module_topic_ids().returning(|_| Ok(ids(&[1])));
        tx.expect_completed_topic_ids().returning(|_| Ok(ids(&[1])));
        tx.expect_find_badge_by_name()
            .returning(|_| Ok(Some(intro_badge())));
        tx.expect_create_badge().never();
        tx.expect_grant_badge().returning(|_, _| Ok(true));

        let awarded = BadgeEngine::new()
            .evaluate_module_completion(&mut tx, 9, &intro())
            .await
            .unwrap();

        assert!(awarded.is_some());
    }

    #[tokio::test]
    async fn test_already_held_badge_is_not_reawarded() {
        let mut tx = MockProgressTx::new();
        tx.expect_module_topic_ids().returning(|_| Ok(ids(&[1])));
        tx.expect_completed_topic_ids().returning(|_| Ok(ids(&[1])));
        tx.expect_find_badge_by_name()
            .returning(|_| Ok(Some(intro_badge())));
        tx.expect_grant_badge().times(1).returning(|_, _| Ok(false));

        let awarded = BadgeEngine::new()
            .evaluate_module_completion(&mut tx, 9, &intro())
            .await
            .unwrap();

        assert!(awarded.is_none());
    }

    #[tokio::test]
    async fn test_name_conflict_rereads_and_grants_winner_badge() {
        let mut tx = MockProgressTx::new();
        let mut seq = Sequence::new();
        tx.expect_module_topic_ids().returning(|_| Ok(ids(&[1, 2])));
        tx.expect_completed_topic_ids().returning(|_| Ok(ids(&[1, 2])));
        tx.expect_find_badge_by_name()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(None));
        tx.expect_create_badge()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|b| Err(ProgressError::BadgeNameConflict(b.name.clone())));
        tx.expect_find_badge_by_name()
            .withf(|name: &str| name == "Module Master - Intro")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(Some(intro_badge())));
        tx.expect_grant_badge()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(true));

        let awarded = BadgeEngine::new()
            .evaluate_module_completion(&mut tx, 9, &intro())
            .await
            .unwrap();

        assert_eq!(awarded.map(|b| b.name), Some("Module Master - Intro".to_string()));
    }

    #[tokio::test]
    async fn test_storage_error_during_create_propagates() {
        let mut tx = MockProgressTx::new();
        tx.expect_module_topic_ids().returning(|_| Ok(ids(&[1])));
        tx.expect_completed_topic_ids().returning(|_| Ok(ids(&[1])));
        tx.expect_find_badge_by_name().returning(|_| Ok(None));
        tx.expect_create_badge()
            .returning(|_| Err(ProgressError::Storage(sqlx::Error::PoolTimedOut)));
        tx.expect_grant_badge().never();

        let err = BadgeEngine::new()
            .evaluate_module_completion(&mut tx, 9, &intro())
            .await
            .unwrap_err();

        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_empty_module_qualifies() {
        let mut tx = MockProgressTx::new();
        tx.expect_module_topic_ids().returning(|_| Ok(BTreeSet::new()));
        tx.expect_completed_topic_ids().returning(|_| Ok(BTreeSet::new()));
        tx.expect_find_badge_by_name()
            .returning(|_| Ok(Some(intro_badge())));
        tx.expect_grant_badge().returning(|_, _| Ok(true));

        let awarded = BadgeEngine::new()
            .evaluate_module_completion(&mut tx, 9, &intro())
            .await
            .unwrap();

        assert!(awarded.is_some());
    }
}
