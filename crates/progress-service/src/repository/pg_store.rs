//! PostgreSQL 存储实现

use std::collections::BTreeSet;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use super::traits::{ProgressStore, ProgressTx};
use crate::error::{ProgressError, Result};
use crate::models::{AwardedBadge, Badge, Module, NewBadge, Topic, TopicCompletion, User};

/// 基于连接池的存储
#[derive(Clone)]
pub struct PgProgressStore {
    pool: PgPool,
}

impl PgProgressStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProgressStore for PgProgressStore {
    type Tx = PgProgressTx;

    async fn begin(&self) -> Result<PgProgressTx> {
        let tx = self.pool.begin().await?;
        Ok(PgProgressTx { tx })
    }
}

/// PostgreSQL 事务句柄
///
/// 使用默认的 READ COMMITTED 隔离级别：`ON CONFLICT DO NOTHING` 会等待并发的
/// 同键插入结束，之后的读取能看到对方已提交的行。同一用户的并发完成由
/// `lock_user` 的行锁排队，后到的事务能看到先到者提交的完成记录。
pub struct PgProgressTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl ProgressTx for PgProgressTx {
    // ==================== 目录 ====================

    async fn find_user(&mut self, user_id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, role, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(user)
    }

    async fn lock_user(&mut self, user_id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, role, created_at
            FROM users
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(user_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(user)
    }

    async fn find_topic(&mut self, topic_id: i64) -> Result<Option<Topic>> {
        let topic = sqlx::query_as::<_, Topic>(
            r#"
            SELECT id, module_id, name
            FROM topics
            WHERE id = $1
            "#,
        )
        .bind(topic_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(topic)
    }

    async fn find_module(&mut self, module_id: i64) -> Result<Option<Module>> {
        let module = sqlx::query_as::<_, Module>(
            r#"
            SELECT id, course_id, name, description
            FROM modules
            WHERE id = $1
            "#,
        )
        .bind(module_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(module)
    }

    async fn module_topic_ids(&mut self, module_id: i64) -> Result<BTreeSet<i64>> {
        let ids: Vec<i64> = sqlx::query_scalar("SELECT id FROM topics WHERE module_id = $1")
            .bind(module_id)
            .fetch_all(&mut *self.tx)
            .await?;

        Ok(ids.into_iter().collect())
    }

    // ==================== 完成账本 ====================

    async fn completed_topic_ids(&mut self, user_id: i64) -> Result<BTreeSet<i64>> {
        let ids: Vec<i64> =
            sqlx::query_scalar("SELECT topic_id FROM user_topic_progress WHERE user_id = $1")
                .bind(user_id)
                .fetch_all(&mut *self.tx)
                .await?;

        Ok(ids.into_iter().collect())
    }

    async fn list_completions(&mut self, user_id: i64) -> Result<Vec<TopicCompletion>> {
        let rows = sqlx::query_as::<_, TopicCompletion>(
            r#"
            SELECT topic_id, completed_at
            FROM user_topic_progress
            WHERE user_id = $1
            ORDER BY completed_at, topic_id
            "#,
        )
        .bind(user_id)
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(rows)
    }

    async fn completed_module_ids(&mut self, user_id: i64) -> Result<Vec<i64>> {
        let ids: Vec<i64> = sqlx::query_scalar(
            r#"
            SELECT DISTINCT t.module_id
            FROM user_topic_progress p
            JOIN topics t ON t.id = p.topic_id
            WHERE p.user_id = $1
            ORDER BY t.module_id
            "#,
        )
        .bind(user_id)
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(ids)
    }

    async fn insert_completion(&mut self, user_id: i64, topic_id: i64) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO user_topic_progress (user_id, topic_id, completed_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (user_id, topic_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(topic_id)
        .execute(&mut *self.tx)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    // ==================== 徽章 ====================

    async fn find_badge_by_name(&mut self, name: &str) -> Result<Option<Badge>> {
        let badge = sqlx::query_as::<_, Badge>(
            r#"
            SELECT id, name, description, icon, created_at
            FROM badges
            WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(badge)
    }

    async fn create_badge(&mut self, badge: &NewBadge) -> Result<Badge> {
        // 唯一约束冲突会让 PostgreSQL 事务进入 aborted 状态，这里用 DO NOTHING 代替报错
        let created = sqlx::query_as::<_, Badge>(
            r#"
            INSERT INTO badges (name, description, icon, created_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (name) DO NOTHING
            RETURNING id, name, description, icon, created_at
            "#,
        )
        .bind(&badge.name)
        .bind(&badge.description)
        .bind(&badge.icon)
        .fetch_optional(&mut *self.tx)
        .await?;

        created.ok_or_else(|| ProgressError::BadgeNameConflict(badge.name.clone()))
    }

    async fn grant_badge(&mut self, user_id: i64, badge_id: i64) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO user_badges (user_id, badge_id, awarded_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (user_id, badge_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(badge_id)
        .execute(&mut *self.tx)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn list_user_badges(&mut self, user_id: i64) -> Result<Vec<AwardedBadge>> {
        let badges = sqlx::query_as::<_, AwardedBadge>(
            r#"
            SELECT b.id, b.name, b.description, b.icon, ub.awarded_at
            FROM user_badges ub
            JOIN badges b ON b.id = ub.badge_id
            WHERE ub.user_id = $1
            ORDER BY ub.awarded_at, b.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(badges)
    }

    async fn commit(self) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }
}
