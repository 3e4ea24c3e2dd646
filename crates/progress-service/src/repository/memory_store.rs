//! 内存存储
//!
//! 适用于测试和本地开发。事务通过 tokio 互斥锁串行化：`begin` 获取锁并复制一份
//! 工作快照，`commit` 把快照写回，丢弃句柄则快照作废（即回滚）。

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::traits::{ProgressStore, ProgressTx};
use crate::error::{ProgressError, Result};
use crate::models::{
    AwardedBadge, Badge, Module, NewBadge, Topic, TopicCompletion, User, UserRole,
};

#[derive(Debug, Clone)]
struct CompletionRow {
    user_id: i64,
    topic_id: i64,
    completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct GrantRow {
    user_id: i64,
    badge_id: i64,
    awarded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
struct MemoryState {
    next_id: i64,
    users: BTreeMap<i64, User>,
    modules: BTreeMap<i64, Module>,
    topics: BTreeMap<i64, Topic>,
    badges: BTreeMap<i64, Badge>,
    // 按插入顺序追加，即完成/授予时间顺序
    completions: Vec<CompletionRow>,
    grants: Vec<GrantRow>,
}

impl MemoryState {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// 内存存储
#[derive(Clone, Default)]
pub struct MemoryProgressStore {
    state: Arc<Mutex<MemoryState>>,
    pending_commit_failures: Arc<AtomicUsize>,
}

impl MemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ==================== 目录数据 ====================

    pub async fn add_user(&self, username: &str, email: &str, role: UserRole) -> User {
        let mut state = self.state.lock().await;
        let user = User {
            id: state.allocate_id(),
            username: username.to_string(),
            email: email.to_string(),
            role,
            created_at: Utc::now(),
        };
        state.users.insert(user.id, user.clone());
        user
    }

    pub async fn add_module(&self, course_id: i64, name: &str) -> Module {
        let mut state = self.state.lock().await;
        let module = Module {
            id: state.allocate_id(),
            course_id,
            name: name.to_string(),
            description: None,
        };
        state.modules.insert(module.id, module.clone());
        module
    }

    pub async fn add_topic(&self, module_id: i64, name: &str) -> Topic {
        let mut state = self.state.lock().await;
        let topic = Topic {
            id: state.allocate_id(),
            module_id,
            name: name.to_string(),
        };
        state.topics.insert(topic.id, topic.clone());
        topic
    }

    // ==================== 检查 ====================

    /// 同名徽章的数量
    pub async fn badge_count(&self, name: &str) -> usize {
        let state = self.state.lock().await;
        state.badges.values().filter(|b| b.name == name).count()
    }

    /// 用户的完成记录数量
    pub async fn completion_count(&self, user_id: i64) -> usize {
        let state = self.state.lock().await;
        state
            .completions
            .iter()
            .filter(|row| row.user_id == user_id)
            .count()
    }

    /// 让接下来的 `count` 次提交失败，用于验证原子性和重试
    #[cfg(any(test, feature = "test-utils"))]
    pub fn inject_commit_failures(&self, count: usize) {
        self.pending_commit_failures.store(count, Ordering::SeqCst);
    }
}

#[async_trait]
impl ProgressStore for MemoryProgressStore {
    type Tx = MemoryProgressTx;

    async fn begin(&self) -> Result<MemoryProgressTx> {
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();
        Ok(MemoryProgressTx {
            guard,
            working,
            pending_commit_failures: self.pending_commit_failures.clone(),
        })
    }
}

/// 内存事务句柄
pub struct MemoryProgressTx {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
    pending_commit_failures: Arc<AtomicUsize>,
}

#[async_trait]
impl ProgressTx for MemoryProgressTx {
    async fn find_user(&mut self, user_id: i64) -> Result<Option<User>> {
        Ok(self.working.users.get(&user_id).cloned())
    }

    // 事务持有全局锁，用户行天然已被锁定
    async fn lock_user(&mut self, user_id: i64) -> Result<Option<User>> {
        self.find_user(user_id).await
    }

    async fn find_topic(&mut self, topic_id: i64) -> Result<Option<Topic>> {
        Ok(self.working.topics.get(&topic_id).cloned())
    }

    async fn find_module(&mut self, module_id: i64) -> Result<Option<Module>> {
        Ok(self.working.modules.get(&module_id).cloned())
    }

    async fn module_topic_ids(&mut self, module_id: i64) -> Result<BTreeSet<i64>> {
        Ok(self
            .working
            .topics
            .values()
            .filter(|t| t.module_id == module_id)
            .map(|t| t.id)
            .collect())
    }

    async fn completed_topic_ids(&mut self, user_id: i64) -> Result<BTreeSet<i64>> {
        Ok(self
            .working
            .completions
            .iter()
            .filter(|row| row.user_id == user_id)
            .map(|row| row.topic_id)
            .collect())
    }

    async fn list_completions(&mut self, user_id: i64) -> Result<Vec<TopicCompletion>> {
        Ok(self
            .working
            .completions
            .iter()
            .filter(|row| row.user_id == user_id)
            .map(|row| TopicCompletion {
                topic_id: row.topic_id,
                completed_at: row.completed_at,
            })
            .collect())
    }

    async fn completed_module_ids(&mut self, user_id: i64) -> Result<Vec<i64>> {
        let topics = &self.working.topics;
        let modules: BTreeSet<i64> = self
            .working
            .completions
            .iter()
            .filter(|row| row.user_id == user_id)
            .filter_map(|row| topics.get(&row.topic_id).map(|t| t.module_id))
            .collect();
        Ok(modules.into_iter().collect())
    }

    async fn insert_completion(&mut self, user_id: i64, topic_id: i64) -> Result<bool> {
        let exists = self
            .working
            .completions
            .iter()
            .any(|row| row.user_id == user_id && row.topic_id == topic_id);
        if exists {
            return Ok(false);
        }
        self.working.completions.push(CompletionRow {
            user_id,
            topic_id,
            completed_at: Utc::now(),
        });
        Ok(true)
    }

    async fn find_badge_by_name(&mut self, name: &str) -> Result<Option<Badge>> {
        Ok(self
            .working
            .badges
            .values()
            .find(|b| b.name == name)
            .cloned())
    }

    async fn create_badge(&mut self, badge: &NewBadge) -> Result<Badge> {
        if self.working.badges.values().any(|b| b.name == badge.name) {
            return Err(ProgressError::BadgeNameConflict(badge.name.clone()));
        }
        let created = Badge {
            id: self.working.allocate_id(),
            name: badge.name.clone(),
            description: badge.description.clone(),
            icon: badge.icon.clone(),
            created_at: Utc::now(),
        };
        self.working.badges.insert(created.id, created.clone());
        Ok(created)
    }

    async fn grant_badge(&mut self, user_id: i64, badge_id: i64) -> Result<bool> {
        let held = self
            .working
            .grants
            .iter()
            .any(|row| row.user_id == user_id && row.badge_id == badge_id);
        if held {
            return Ok(false);
        }
        self.working.grants.push(GrantRow {
            user_id,
            badge_id,
            awarded_at: Utc::now(),
        });
        Ok(true)
    }

    async fn list_user_badges(&mut self, user_id: i64) -> Result<Vec<AwardedBadge>> {
        let badges = &self.working.badges;
        Ok(self
            .working
            .grants
            .iter()
            .filter(|row| row.user_id == user_id)
            .filter_map(|row| {
                badges.get(&row.badge_id).map(|b| AwardedBadge {
                    id: b.id,
                    name: b.name.clone(),
                    description: b.description.clone(),
                    icon: b.icon.clone(),
                    awarded_at: row.awarded_at,
                })
            })
            .collect())
    }

    async fn commit(self) -> Result<()> {
        let Self {
            mut guard,
            working,
            pending_commit_failures,
        } = self;

        let injected = pending_commit_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if injected {
            return Err(ProgressError::Storage(sqlx::Error::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "commit failed",
            ))));
        }

        *guard = working;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded() -> (MemoryProgressStore, User, Topic) {
        let store = MemoryProgressStore::new();
        let user = store.add_user("alice", "alice@example.com", UserRole::Student).await;
        let module = store.add_module(1, "Intro").await;
        let topic = store.add_topic(module.id, "Variables").await;
        (store, user, topic)
    }

    #[tokio::test]
    async fn test_committed_changes_are_visible() {
        let (store, user, topic) = seeded().await;

        let mut tx = store.begin().await.unwrap();
        assert!(tx.insert_completion(user.id, topic.id).await.unwrap());
        tx.commit().await.unwrap();

        let mut tx = store.begin().await.unwrap();
        let ids = tx.completed_topic_ids(user.id).await.unwrap();
        assert_eq!(ids.into_iter().collect::<Vec<_>>(), vec![topic.id]);
    }

    #[tokio::test]
    async fn test_dropped_tx_rolls_back() {
        let (store, user, topic) = seeded().await;

        {
            let mut tx = store.begin().await.unwrap();
            tx.insert_completion(user.id, topic.id).await.unwrap();
        }

        assert_eq!(store.completion_count(user.id).await, 0);
    }

    #[tokio::test]
    async fn test_injected_commit_failure_discards_changes() {
        let (store, user, topic) = seeded().await;
        store.inject_commit_failures(1);

        let mut tx = store.begin().await.unwrap();
        tx.insert_completion(user.id, topic.id).await.unwrap();
        let err = tx.commit().await.unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(store.completion_count(user.id).await, 0);

        // 只失败一次
        let mut tx = store.begin().await.unwrap();
        tx.insert_completion(user.id, topic.id).await.unwrap();
        tx.commit().await.unwrap();
        assert_eq!(store.completion_count(user.id).await, 1);
    }

    #[tokio::test]
    async fn test_insert_completion_is_idempotent() {
        let (store, user, topic) = seeded().await;
        let mut tx = store.begin().await.unwrap();

        assert!(tx.insert_completion(user.id, topic.id).await.unwrap());
        assert!(!tx.insert_completion(user.id, topic.id).await.unwrap());
        assert_eq!(tx.list_completions(user.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_badge_reports_name_conflict() {
        let store = MemoryProgressStore::new();
        let mut tx = store.begin().await.unwrap();

        let badge = NewBadge::module_master("Intro");
        tx.create_badge(&badge).await.unwrap();
        let err = tx.create_badge(&badge).await.unwrap_err();
        assert!(matches!(err, ProgressError::BadgeNameConflict(name) if name == badge.name));
    }

    #[tokio::test]
    async fn test_grant_badge_is_idempotent() {
        let (store, user, _) = seeded().await;
        let mut tx = store.begin().await.unwrap();

        let badge = tx.create_badge(&NewBadge::module_master("Intro")).await.unwrap();
        assert!(tx.grant_badge(user.id, badge.id).await.unwrap());
        assert!(!tx.grant_badge(user.id, badge.id).await.unwrap());

        let held = tx.list_user_badges(user.id).await.unwrap();
        assert_eq!(held.len(), 1);
        assert_eq!(held[0].name, "Module Master - Intro");
    }

    #[tokio::test]
    async fn test_completed_module_ids() {
        let (store, user, topic) = seeded().await;
        let other = store.add_module(1, "Advanced").await;
        let other_topic = store.add_topic(other.id, "Traits").await;

        let mut tx = store.begin().await.unwrap();
        tx.insert_completion(user.id, other_topic.id).await.unwrap();
        tx.insert_completion(user.id, topic.id).await.unwrap();

        let modules = tx.completed_module_ids(user.id).await.unwrap();
        assert_eq!(modules, vec![topic.module_id, other.id]);
    }
}
