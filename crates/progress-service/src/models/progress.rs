//! 学习进度模型

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{Badge, CompletionStatus};

/// 完成账本中的一条记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TopicCompletion {
    pub topic_id: i64,
    pub completed_at: DateTime<Utc>,
}

/// 完成主题操作的结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionOutcome {
    pub topic_id: i64,
    pub status: CompletionStatus,
    pub message: String,
    /// 本次调用新授予的徽章
    #[serde(skip_serializing_if = "Option::is_none")]
    pub awarded_badge: Option<Badge>,
}

impl CompletionOutcome {
    pub fn already_completed(topic_id: i64) -> Self {
        Self {
            topic_id,
            status: CompletionStatus::AlreadyCompleted,
            message: "Topic already marked as complete.".to_string(),
            awarded_badge: None,
        }
    }

    pub fn completed(topic_id: i64, awarded_badge: Option<Badge>) -> Self {
        let mut message = format!("Topic {} marked as complete.", topic_id);
        if let Some(badge) = &awarded_badge {
            message.push_str(&format!(
                " Congratulations! You earned the \"{}\" badge!",
                badge.name
            ));
        }
        Self {
            topic_id,
            status: CompletionStatus::Completed,
            message,
            awarded_badge,
        }
    }

    pub fn is_already_completed(&self) -> bool {
        self.status == CompletionStatus::AlreadyCompleted
    }
}

/// 用户的完成进度
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProgress {
    pub user_id: i64,
    /// 按完成时间排序，每个主题只出现一次
    pub completed_topic_ids: Vec<i64>,
}

/// 用户在单个模块内的进度汇总
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleProgress {
    pub module_id: i64,
    pub module_name: String,
    pub total_topics: usize,
    pub completed_topics: usize,
    pub is_complete: bool,
}

impl ModuleProgress {
    pub fn summarize(
        module_id: i64,
        module_name: String,
        module_topics: &BTreeSet<i64>,
        completed: &BTreeSet<i64>,
    ) -> Self {
        Self {
            module_id,
            module_name,
            total_topics: module_topics.len(),
            completed_topics: module_topics.intersection(completed).count(),
            is_complete: module_qualifies(module_topics, completed),
        }
    }
}

/// 模块完成判定：模块的主题集合是用户已完成集合的子集
///
/// 空模块视为满足条件
pub fn module_qualifies(module_topics: &BTreeSet<i64>, completed: &BTreeSet<i64>) -> bool {
    module_topics.is_subset(completed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn set(ids: &[i64]) -> BTreeSet<i64> {
        ids.iter().copied().collect()
    }

    fn sample_badge() -> Badge {
        Badge {
            id: 1,
            name: "Module Master - Intro".to_string(),
            description: "Completed all topics in the Intro module.".to_string(),
            icon: "🏆".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_module_qualifies() {
        let module = set(&[1, 2, 3]);
        assert!(!module_qualifies(&module, &set(&[1, 2])));
        assert!(module_qualifies(&module, &set(&[1, 2, 3])));
        assert!(module_qualifies(&module, &set(&[3, 1, 2, 9])));
        assert!(!module_qualifies(&module, &set(&[])));
    }

    #[test]
    fn test_empty_module_qualifies() {
        assert!(module_qualifies(&set(&[]), &set(&[])));
    }

    #[test]
    fn test_completed_message_without_badge() {
        let outcome = CompletionOutcome::completed(1, None);
        assert_eq!(outcome.message, "Topic 1 marked as complete.");
        assert_eq!(outcome.status, CompletionStatus::Completed);
        assert!(!outcome.is_already_completed());
    }

    #[test]
    fn test_completed_message_with_badge() {
        let outcome = CompletionOutcome::completed(2, Some(sample_badge()));
        assert_eq!(
            outcome.message,
            "Topic 2 marked as complete. Congratulations! You earned the \"Module Master - Intro\" badge!"
        );
    }

    #[test]
    fn test_already_completed_message() {
        let outcome = CompletionOutcome::already_completed(5);
        assert_eq!(outcome.message, "Topic already marked as complete.");
        assert!(outcome.is_already_completed());
        assert!(outcome.awarded_badge.is_none());
    }

    #[test]
    fn test_outcome_serializes_camel_case() {
        let json = serde_json::to_value(CompletionOutcome::completed(3, None)).unwrap();
        assert_eq!(json["topicId"], 3);
        assert_eq!(json["status"], "completed");
        assert!(json.get("awardedBadge").is_none());
    }

    #[test]
    fn test_module_progress_summary() {
        let summary = ModuleProgress::summarize(
            10,
            "Intro".to_string(),
            &set(&[1, 2, 3]),
            &set(&[2, 3, 7]),
        );
        assert_eq!(summary.total_topics, 3);
        assert_eq!(summary.completed_topics, 2);
        assert!(!summary.is_complete);
    }
}
