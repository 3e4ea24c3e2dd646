//! 徽章模型
//!
//! 徽章按名称唯一，在第一个满足条件的用户出现时懒创建，之后被所有用户共享

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// 模块完成徽章的名称前缀
pub const MODULE_MASTER_PREFIX: &str = "Module Master - ";

/// 模块完成徽章使用的固定图标
pub const MODULE_MASTER_ICON: &str = "🏆";

/// 徽章实体
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub created_at: DateTime<Utc>,
}

/// 待创建的徽章
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBadge {
    pub name: String,
    pub description: String,
    pub icon: String,
}

impl NewBadge {
    /// 构造某个模块的 "Module Master" 徽章
    pub fn module_master(module_name: &str) -> Self {
        Self {
            name: module_master_badge_name(module_name),
            description: format!("Completed all topics in the {} module.", module_name),
            icon: MODULE_MASTER_ICON.to_string(),
        }
    }
}

/// 模块完成徽章的名称
pub fn module_master_badge_name(module_name: &str) -> String {
    format!("{}{}", MODULE_MASTER_PREFIX, module_name)
}

/// 用户已获得的徽章（badges 与 user_badges 的联结视图）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AwardedBadge {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub awarded_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_master_badge() {
        let badge = NewBadge::module_master("Intro");
        assert_eq!(badge.name, "Module Master - Intro");
        assert_eq!(badge.description, "Completed all topics in the Intro module.");
        assert_eq!(badge.icon, "🏆");
    }

    #[test]
    fn test_module_master_name_keeps_module_name_verbatim() {
        assert_eq!(
            module_master_badge_name("Ownership & Borrowing"),
            "Module Master - Ownership & Borrowing"
        );
    }
}
