//! 管理员 API 处理器
//!
//! 查看任意用户的进度，以及基于已存储状态补发遗漏的徽章

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use learning_progress::{AwardedBadge, Badge, UserProgress};
use tracing::info;

use crate::{auth::Claims, dto::ApiResponse, error::Result, state::AppState};

/// GET /api/admin/users/{id}/progress
pub async fn get_user_progress(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<ApiResponse<UserProgress>>> {
    let progress = state.tracker.user_progress(user_id).await?;
    Ok(Json(ApiResponse::success(progress)))
}

/// GET /api/admin/users/{id}/badges
pub async fn get_user_badges(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<AwardedBadge>>>> {
    let badges = state.tracker.user_badges(user_id).await?;
    Ok(Json(ApiResponse::success(badges)))
}

/// 重新评估用户的模块徽章
///
/// POST /api/admin/users/{id}/badges/reevaluate
pub async fn reevaluate_user_badges(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(user_id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<Badge>>>> {
    let awarded = state.tracker.reevaluate_user_badges(user_id).await?;

    info!(
        operator = %claims.username,
        user_id,
        awarded = awarded.len(),
        "管理员触发徽章重新评估"
    );

    let message = format!("{} badge(s) awarded.", awarded.len());
    Ok(Json(ApiResponse::success_with_message(awarded, message)))
}
