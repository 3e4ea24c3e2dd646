//! 学员进度 API 处理器
//!
//! 所有接口都作用于 Token 中的当前用户

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use learning_progress::{AwardedBadge, CompletionOutcome, ModuleProgress, UserProgress};
use learning_shared::retry::retry_with_policy;

use crate::{auth::Claims, dto::ApiResponse, error::Result, state::AppState};

/// 标记主题完成
///
/// POST /api/topics/{id}/complete
///
/// 新完成返回 201，此前已完成返回 200。存储故障时按重试策略整体重试，
/// 操作本身幂等，重试不会产生重复记录或重复徽章。
pub async fn complete_topic(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(topic_id): Path<i64>,
) -> Result<(StatusCode, Json<ApiResponse<CompletionOutcome>>)> {
    let user_id = claims.user_id()?;
    let tracker = state.tracker.clone();

    let outcome = retry_with_policy(
        &state.retry_policy,
        "complete_topic",
        |e: &learning_progress::ProgressError| e.is_retryable(),
        || tracker.complete_topic(user_id, topic_id),
    )
    .await?;

    let status = if outcome.is_already_completed() {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    let message = outcome.message.clone();

    Ok((status, Json(ApiResponse::success_with_message(outcome, message))))
}

/// 当前用户的完成进度
///
/// GET /api/progress
pub async fn get_progress(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<UserProgress>>> {
    let progress = state.tracker.user_progress(claims.user_id()?).await?;
    Ok(Json(ApiResponse::success(progress)))
}

/// 当前用户已获得的徽章
///
/// GET /api/badges
pub async fn get_badges(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<Vec<AwardedBadge>>>> {
    let badges = state.tracker.user_badges(claims.user_id()?).await?;
    Ok(Json(ApiResponse::success(badges)))
}

/// 当前用户在某个模块的进度
///
/// GET /api/modules/{id}/progress
pub async fn get_module_progress(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(module_id): Path<i64>,
) -> Result<Json<ApiResponse<ModuleProgress>>> {
    let progress = state
        .tracker
        .module_progress(claims.user_id()?, module_id)
        .await?;
    Ok(Json(ApiResponse::success(progress)))
}
