//! HTTP 层错误类型定义
//!
//! 负责把服务层错误映射为 HTTP 状态码和稳定的错误码

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use learning_progress::ProgressError;
use learning_shared::error::is_transient_db_error;
use learning_shared::observability::tracing::current_trace_id;
use serde_json::json;

/// HTTP 层错误类型
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    // 认证错误
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    // 系统错误
    #[error("storage unavailable: {0}")]
    ServiceUnavailable(String),
    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, ApiError>;

impl ApiError {
    /// 管理员接口的拒绝访问
    pub fn admins_only() -> Self {
        Self::Forbidden("Admins only!".to_string())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 返回错误码（用于 API 响应）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::ServiceUnavailable(_) => "STORAGE_UNAVAILABLE",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<ProgressError> for ApiError {
    fn from(err: ProgressError) -> Self {
        match err {
            ProgressError::UserNotFound(id) => Self::NotFound(format!("User {} not found.", id)),
            ProgressError::TopicNotFound(id) => Self::NotFound(format!("Topic {} not found.", id)),
            ProgressError::ModuleNotFound(id) => {
                Self::NotFound(format!("Module {} not found.", id))
            }
            ProgressError::BadgeNameConflict(name) => {
                Self::Conflict(format!("Badge \"{}\" already exists.", name))
            }
            ProgressError::Storage(e) if is_transient_db_error(&e) => {
                Self::ServiceUnavailable(e.to_string())
            }
            ProgressError::Storage(e) => Self::Internal(e.to_string()),
            ProgressError::Internal(msg) => Self::Internal(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // 系统级错误只返回通用提示，详细信息仅记录日志
        let message = match &self {
            Self::ServiceUnavailable(e) => {
                tracing::error!(error = %e, trace_id = ?current_trace_id(), "存储不可用");
                "Storage temporarily unavailable, please retry.".to_string()
            }
            Self::Internal(e) => {
                tracing::error!(error = %e, trace_id = ?current_trace_id(), "内部错误");
                "Internal server error.".to_string()
            }
            other => other.to_string(),
        };

        let body = json!({
            "success": false,
            "code": self.error_code(),
            "message": message,
            "data": serde_json::Value::Null
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_and_code_mapping() {
        let cases = [
            (ApiError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            (ApiError::admins_only(), StatusCode::FORBIDDEN, "FORBIDDEN"),
            (ApiError::NotFound("x".into()), StatusCode::NOT_FOUND, "NOT_FOUND"),
            (ApiError::Conflict("x".into()), StatusCode::CONFLICT, "CONFLICT"),
            (
                ApiError::ServiceUnavailable("x".into()),
                StatusCode::SERVICE_UNAVAILABLE,
                "STORAGE_UNAVAILABLE",
            ),
            (
                ApiError::Internal("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
            ),
        ];

        for (err, status, code) in cases {
            assert_eq!(err.status_code(), status, "{:?}", err);
            assert_eq!(err.error_code(), code, "{:?}", err);
        }
    }

    #[test]
    fn test_from_progress_error() {
        assert!(matches!(
            ApiError::from(ProgressError::TopicNotFound(3)),
            ApiError::NotFound(msg) if msg == "Topic 3 not found."
        ));
        assert!(matches!(
            ApiError::from(ProgressError::Storage(sqlx::Error::PoolClosed)),
            ApiError::ServiceUnavailable(_)
        ));
        assert!(matches!(
            ApiError::from(ProgressError::Storage(sqlx::Error::Decode("bad".into()))),
            ApiError::Internal(_)
        ));
        assert!(matches!(
            ApiError::from(ProgressError::BadgeNameConflict("b".into())),
            ApiError::Conflict(_)
        ));
    }

    #[test]
    fn test_admins_only_message() {
        assert_eq!(ApiError::admins_only().to_string(), "Admins only!");
    }
}
