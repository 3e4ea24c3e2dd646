//! 管理员角色检查

use axum::{
    body::Body,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use super::extract_claims;
use crate::error::ApiError;

/// 仅允许管理员访问，需位于认证中间件之后
pub async fn require_admin(request: Request<Body>, next: Next) -> Response {
    let caller = extract_claims(&request).map(|c| (c.is_admin(), c.username.clone()));

    match caller {
        Some((true, _)) => next.run(request).await,
        Some((false, username)) => {
            warn!(username = %username, path = %request.uri().path(), "非管理员访问管理接口");
            ApiError::admins_only().into_response()
        }
        None => ApiError::Unauthorized("Missing authorization token.".to_string()).into_response(),
    }
}
