//! 路由配置模块

use axum::{
    Router, middleware,
    routing::{get, post},
};
use learning_shared::observability::middleware as obs_middleware;

use crate::{
    handlers,
    middleware::{auth_middleware, require_admin},
    state::AppState,
};

/// 学员接口
fn learner_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/topics/{id}/complete",
            post(handlers::progress::complete_topic),
        )
        .route("/progress", get(handlers::progress::get_progress))
        .route("/badges", get(handlers::progress::get_badges))
        .route(
            "/modules/{id}/progress",
            get(handlers::progress::get_module_progress),
        )
}

/// 管理员接口
fn admin_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/users/{id}/progress",
            get(handlers::admin::get_user_progress),
        )
        .route("/users/{id}/badges", get(handlers::admin::get_user_badges))
        .route(
            "/users/{id}/badges/reevaluate",
            post(handlers::admin::reevaluate_user_badges),
        )
        .route_layer(middleware::from_fn(require_admin))
}

/// 需要认证的 `/api` 路由
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(learner_routes())
        .nest("/admin", admin_routes())
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// 构建完整应用
pub fn app(state: AppState) -> Router {
    Router::new()
        .nest("/api", api_routes(state.clone()))
        .route("/ping", get(handlers::health::ping))
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        .layer(middleware::from_fn(obs_middleware::http_tracing))
        .layer(middleware::from_fn(obs_middleware::request_id))
        .with_state(state)
}
