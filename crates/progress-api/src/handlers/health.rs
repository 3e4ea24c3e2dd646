//! 探针接口

use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::state::AppState;

const SERVICE_NAME: &str = "learning-api";

/// GET /ping
pub async fn ping() -> Json<Value> {
    Json(json!({ "message": "pong!" }))
}

/// 存活探针：服务进程正常即返回 ok
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": SERVICE_NAME
    }))
}

/// 就绪探针：检查数据库连接是否可用
///
/// 未配置数据库（内存存储）时视为就绪
pub async fn readiness_check(State(state): State<AppState>) -> Json<Value> {
    let db_status = match &state.database {
        Some(db) => match db.health_check().await {
            Ok(()) => "ok",
            Err(_) => "fail",
        },
        None => "skipped",
    };

    Json(json!({
        "status": if db_status == "fail" { "degraded" } else { "ok" },
        "service": SERVICE_NAME,
        "checks": {
            "database": db_status
        }
    }))
}
