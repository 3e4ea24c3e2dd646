//! 学习进度服务入口
//!
//! 提供主题完成、进度查询与徽章查询的 REST API。

use std::sync::Arc;
use std::time::Duration;

use anyhow::bail;
use axum::{
    extract::Request,
    http::{HeaderValue, header},
    middleware::{self, Next},
    response::Response,
};
use learning_api::{
    auth::{JwtConfig, JwtManager},
    routes,
    state::AppState,
};
use learning_progress::{PgProgressStore, ProgressService};
use learning_shared::{
    config::AppConfig,
    database::Database,
    error::InfraError,
    observability,
    retry::{RetryPolicy, retry_with_policy},
};
use tokio::net::TcpListener;
use tower_http::timeout::TimeoutLayer;
use tracing::{error, info, warn};

const SERVICE_NAME: &str = "learning-api";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load(SERVICE_NAME)?;

    let obs_config = config
        .observability
        .clone()
        .with_service_name(&config.service_name);
    let _guard = observability::init(&obs_config).await?;

    info!("Starting {} on {}", SERVICE_NAME, config.server_addr());

    // 连接阶段的瞬时故障按默认策略重试
    let db = retry_with_policy(
        &RetryPolicy::default(),
        "database_connect",
        InfraError::is_retryable,
        || Database::connect(&config.database),
    )
    .await?;
    if config.database.run_migrations {
        db.run_migrations().await?;
    }

    let jwt_manager = JwtManager::new(jwt_config_from_env(&config)?);
    let service = ProgressService::new(PgProgressStore::new(db.pool().clone()));
    let state = AppState::new(Arc::new(service), jwt_manager).with_database(db.clone());

    let app = routes::app(state)
        .layer(middleware::from_fn(security_headers))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_seconds,
        )));

    let listener = TcpListener::bind(config.server_addr()).await?;
    info!("Listening on {}", config.server_addr());

    // 收到 SIGTERM 或 Ctrl+C 后停止接收新连接，等待已有请求处理完毕
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server shutdown complete");

    Ok(())
}

/// JWT 校验配置：生产环境必须通过环境变量注入密钥
fn jwt_config_from_env(config: &AppConfig) -> anyhow::Result<JwtConfig> {
    let defaults = JwtConfig::default();

    let secret = match std::env::var("LEARN_JWT_SECRET") {
        Ok(secret) => secret,
        Err(_) if config.is_production() => {
            bail!("LEARN_JWT_SECRET must be set in production environment")
        }
        Err(_) => {
            warn!("Using default JWT secret - set LEARN_JWT_SECRET for production");
            defaults.secret
        }
    };

    let issuer = std::env::var("LEARN_JWT_ISSUER").unwrap_or(defaults.issuer);

    Ok(JwtConfig { secret, issuer })
}

/// 为所有响应注入 HTTP 安全头
async fn security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(
        header::STRICT_TRANSPORT_SECURITY,
        HeaderValue::from_static("max-age=31536000; includeSubDomains"),
    );
    response
}

/// 监听关闭信号
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "注册 Ctrl+C 处理器失败");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "注册 SIGTERM 处理器失败");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown..."),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown..."),
    }
}
