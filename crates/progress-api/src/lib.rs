//! 学习进度 HTTP 服务
//!
//! 对外暴露主题完成、进度查询和徽章查询的 REST API，并为管理员提供按用户查询与徽章修复接口。
//!
//! ## 模块结构
//!
//! - `auth`: JWT 校验（Token 由外部认证服务签发）
//! - `middleware`: 认证与管理员角色中间件
//! - `dto`: 统一响应结构
//! - `error`: 错误类型及 HTTP 映射
//! - `handlers`: HTTP 请求处理器
//! - `routes`: 路由配置
//! - `state`: 应用状态
//!
//! ## 技术栈
//!
//! - Web 框架：Axum
//! - 序列化：serde (camelCase)

pub mod auth;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use dto::ApiResponse;
pub use error::{ApiError, Result};
pub use state::AppState;
