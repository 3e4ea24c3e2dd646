//! 认证模块
//!
//! 只校验 Bearer Token，Token 的签发由外部认证服务负责

mod jwt;

pub use jwt::{Claims, JwtConfig, JwtManager};
