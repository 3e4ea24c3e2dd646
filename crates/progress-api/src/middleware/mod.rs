//! 中间件

mod auth;
mod role;

pub use auth::{auth_middleware, extract_claims};
pub use role::require_admin;
