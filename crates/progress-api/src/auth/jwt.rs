//! JWT Token 校验

use jsonwebtoken::{DecodingKey, Validation, decode};
use learning_progress::UserRole;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// JWT 配置
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// 签名密钥，与签发方共享
    pub secret: String,
    /// 期望的签发者
    pub issuer: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: "learning-secret-key-change-in-production".to_string(),
            issuer: "learning-auth".to_string(),
        }
    }
}

/// JWT Claims（Token 载荷）
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// 用户 ID
    pub sub: String,
    pub username: String,
    pub role: UserRole,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
}

impl Claims {
    /// 解析 sub 中的用户 ID
    pub fn user_id(&self) -> Result<i64, ApiError> {
        self.sub
            .parse()
            .map_err(|_| ApiError::Unauthorized("Invalid token subject.".to_string()))
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// JWT 管理器
#[derive(Clone)]
pub struct JwtManager {
    config: JwtConfig,
    decoding_key: DecodingKey,
}

impl JwtManager {
    pub fn new(config: JwtConfig) -> Self {
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            decoding_key,
        }
    }

    /// 验证并解析 JWT Token
    pub fn verify_token(&self, token: &str) -> Result<Claims, ApiError> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.config.issuer]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(
            |e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    ApiError::Unauthorized("Token has expired.".to_string())
                }
                _ => ApiError::Unauthorized("Invalid token.".to_string()),
            },
        )?;

        Ok(token_data.claims)
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl JwtManager {
    /// 签发 Token
    ///
    /// 线上 Token 由认证服务签发，这里仅供测试使用
    pub fn issue_token(
        &self,
        user_id: i64,
        username: &str,
        role: UserRole,
        expires_in_secs: i64,
    ) -> Result<String, ApiError> {
        use chrono::{Duration, Utc};
        use jsonwebtoken::{EncodingKey, Header, encode};

        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            role,
            iat: now.timestamp(),
            exp: (now + Duration::seconds(expires_in_secs)).timestamp(),
            iss: self.config.issuer.clone(),
        };

        let key = EncodingKey::from_secret(self.config.secret.as_bytes());
        encode(&Header::default(), &claims, &key)
            .map_err(|e| ApiError::Internal(format!("JWT 生成失败: {}", e)))
    }
}
