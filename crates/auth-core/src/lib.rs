//! console-auth-core - 认证核心库
//!
//! JWT Claims / TokenService / 请求级认证上下文

use chrono::{Duration, Utc};
use console_common::UserId;
use console_errors::{AppError, AppResult};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT Claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// 用户 ID
    pub uid: i64,
    /// 角色 ID 列表（逗号分隔）
    #[serde(default)]
    pub scope: String,
    /// Expiration time
    pub exp: i64,
    /// Issued at
    pub iat: i64,
    /// JWT ID
    pub jti: String,
    /// Issuer
    #[serde(default)]
    pub iss: String,
}

impl Claims {
    pub fn new(user_id: UserId, scope: &str, expires_in_secs: i64, issuer: &str) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id.to_string(),
            uid: user_id.0,
            scope: scope.to_string(),
            exp: (now + Duration::seconds(expires_in_secs)).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::now_v7().to_string(),
            iss: issuer.to_string(),
        }
    }

    pub fn user_id(&self) -> UserId {
        UserId(self.uid)
    }
}

/// 请求级认证上下文
///
/// 由认证中间件在 token 校验通过后写入请求扩展
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub uid: UserId,
    /// 角色 ID 列表（逗号分隔）
    pub scope: String,
}

impl AuthContext {
    pub fn new(uid: UserId, scope: impl Into<String>) -> Self {
        Self {
            uid,
            scope: scope.into(),
        }
    }
}

impl From<&Claims> for AuthContext {
    fn from(claims: &Claims) -> Self {
        Self::new(claims.user_id(), claims.scope.clone())
    }
}

/// Token 服务
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expires_in: i64,
    issuer: String,
}

impl TokenService {
    pub fn new(secret: &str, expires_in: i64, issuer: impl Into<String>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expires_in,
            issuer: issuer.into(),
        }
    }

    /// 生成令牌
    pub fn generate_token(&self, user_id: UserId, scope: &str) -> AppResult<String> {
        let claims = Claims::new(user_id, scope, self.expires_in, &self.issuer);

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to generate token: {}", e)))
    }

    /// 验证令牌
    pub fn validate_token(&self, token: &str) -> AppResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        validation.validate_exp = true;
        validation.validate_nbf = false;
        validation.leeway = 0; // 不允许时间偏差

        let token_data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => {
                    AppError::unauthenticated("Token expired, please log in again")
                }
                _ => AppError::unauthenticated(format!("Invalid token: {}", e)),
            })?;

        let claims = token_data.claims;

        if claims.jti.is_empty() {
            return Err(AppError::unauthenticated("Token ID (jti) missing"));
        }
        if claims.sub != claims.uid.to_string() {
            return Err(AppError::unauthenticated("Token subject mismatch"));
        }

        Ok(claims)
    }

    /// 令牌有效期（秒）
    pub fn expires_in(&self) -> i64 {
        self.expires_in
    }
}
