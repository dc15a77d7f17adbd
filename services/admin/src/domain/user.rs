//! 用户实体与值对象

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{DateTime, Utc};
use console_common::{RoleId, UserId};
use console_errors::AppError;
use email_address::EmailAddress;
use std::fmt;
use thiserror::Error;

/// 用户名
///
/// 3 到 32 个字符，仅允许字母、数字和下划线
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Username(String);

impl Username {
    pub const MIN_LEN: usize = 3;
    pub const MAX_LEN: usize = 32;

    pub fn parse(raw: &str) -> Result<Self, String> {
        let raw = raw.trim();
        let len = raw.chars().count();
        if !(Self::MIN_LEN..=Self::MAX_LEN).contains(&len) {
            return Err(format!(
                "User name must be {} to {} characters",
                Self::MIN_LEN,
                Self::MAX_LEN
            ));
        }
        if !raw.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err("User name may only contain letters, digits and '_'".to_string());
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// 邮箱（统一小写）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email(String);

impl Email {
    pub fn new(raw: &str) -> Result<Self, String> {
        let normalized = raw.trim().to_lowercase();
        if !EmailAddress::is_valid(&normalized) {
            return Err(format!("Invalid email address: {}", raw));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 密码错误
#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Password must be at least {0} characters")]
    TooShort(usize),

    #[error("Password must be at most {0} characters")]
    TooLong(usize),

    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    #[error("Stored password hash is invalid: {0}")]
    InvalidHash(String),
}

/// 明文密码（仅用于校验和哈希）
pub struct Password(String);

impl Password {
    pub const MIN_LEN: usize = 6;
    pub const MAX_LEN: usize = 64;

    pub fn new(raw: impl Into<String>) -> Result<Self, PasswordError> {
        let raw = raw.into();
        let len = raw.chars().count();
        if len < Self::MIN_LEN {
            return Err(PasswordError::TooShort(Self::MIN_LEN));
        }
        if len > Self::MAX_LEN {
            return Err(PasswordError::TooLong(Self::MAX_LEN));
        }
        Ok(Self(raw))
    }

    pub fn hash(&self) -> Result<HashedPassword, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(self.0.as_bytes(), &salt)
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))?
            .to_string();
        Ok(HashedPassword(hash))
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password([REDACTED])")
    }
}

/// 哈希后的密码（argon2 PHC 字符串）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashedPassword(String);

impl HashedPassword {
    pub fn from_plain(plain: &str) -> Result<Self, PasswordError> {
        Password::new(plain)?.hash()
    }

    pub fn from_hash(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    pub fn verify(&self, plain: &str) -> Result<bool, PasswordError> {
        let parsed =
            PasswordHash::new(&self.0).map_err(|e| PasswordError::InvalidHash(e.to_string()))?;
        Ok(Argon2::default()
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

/// 用户
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub user_name: String,
    pub password_hash: HashedPassword,
    pub email: String,
    pub role_ids: Vec<RoleId>,
    /// 个人资料（JSON）
    pub info: serde_json::Value,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
}

/// 待注册用户
#[derive(Debug, Clone)]
pub struct NewUser {
    pub user_name: Username,
    pub email: Email,
    pub password_hash: HashedPassword,
}

/// 用户名已被占用（含已软删除的用户）
pub fn user_name_taken(user_name: &str) -> AppError {
    AppError::conflict(format!("User name '{}' is already taken", user_name))
}

/// 邮箱已被注册
pub fn email_taken(email: &str) -> AppError {
    AppError::conflict(format!("Email '{}' is already registered", email))
}
