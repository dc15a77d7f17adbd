//! 客户端会话中的短期值（图形验证码、邮箱验证码）

use console_errors::{AppError, AppResult};
use console_ports::CachePort;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// 绑定邮箱的验证码
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailCode {
    pub email: String,
    pub code: String,
}

pub struct SessionStore {
    cache: Arc<dyn CachePort>,
    captcha_ttl: Duration,
    email_code_ttl: Duration,
}

impl SessionStore {
    pub fn new(cache: Arc<dyn CachePort>, captcha_ttl: Duration, email_code_ttl: Duration) -> Self {
        Self {
            cache,
            captcha_ttl,
            email_code_ttl,
        }
    }

    pub fn login_code_key(sid: &str) -> String {
        format!("admin:session:{}:login_code", sid)
    }

    pub fn email_code_key(sid: &str) -> String {
        format!("admin:session:{}:email_code", sid)
    }

    /// 保存图形验证码文本，覆盖旧值
    pub async fn put_login_code(&self, sid: &str, text: &str) -> AppResult<()> {
        self.cache
            .set(&Self::login_code_key(sid), text, Some(self.captcha_ttl))
            .await
    }

    /// 取出图形验证码（一次性）
    pub async fn take_login_code(&self, sid: &str) -> AppResult<Option<String>> {
        self.cache.get_del(&Self::login_code_key(sid)).await
    }

    pub async fn put_email_code(&self, sid: &str, code: &EmailCode) -> AppResult<()> {
        let json = serde_json::to_string(code).map_err(|e| {
            AppError::internal(format!("Failed to serialize email code for cache: {}", e))
        })?;
        self.cache
            .set(&Self::email_code_key(sid), &json, Some(self.email_code_ttl))
            .await
    }

    pub async fn peek_email_code(&self, sid: &str) -> AppResult<Option<EmailCode>> {
        match self.cache.get(&Self::email_code_key(sid)).await? {
            Some(json) => {
                let code = serde_json::from_str(&json).map_err(|e| {
                    AppError::internal(format!(
                        "Failed to deserialize email code from cache: {}",
                        e
                    ))
                })?;
                Ok(Some(code))
            }
            None => Ok(None),
        }
    }

    pub async fn clear_email_code(&self, sid: &str) -> AppResult<()> {
        self.cache.delete(&Self::email_code_key(sid)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::cache::test_support::MemoryCache;

    fn store(cache: Arc<MemoryCache>) -> SessionStore {
        SessionStore::new(cache, Duration::from_secs(300), Duration::from_secs(600))
    }

    #[tokio::test]
    async fn test_login_code_is_one_shot() {
        let cache = Arc::new(MemoryCache::default());
        let store = store(cache.clone());

        store.put_login_code("abc", "X7kP").await.unwrap();
        assert_eq!(
            cache.ttls.lock().get("admin:session:abc:login_code").copied(),
            Some(Some(Duration::from_secs(300)))
        );

        assert_eq!(store.take_login_code("abc").await.unwrap().as_deref(), Some("X7kP"));
        assert_eq!(store.take_login_code("abc").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_email_code_peek_and_clear() {
        let cache = Arc::new(MemoryCache::default());
        let store = store(cache.clone());
        let code = EmailCode {
            email: "a@b.com".into(),
            code: "012345".into(),
        };

        store.put_email_code("s1", &code).await.unwrap();
        assert_eq!(store.peek_email_code("s1").await.unwrap(), Some(code.clone()));
        assert_eq!(store.peek_email_code("s1").await.unwrap(), Some(code));
        assert_eq!(store.peek_email_code("s2").await.unwrap(), None);

        store.clear_email_code("s1").await.unwrap();
        assert_eq!(store.peek_email_code("s1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_corrupt_email_code_is_internal_error() {
        let cache = Arc::new(MemoryCache::default());
        cache
            .data
            .lock()
            .insert(SessionStore::email_code_key("s1"), "not json".into());

        let err = store(cache).peek_email_code("s1").await.unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }
}
