//! 已签发令牌的登记表
//!
//! 令牌在登录时写入，登出时删除；认证中间件要求令牌仍在表中

use console_common::UserId;
use console_errors::{AppError, AppResult};
use console_ports::CachePort;
use std::sync::Arc;
use std::time::Duration;

pub struct TokenStore {
    cache: Arc<dyn CachePort>,
    ttl: Duration,
}

impl TokenStore {
    pub fn new(cache: Arc<dyn CachePort>, ttl: Duration) -> Self {
        Self { cache, ttl }
    }

    pub fn token_key(token: &str) -> String {
        format!("admin:token:{}", token)
    }

    pub async fn store(&self, token: &str, uid: UserId) -> AppResult<()> {
        self.cache
            .set(&Self::token_key(token), &uid.to_string(), Some(self.ttl))
            .await
    }

    /// 查找令牌所属用户
    pub async fn lookup(&self, token: &str) -> AppResult<Option<UserId>> {
        match self.cache.get(&Self::token_key(token)).await? {
            Some(raw) => raw
                .parse::<i64>()
                .map(|uid| Some(UserId(uid)))
                .map_err(|e| AppError::internal(format!("Corrupt token entry in cache: {}", e))),
            None => Ok(None),
        }
    }

    pub async fn revoke(&self, token: &str) -> AppResult<()> {
        self.cache.delete(&Self::token_key(token)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::cache::test_support::MemoryCache;

    #[tokio::test]
    async fn test_store_lookup_revoke() {
        let cache = Arc::new(MemoryCache::default());
        let store = TokenStore::new(cache.clone(), Duration::from_secs(7200));

        store.store("tok", UserId(9)).await.unwrap();
        assert_eq!(
            cache.ttls.lock().get("admin:token:tok").copied(),
            Some(Some(Duration::from_secs(7200)))
        );
        assert_eq!(store.lookup("tok").await.unwrap(), Some(UserId(9)));

        store.revoke("tok").await.unwrap();
        assert_eq!(store.lookup("tok").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_corrupt_entry() {
        let cache = Arc::new(MemoryCache::default());
        cache
            .data
            .lock()
            .insert(TokenStore::token_key("tok"), "abc".into());
        let store = TokenStore::new(cache, Duration::from_secs(60));
        assert!(store.lookup("tok").await.is_err());
    }
}
