//! Cache trait 定义

use async_trait::async_trait;
use console_errors::AppResult;
use std::time::Duration;

/// 缓存 trait
#[async_trait]
pub trait CachePort: Send + Sync {
    /// 获取缓存值
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// 设置缓存值
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> AppResult<()>;

    /// 删除缓存
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// 检查是否存在
    async fn exists(&self, key: &str) -> AppResult<bool>;

    /// 读取并删除（一次性取值）
    async fn get_del(&self, key: &str) -> AppResult<Option<String>>;
}
