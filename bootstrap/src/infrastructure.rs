//! 基础设施资源管理
//!
//! 统一创建 PostgreSQL / Redis / TokenService 等共享资源

use std::sync::Arc;

use console_adapter_postgres::{PostgresConfig, check_connection, create_pool};
use console_adapter_redis::{RedisCache, create_connection_manager};
use console_auth_core::TokenService;
use console_config::AppConfig;
use console_errors::AppResult;
use console_telemetry::HealthStatus;
use metrics_exporter_prometheus::PrometheusHandle;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use tracing::info;

use crate::retry::{Backoff, connect_with_backoff};

/// 基础设施资源容器
pub struct Infrastructure {
    config: AppConfig,
    postgres_pool: PgPool,
    redis_cache: RedisCache,
    token_service: Arc<TokenService>,
    metrics_handle: Option<PrometheusHandle>,
}

impl Infrastructure {
    /// 从配置创建基础设施资源（带重试）
    pub async fn from_config(
        config: AppConfig,
        metrics_handle: Option<PrometheusHandle>,
    ) -> AppResult<Self> {
        let backoff = Backoff::from(&config.startup);

        // 1. PostgreSQL 连接池
        let pg_config = PostgresConfig::new(config.database.url.expose_secret())
            .with_max_connections(config.database.max_connections);
        let postgres_pool = connect_with_backoff(backoff, "postgres", || {
            let cfg = pg_config.clone();
            async move { create_pool(&cfg).await }
        })
        .await?;
        info!(
            "PostgreSQL connection pool created (max_connections: {})",
            config.database.max_connections
        );

        // 2. Redis 连接
        let redis_url = config.redis.url.clone();
        let redis_conn = connect_with_backoff(backoff, "redis", || {
            let url = redis_url.expose_secret().clone();
            async move { create_connection_manager(&url).await }
        })
        .await?;
        info!("Redis connection created");

        // 3. TokenService
        let token_service = Arc::new(TokenService::new(
            config.jwt.secret.expose_secret(),
            config.jwt.expires_in as i64,
            config.jwt.issuer.clone(),
        ));

        Ok(Self {
            config,
            postgres_pool,
            redis_cache: RedisCache::new(redis_conn),
            token_service,
            metrics_handle,
        })
    }

    /// 获取应用配置
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// 获取 PostgreSQL 连接池
    pub fn postgres_pool(&self) -> PgPool {
        self.postgres_pool.clone()
    }

    /// 获取 Redis 缓存（实现 CachePort trait）
    pub fn redis_cache(&self) -> RedisCache {
        self.redis_cache.clone()
    }

    /// 获取 Token 服务
    pub fn token_service(&self) -> Arc<TokenService> {
        self.token_service.clone()
    }

    /// Prometheus handle（未启用 metrics 时为 None）
    pub fn metrics_handle(&self) -> Option<&PrometheusHandle> {
        self.metrics_handle.as_ref()
    }

    /// 检查所有依赖的连通性
    pub async fn health(&self) -> HealthStatus {
        let mut status = HealthStatus::new();

        match check_connection(&self.postgres_pool).await {
            Ok(()) => status.add_check("postgres", true, None),
            Err(e) => status.add_check("postgres", false, Some(e.to_string())),
        }

        match self.redis_cache.ping().await {
            Ok(()) => status.add_check("redis", true, None),
            Err(e) => status.add_check("redis", false, Some(e.to_string())),
        }

        status
    }
}
