//! 服务启动器
//!
//! 统一的 HTTP 服务启动流程

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderName, HeaderValue, Method, StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router, middleware};
use console_config::{AppConfig, ServerConfig};
use console_errors::AppResult;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::infrastructure::Infrastructure;
use crate::metrics::track_http_metrics;
use crate::runtime::{init_runtime, shutdown_signal};

/// 运行 HTTP 服务
///
/// 1. 加载配置（`.env` → 配置文件 → 环境变量）
/// 2. 初始化日志和 metrics
/// 3. 创建基础设施资源（数据库、Redis、TokenService）
/// 4. 调用 `app_builder` 构建业务路由
/// 5. 挂载 `/health`、`/metrics` 和通用中间件后启动，支持 graceful shutdown
///
/// ```ignore
/// console_bootstrap::run("config", |infra| async move {
///     Ok(admin_service::build_app(infra).await?)
/// })
/// .await
/// ```
pub async fn run<F, Fut>(config_dir: &str, app_builder: F) -> Result<(), Box<dyn std::error::Error>>
where
    F: FnOnce(Arc<Infrastructure>) -> Fut,
    Fut: Future<Output = AppResult<Router>>,
{
    dotenvy::dotenv().ok();

    // 1. 加载配置
    let config = AppConfig::load(config_dir)?;

    // 2. 初始化运行时
    init_runtime(&config);
    info!("Starting {} service", config.app_name);

    let metrics_handle = if config.telemetry.metrics_enabled {
        Some(console_telemetry::init_metrics()?)
    } else {
        None
    };

    // 3. 创建基础设施（带重试）
    let infra = Arc::new(Infrastructure::from_config(config.clone(), metrics_handle).await?);

    // 4. 构建业务路由
    let app = app_builder(infra.clone()).await?;
    let app = with_common_layers(app.merge(operational_routes(infra)), &config.server);

    // 5. 启动服务器
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "HTTP server starting");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Service stopped");
    Ok(())
}

/// `/health` 与 `/metrics`
pub fn operational_routes(infra: Arc<Infrastructure>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(infra)
}

async fn health_handler(State(infra): State<Arc<Infrastructure>>) -> impl IntoResponse {
    let status = infra.health().await;
    let code = if status.healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(status))
}

async fn metrics_handler(State(infra): State<Arc<Infrastructure>>) -> impl IntoResponse {
    match infra.metrics_handle() {
        Some(handle) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// 通用中间件：追踪、metrics、超时、请求体大小限制、CORS
pub fn with_common_layers(app: Router, server: &ServerConfig) -> Router {
    app.layer(middleware::from_fn(track_http_metrics))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(
            server.request_timeout_secs,
        )))
        .layer(RequestBodyLimitLayer::new(server.body_limit_bytes))
        .layer(cors_layer(&server.cors_allowed_origins))
}

/// 构建 CORS 层
///
/// 未配置来源时放开全部来源（不携带凭据）
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    if allowed_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static("x-session-id"),
        ])
        .expose_headers([HeaderName::from_static("x-session-id")])
        .allow_credentials(true)
}
