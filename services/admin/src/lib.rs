//! admin-service - 后台管理服务
//!
//! 用户注册登录、令牌认证、角色/菜单/用户管理以及按角色继承链解析的导航菜单

pub mod api;
pub mod application;
pub mod domain;
pub mod infrastructure;

use std::collections::HashMap;
use std::sync::Arc;

use axum::Router;
use console_adapter_email::{EmailClient, EmailSender, EmailTemplate};
use console_bootstrap::Infrastructure;
use console_errors::AppResult;
use console_ports::CachePort;
use tracing::info;

use crate::api::{AppDependencies, AppState};
use crate::application::auth_service::VERIFICATION_TEMPLATE;
use crate::infrastructure::persistence::{
    PostgresMenuRepository, PostgresRoleRepository, PostgresUserRepository, run_migrations,
};

const VERIFICATION_TEMPLATE_SOURCE: &str = include_str!("../templates/verification_code.html");

/// 根据基础设施组装路由
pub async fn build_app(infra: Arc<Infrastructure>) -> AppResult<Router> {
    let config = infra.config();
    let pool = infra.postgres_pool();

    if config.database.run_migrations {
        run_migrations(&pool).await?;
    }

    let template = EmailTemplate::from_strings(HashMap::from([(
        VERIFICATION_TEMPLATE.to_string(),
        VERIFICATION_TEMPLATE_SOURCE.to_string(),
    )]))?;
    let email_sender: Arc<dyn EmailSender> =
        Arc::new(EmailClient::new(config.email.clone()).with_template(template));
    let cache: Arc<dyn CachePort> = Arc::new(infra.redis_cache());

    let state = AppState::new(AppDependencies {
        users: Arc::new(PostgresUserRepository::new(pool.clone())),
        roles: Arc::new(PostgresRoleRepository::new(pool.clone())),
        menus: Arc::new(PostgresMenuRepository::new(pool)),
        cache,
        token_service: infra.token_service(),
        email_sender,
        captcha: config.captcha.clone(),
        verification: config.verification.clone(),
    })?;

    info!(app = %config.app_name, "Admin routes ready");
    Ok(api::router(state))
}
