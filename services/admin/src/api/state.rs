//! 路由共享状态

use std::sync::Arc;
use std::time::Duration;

use console_adapter_email::EmailSender;
use console_auth_core::TokenService;
use console_config::{CaptchaConfig, VerificationConfig};
use console_errors::AppResult;
use console_ports::CachePort;

use crate::application::{AuthService, MenuService, RoleService, UserService};
use crate::domain::{MenuRepository, RoleRepository, UserRepository};
use crate::infrastructure::captcha::CaptchaGenerator;

/// 构建应用状态所需的外部依赖
pub struct AppDependencies {
    pub users: Arc<dyn UserRepository>,
    pub roles: Arc<dyn RoleRepository>,
    pub menus: Arc<dyn MenuRepository>,
    pub cache: Arc<dyn CachePort>,
    pub token_service: Arc<TokenService>,
    pub email_sender: Arc<dyn EmailSender>,
    pub captcha: CaptchaConfig,
    pub verification: VerificationConfig,
}

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub users: Arc<UserService>,
    pub roles: Arc<RoleService>,
    pub menus: Arc<MenuService>,
}

impl AppState {
    pub fn new(deps: AppDependencies) -> AppResult<Self> {
        let captcha_ttl = Duration::from_secs(deps.captcha.ttl_secs);
        let captcha = CaptchaGenerator::new(deps.captcha)?;

        let auth = AuthService::new(
            deps.users.clone(),
            deps.cache,
            deps.token_service,
            deps.email_sender,
            captcha,
            captcha_ttl,
            deps.verification,
        );

        Ok(Self {
            auth: Arc::new(auth),
            users: Arc::new(UserService::new(deps.users, deps.roles.clone())),
            roles: Arc::new(RoleService::new(deps.roles.clone(), deps.menus.clone())),
            menus: Arc::new(MenuService::new(deps.menus, deps.roles)),
        })
    }
}
