//! 应用层服务

pub mod auth_service;
pub mod commands;
pub mod menu_service;
pub mod role_service;
pub mod user_service;

pub use auth_service::{AuthService, LoginResult};
pub use commands::*;
pub use menu_service::MenuService;
pub use role_service::RoleService;
pub use user_service::{UserInfo, UserService, UserView};
