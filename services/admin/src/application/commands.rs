//! 命令定义

use console_common::{RoleId, UserId};

/// 发送注册邮箱验证码
#[derive(Debug, Clone)]
pub struct SendEmailCodeCommand {
    pub user_name: String,
    pub email: String,
}

/// 用户注册
#[derive(Debug, Clone)]
pub struct RegisterCommand {
    pub user_name: String,
    pub password: String,
    pub email: String,
    pub code: String,
}

/// 用户登录
#[derive(Debug, Clone)]
pub struct LoginCommand {
    pub user_name: String,
    pub password: String,
    /// 图形验证码
    pub code: String,
}

/// 更新用户，`None` 字段保持不变
#[derive(Debug, Clone)]
pub struct UpdateUserCommand {
    pub id: UserId,
    pub email: Option<String>,
    pub role_ids: Option<Vec<RoleId>>,
    pub info: Option<serde_json::Value>,
}
