//! 请求体定义

use console_common::{MenuId, RoleId, UserId};
use serde::Deserialize;
use validator::Validate;

use crate::application::{LoginCommand, RegisterCommand, SendEmailCodeCommand, UpdateUserCommand};
use crate::domain::{MenuDraft, RoleDraft};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SendCodeEmailRequest {
    #[validate(length(min = 1, max = 64, message = "userName is required"))]
    pub user_name: String,
    #[validate(email(message = "email is not a valid address"))]
    pub email: String,
}

impl From<SendCodeEmailRequest> for SendEmailCodeCommand {
    fn from(req: SendCodeEmailRequest) -> Self {
        Self {
            user_name: req.user_name,
            email: req.email,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 64, message = "userName is required"))]
    pub user_name: String,
    #[validate(length(min = 1, max = 128, message = "password is required"))]
    pub password: String,
    #[validate(email(message = "email is not a valid address"))]
    pub email: String,
    #[validate(length(min = 1, max = 32, message = "code is required"))]
    pub code: String,
}

impl From<RegisterRequest> for RegisterCommand {
    fn from(req: RegisterRequest) -> Self {
        Self {
            user_name: req.user_name,
            password: req.password,
            email: req.email,
            code: req.code,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 64, message = "userName is required"))]
    pub user_name: String,
    #[validate(length(min = 1, max = 128, message = "password is required"))]
    pub password: String,
    #[validate(length(min = 1, max = 16, message = "code is required"))]
    pub code: String,
}

impl From<LoginRequest> for LoginCommand {
    fn from(req: LoginRequest) -> Self {
        Self {
            user_name: req.user_name,
            password: req.password,
            code: req.code,
        }
    }
}

/// 仅含 id 的请求体（删除等操作）
#[derive(Debug, Deserialize, Validate)]
pub struct IdRequest {
    #[validate(range(min = 1, message = "id must be positive"))]
    pub id: i64,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RoleRequest {
    #[serde(default)]
    #[validate(range(min = 0, message = "parentId must not be negative"))]
    pub parent_id: i64,
    #[validate(length(min = 1, max = 64, message = "name must be 1 to 64 characters"))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 255, message = "description is too long"))]
    pub description: String,
    #[serde(default)]
    pub menu_ids: Vec<MenuId>,
}

impl From<RoleRequest> for RoleDraft {
    fn from(req: RoleRequest) -> Self {
        Self {
            parent_id: RoleId(req.parent_id),
            name: req.name.trim().to_string(),
            description: req.description,
            menu_ids: req.menu_ids,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateRoleRequest {
    #[validate(range(min = 1, message = "id must be positive"))]
    pub id: i64,
    #[serde(flatten)]
    #[validate(nested)]
    pub role: RoleRequest,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MenuRequest {
    #[serde(default)]
    #[validate(range(min = 0, message = "parentId must not be negative"))]
    pub parent_id: i64,
    #[validate(length(min = 1, max = 64, message = "name must be 1 to 64 characters"))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 64))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 64))]
    pub icon: String,
    #[serde(default = "default_true")]
    pub show: bool,
    #[serde(default)]
    #[validate(length(max = 255))]
    pub component: String,
    #[serde(default)]
    #[validate(length(max = 255))]
    pub redirect: String,
    #[serde(default)]
    #[validate(length(max = 255))]
    pub path: String,
    #[serde(default)]
    pub hide_children: bool,
    #[serde(default)]
    pub serial_num: i32,
    #[serde(default)]
    #[validate(length(max = 128))]
    pub permission: String,
    #[serde(default, rename = "type")]
    #[validate(length(max = 32))]
    pub menu_type: String,
}

impl From<MenuRequest> for MenuDraft {
    fn from(req: MenuRequest) -> Self {
        let name = req.name.trim().to_string();
        let title = if req.title.trim().is_empty() {
            name.clone()
        } else {
            req.title
        };
        Self {
            parent_id: MenuId(req.parent_id),
            name,
            title,
            icon: req.icon,
            show: req.show,
            component: req.component,
            redirect: req.redirect,
            path: req.path,
            hide_children: req.hide_children,
            serial_num: req.serial_num,
            permission: req.permission,
            menu_type: req.menu_type,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateMenuRequest {
    #[validate(range(min = 1, message = "id must be positive"))]
    pub id: i64,
    #[serde(flatten)]
    #[validate(nested)]
    pub menu: MenuRequest,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[validate(range(min = 1, message = "id must be positive"))]
    pub id: i64,
    #[validate(email(message = "email is not a valid address"))]
    pub email: Option<String>,
    pub role_ids: Option<Vec<RoleId>>,
    pub info: Option<serde_json::Value>,
}

impl From<UpdateUserRequest> for UpdateUserCommand {
    fn from(req: UpdateUserRequest) -> Self {
        Self {
            id: UserId(req.id),
            email: req.email,
            role_ids: req.role_ids,
            info: req.info,
        }
    }
}
