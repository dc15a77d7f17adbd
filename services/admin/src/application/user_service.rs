//! 用户查询与管理

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use console_common::{PagedResult, Pagination, RoleId, UserId};
use console_errors::{AppError, AppResult};
use serde::Serialize;
use tracing::info;

use super::commands::UpdateUserCommand;
use crate::domain::{Email, RoleRepository, User, UserRepository, email_taken};

/// 当前用户信息
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: UserId,
    pub user_name: String,
    pub role_ids: Vec<RoleId>,
    pub info: serde_json::Value,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            user_name: user.user_name.clone(),
            role_ids: user.role_ids.clone(),
            info: user.info.clone(),
        }
    }
}

/// 用户列表项
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: UserId,
    pub user_name: String,
    pub email: String,
    pub role_ids: Vec<RoleId>,
    pub info: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            user_name: user.user_name,
            email: user.email,
            role_ids: user.role_ids,
            info: user.info,
            created_at: user.created_at,
        }
    }
}

pub struct UserService {
    users: Arc<dyn UserRepository>,
    roles: Arc<dyn RoleRepository>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>, roles: Arc<dyn RoleRepository>) -> Self {
        Self { users, roles }
    }

    async fn find_active(&self, id: UserId) -> AppResult<User> {
        self.users
            .find_by_id(id)
            .await?
            .filter(|user| !user.deleted)
            .ok_or_else(|| AppError::not_found(format!("User {} not found", id)))
    }

    pub async fn get_user_info(&self, id: UserId) -> AppResult<UserInfo> {
        let user = self.find_active(id).await?;
        Ok(UserInfo::from(&user))
    }

    pub async fn list(&self, pagination: Pagination) -> AppResult<PagedResult<UserView>> {
        let pagination = pagination.normalized();
        let (users, total) = self.users.list_page(&pagination).await?;
        Ok(PagedResult::new(users, total, &pagination).map(UserView::from))
    }

    pub async fn update(&self, cmd: UpdateUserCommand) -> AppResult<UserView> {
        let mut user = self.find_active(cmd.id).await?;

        if let Some(raw) = cmd.email {
            let email = Email::new(&raw).map_err(AppError::validation)?;
            if email.as_str() != user.email && self.users.exists_email(email.as_str()).await? {
                return Err(email_taken(email.as_str()));
            }
            user.email = email.into_inner();
        }

        if let Some(role_ids) = cmd.role_ids {
            let known: HashSet<RoleId> = self
                .roles
                .list_all()
                .await?
                .into_iter()
                .map(|role| role.id)
                .collect();
            if let Some(missing) = role_ids.iter().find(|id| !known.contains(*id)) {
                return Err(AppError::validation(format!("Role {} does not exist", missing)));
            }
            let mut seen = HashSet::new();
            user.role_ids = role_ids.into_iter().filter(|id| seen.insert(*id)).collect();
        }

        if let Some(info) = cmd.info {
            if !info.is_object() {
                return Err(AppError::validation("info must be a JSON object"));
            }
            user.info = info;
        }

        self.users.update(&user).await?;
        info!(user_id = %user.id, "User updated");
        Ok(UserView::from(user))
    }

    /// 软删除
    pub async fn delete(&self, id: UserId) -> AppResult<()> {
        if !self.users.soft_delete(id).await? {
            return Err(AppError::not_found(format!("User {} not found", id)));
        }
        info!(user_id = %id, "User soft-deleted");
        Ok(())
    }
}
