//! 角色管理

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use console_common::{MenuId, PagedResult, Pagination, RoleId};
use console_errors::{AppError, AppResult};
use tracing::info;

use crate::domain::hierarchy::would_create_cycle;
use crate::domain::permission::build_role_tree;
use crate::domain::{MenuRepository, Role, RoleDraft, RoleNode, RoleRepository};

pub struct RoleService {
    roles: Arc<dyn RoleRepository>,
    menus: Arc<dyn MenuRepository>,
}

impl RoleService {
    pub fn new(roles: Arc<dyn RoleRepository>, menus: Arc<dyn MenuRepository>) -> Self {
        Self { roles, menus }
    }

    pub async fn list(&self, pagination: Pagination) -> AppResult<PagedResult<Role>> {
        let pagination = pagination.normalized();
        let (roles, total) = self.roles.list_page(&pagination).await?;
        Ok(PagedResult::new(roles, total, &pagination))
    }

    pub async fn tree(&self) -> AppResult<Vec<RoleNode>> {
        let roles = self.roles.list_all().await?;
        Ok(build_role_tree(&roles))
    }

    pub async fn create(&self, draft: RoleDraft) -> AppResult<Role> {
        self.check_parent(None, draft.parent_id).await?;
        let draft = RoleDraft {
            menu_ids: self.check_menus(draft.menu_ids).await?,
            ..draft
        };

        let role = self.roles.create(&draft).await?;
        info!(role_id = %role.id, name = %role.name, "Role created");
        Ok(role)
    }

    pub async fn update(&self, id: RoleId, draft: RoleDraft) -> AppResult<Role> {
        let mut role = self
            .roles
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Role {} not found", id)))?;

        self.check_parent(Some(id), draft.parent_id).await?;
        let draft = RoleDraft {
            menu_ids: self.check_menus(draft.menu_ids).await?,
            ..draft
        };

        role.apply(draft);
        self.roles.update(&role).await?;
        info!(role_id = %role.id, "Role updated");
        Ok(role)
    }

    pub async fn delete(&self, id: RoleId) -> AppResult<()> {
        if self.roles.find_by_id(id).await?.is_none() {
            return Err(AppError::not_found(format!("Role {} not found", id)));
        }
        if self.roles.has_children(id).await? {
            return Err(AppError::conflict(format!(
                "Role {} still has child roles",
                id
            )));
        }

        self.roles.delete(id).await?;
        info!(role_id = %id, "Role deleted");
        Ok(())
    }

    /// 父角色必须为根哨兵或已存在，且不能形成环
    async fn check_parent(&self, id: Option<RoleId>, parent_id: RoleId) -> AppResult<()> {
        if parent_id.is_root() {
            return Ok(());
        }

        let parents: HashMap<RoleId, RoleId> = self
            .roles
            .list_all()
            .await?
            .into_iter()
            .map(|role| (role.id, role.parent_id))
            .collect();

        if !parents.contains_key(&parent_id) {
            return Err(AppError::validation(format!(
                "Parent role {} does not exist",
                parent_id
            )));
        }
        if let Some(id) = id
            && would_create_cycle(&parents, id, parent_id)
        {
            return Err(AppError::validation(format!(
                "Setting parent {} on role {} would create a cycle",
                parent_id, id
            )));
        }
        Ok(())
    }

    /// 菜单必须全部存在，返回去重后的列表
    async fn check_menus(&self, menu_ids: Vec<MenuId>) -> AppResult<Vec<MenuId>> {
        let mut seen = HashSet::new();
        let menu_ids: Vec<MenuId> = menu_ids.into_iter().filter(|id| seen.insert(*id)).collect();
        if menu_ids.is_empty() {
            return Ok(menu_ids);
        }

        let found: HashSet<MenuId> = self
            .menus
            .find_by_ids(&menu_ids)
            .await?
            .into_iter()
            .map(|menu| menu.id)
            .collect();
        if let Some(missing) = menu_ids.iter().find(|id| !found.contains(*id)) {
            return Err(AppError::validation(format!("Menu {} does not exist", missing)));
        }
        Ok(menu_ids)
    }
}
