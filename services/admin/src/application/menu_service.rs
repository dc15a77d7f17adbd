//! 菜单管理与当前用户菜单树

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use console_auth_core::AuthContext;
use console_common::{MenuId, PagedResult, Pagination};
use console_errors::{AppError, AppResult};
use tracing::{debug, info, warn};

use crate::domain::hierarchy::would_create_cycle;
use crate::domain::permission::{build_full_menu_tree, build_menu_tree, resolve_user_menu_ids};
use crate::domain::{Menu, MenuDraft, MenuNode, MenuRepository, RoleRepository};

pub struct MenuService {
    menus: Arc<dyn MenuRepository>,
    roles: Arc<dyn RoleRepository>,
}

impl MenuService {
    pub fn new(menus: Arc<dyn MenuRepository>, roles: Arc<dyn RoleRepository>) -> Self {
        Self { menus, roles }
    }

    /// 当前用户可见的菜单树
    pub async fn current(&self, ctx: &AuthContext) -> AppResult<Vec<MenuNode>> {
        let roles = self.roles.list_all().await?;
        let menu_ids = resolve_user_menu_ids(&roles, &ctx.scope)?;
        let menus = self.menus.find_by_ids(&menu_ids).await?;

        let found: HashSet<MenuId> = menus.iter().map(|m| m.id).collect();
        if let Some(missing) = menu_ids.iter().find(|id| !found.contains(*id)) {
            warn!(user_id = %ctx.uid, menu_id = %missing, "Role references a missing menu");
            return Err(AppError::validation(format!(
                "Role references missing menu {}",
                missing
            )));
        }

        let tree = build_menu_tree(&menus, &menu_ids);
        metrics::counter!("admin_menu_resolve_total").increment(1);
        debug!(user_id = %ctx.uid, menus = menu_ids.len(), roots = tree.len(), "Menu tree resolved");
        Ok(tree)
    }

    pub async fn list(&self, pagination: Pagination) -> AppResult<PagedResult<Menu>> {
        let pagination = pagination.normalized();
        let (menus, total) = self.menus.list_page(&pagination).await?;
        Ok(PagedResult::new(menus, total, &pagination))
    }

    /// 完整菜单树
    pub async fn tree(&self) -> AppResult<Vec<MenuNode>> {
        let menus = self.menus.list_all().await?;
        Ok(build_full_menu_tree(&menus))
    }

    pub async fn create(&self, draft: MenuDraft) -> AppResult<Menu> {
        self.check_parent(None, draft.parent_id).await?;
        let menu = self.menus.create(&draft).await?;
        info!(menu_id = %menu.id, name = %menu.name, "Menu created");
        Ok(menu)
    }

    pub async fn update(&self, id: MenuId, draft: MenuDraft) -> AppResult<Menu> {
        let mut menu = self
            .menus
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Menu {} not found", id)))?;

        self.check_parent(Some(id), draft.parent_id).await?;
        menu.apply(draft);
        self.menus.update(&menu).await?;
        info!(menu_id = %menu.id, "Menu updated");
        Ok(menu)
    }

    pub async fn delete(&self, id: MenuId) -> AppResult<()> {
        if self.menus.find_by_id(id).await?.is_none() {
            return Err(AppError::not_found(format!("Menu {} not found", id)));
        }
        if self.menus.has_children(id).await? {
            return Err(AppError::conflict(format!("Menu {} still has sub-menus", id)));
        }
        let roles = self.roles.list_all().await?;
        if let Some(role) = roles.iter().find(|role| role.menu_ids.contains(&id)) {
            return Err(AppError::conflict(format!(
                "Menu {} is still assigned to role {}",
                id, role.id
            )));
        }

        self.menus.delete(id).await?;
        info!(menu_id = %id, "Menu deleted");
        Ok(())
    }

    async fn check_parent(&self, id: Option<MenuId>, parent_id: MenuId) -> AppResult<()> {
        if parent_id.is_root() {
            return Ok(());
        }

        let parents: HashMap<MenuId, MenuId> = self
            .menus
            .list_all()
            .await?
            .into_iter()
            .map(|menu| (menu.id, menu.parent_id))
            .collect();

        if !parents.contains_key(&parent_id) {
            return Err(AppError::validation(format!(
                "Parent menu {} does not exist",
                parent_id
            )));
        }
        if let Some(id) = id
            && would_create_cycle(&parents, id, parent_id)
        {
            return Err(AppError::validation(format!(
                "Setting parent {} on menu {} would create a cycle",
                parent_id, id
            )));
        }
        Ok(())
    }
}
