//! PostgreSQL 菜单仓储实现

use async_trait::async_trait;
use console_adapter_postgres::map_sqlx_error;
use console_common::{MenuId, Pagination};
use console_errors::{AppError, AppResult};
use sqlx::PgPool;

use crate::domain::{Menu, MenuDraft, MenuRepository};

/// show / hide_children 以 SMALLINT 存储
#[derive(Debug, sqlx::FromRow)]
struct MenuRow {
    id: i64,
    parent_id: i64,
    name: String,
    title: String,
    icon: String,
    show: i16,
    component: String,
    redirect: String,
    path: String,
    hide_children: i16,
    serial_num: i32,
    permission: String,
    menu_type: String,
}

impl From<MenuRow> for Menu {
    fn from(row: MenuRow) -> Self {
        Self {
            id: MenuId(row.id),
            parent_id: MenuId(row.parent_id),
            name: row.name,
            title: row.title,
            icon: row.icon,
            show: row.show != 0,
            component: row.component,
            redirect: row.redirect,
            path: row.path,
            hide_children: row.hide_children != 0,
            serial_num: row.serial_num,
            permission: row.permission,
            menu_type: row.menu_type,
        }
    }
}

fn flag(value: bool) -> i16 {
    i16::from(value)
}

const SELECT_MENU: &str = r#"
SELECT id, parent_id, name, title, icon, show, component, redirect, path,
       hide_children, serial_num, permission, menu_type
FROM menus
"#;

pub struct PostgresMenuRepository {
    pool: PgPool,
}

impl PostgresMenuRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MenuRepository for PostgresMenuRepository {
    async fn list_all(&self) -> AppResult<Vec<Menu>> {
        let rows = sqlx::query_as::<_, MenuRow>(&format!("{} ORDER BY id", SELECT_MENU))
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(Menu::from).collect())
    }

    async fn list_page(&self, pagination: &Pagination) -> AppResult<(Vec<Menu>, u64)> {
        let rows = sqlx::query_as::<_, MenuRow>(&format!(
            "{} ORDER BY id LIMIT $1 OFFSET $2",
            SELECT_MENU
        ))
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM menus")
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok((
            rows.into_iter().map(Menu::from).collect(),
            total.0.max(0) as u64,
        ))
    }

    async fn find_by_ids(&self, ids: &[MenuId]) -> AppResult<Vec<Menu>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let raw: Vec<i64> = ids.iter().map(|id| id.0).collect();

        let rows = sqlx::query_as::<_, MenuRow>(&format!(
            "{} WHERE id = ANY($1) ORDER BY id",
            SELECT_MENU
        ))
        .bind(&raw)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(Menu::from).collect())
    }

    async fn find_by_id(&self, id: MenuId) -> AppResult<Option<Menu>> {
        let row = sqlx::query_as::<_, MenuRow>(&format!("{} WHERE id = $1", SELECT_MENU))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(Menu::from))
    }

    async fn create(&self, draft: &MenuDraft) -> AppResult<Menu> {
        let row = sqlx::query_as::<_, MenuRow>(
            r#"
            INSERT INTO menus (parent_id, name, title, icon, show, component, redirect, path,
                               hide_children, serial_num, permission, menu_type)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING id, parent_id, name, title, icon, show, component, redirect, path,
                      hide_children, serial_num, permission, menu_type
            "#,
        )
        .bind(draft.parent_id.0)
        .bind(&draft.name)
        .bind(&draft.title)
        .bind(&draft.icon)
        .bind(flag(draft.show))
        .bind(&draft.component)
        .bind(&draft.redirect)
        .bind(&draft.path)
        .bind(flag(draft.hide_children))
        .bind(draft.serial_num)
        .bind(&draft.permission)
        .bind(&draft.menu_type)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn update(&self, menu: &Menu) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE menus
            SET parent_id = $2, name = $3, title = $4, icon = $5, show = $6, component = $7,
                redirect = $8, path = $9, hide_children = $10, serial_num = $11,
                permission = $12, menu_type = $13, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(menu.id.0)
        .bind(menu.parent_id.0)
        .bind(&menu.name)
        .bind(&menu.title)
        .bind(&menu.icon)
        .bind(flag(menu.show))
        .bind(&menu.component)
        .bind(&menu.redirect)
        .bind(&menu.path)
        .bind(flag(menu.hide_children))
        .bind(menu.serial_num)
        .bind(&menu.permission)
        .bind(&menu.menu_type)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Menu {} not found", menu.id)));
        }
        Ok(())
    }

    async fn delete(&self, id: MenuId) -> AppResult<()> {
        sqlx::query("DELETE FROM menus WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn has_children(&self, id: MenuId) -> AppResult<bool> {
        let result: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM menus WHERE parent_id = $1)")
                .bind(id.0)
                .fetch_one(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        Ok(result.0)
    }
}
