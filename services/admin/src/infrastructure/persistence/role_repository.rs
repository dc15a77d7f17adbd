//! PostgreSQL 角色仓储实现

use async_trait::async_trait;
use console_adapter_postgres::map_sqlx_error;
use console_common::{Pagination, RoleId, join_id_list, parse_id_list};
use console_errors::{AppError, AppResult};
use sqlx::PgPool;

use super::corrupt_id_list;
use crate::domain::{Role, RoleDraft, RoleRepository};

#[derive(Debug, sqlx::FromRow)]
struct RoleRow {
    id: i64,
    parent_id: i64,
    name: String,
    description: String,
    menu_ids: String,
}

impl RoleRow {
    fn into_role(self) -> AppResult<Role> {
        let menu_ids =
            parse_id_list(&self.menu_ids).map_err(|e| corrupt_id_list("roles.menu_ids", self.id, e))?;
        Ok(Role {
            id: RoleId(self.id),
            parent_id: RoleId(self.parent_id),
            name: self.name,
            description: self.description,
            menu_ids,
        })
    }
}

fn into_roles(rows: Vec<RoleRow>) -> AppResult<Vec<Role>> {
    rows.into_iter().map(RoleRow::into_role).collect()
}

const SELECT_ROLE: &str = "SELECT id, parent_id, name, description, menu_ids FROM roles";

pub struct PostgresRoleRepository {
    pool: PgPool,
}

impl PostgresRoleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoleRepository for PostgresRoleRepository {
    async fn list_all(&self) -> AppResult<Vec<Role>> {
        let rows = sqlx::query_as::<_, RoleRow>(&format!("{} ORDER BY id", SELECT_ROLE))
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        into_roles(rows)
    }

    async fn list_page(&self, pagination: &Pagination) -> AppResult<(Vec<Role>, u64)> {
        let rows = sqlx::query_as::<_, RoleRow>(&format!(
            "{} ORDER BY id LIMIT $1 OFFSET $2",
            SELECT_ROLE
        ))
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM roles")
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok((into_roles(rows)?, total.0.max(0) as u64))
    }

    async fn find_by_id(&self, id: RoleId) -> AppResult<Option<Role>> {
        let row = sqlx::query_as::<_, RoleRow>(&format!("{} WHERE id = $1", SELECT_ROLE))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.map(RoleRow::into_role).transpose()
    }

    async fn create(&self, draft: &RoleDraft) -> AppResult<Role> {
        let row = sqlx::query_as::<_, RoleRow>(
            r#"
            INSERT INTO roles (parent_id, name, description, menu_ids)
            VALUES ($1, $2, $3, $4)
            RETURNING id, parent_id, name, description, menu_ids
            "#,
        )
        .bind(draft.parent_id.0)
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(join_id_list(&draft.menu_ids))
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.into_role()
    }

    async fn update(&self, role: &Role) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE roles
            SET parent_id = $2, name = $3, description = $4, menu_ids = $5, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(role.id.0)
        .bind(role.parent_id.0)
        .bind(&role.name)
        .bind(&role.description)
        .bind(join_id_list(&role.menu_ids))
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Role {} not found", role.id)));
        }
        Ok(())
    }

    async fn delete(&self, id: RoleId) -> AppResult<()> {
        sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn has_children(&self, id: RoleId) -> AppResult<bool> {
        let result: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM roles WHERE parent_id = $1)")
                .bind(id.0)
                .fetch_one(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        Ok(result.0)
    }
}
