//! 表结构迁移

use console_adapter_postgres::{Migration, migrate};
use console_errors::AppResult;
use sqlx::PgPool;
use tracing::info;

const CREATE_USERS: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id BIGSERIAL PRIMARY KEY,
    user_name VARCHAR(64) NOT NULL CONSTRAINT users_user_name_key UNIQUE,
    password VARCHAR(255) NOT NULL,
    email VARCHAR(255) NOT NULL CONSTRAINT users_email_key UNIQUE,
    role_ids TEXT NOT NULL DEFAULT '',
    info JSONB NOT NULL DEFAULT '{}'::jsonb,
    deleted SMALLINT NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
"#;

const CREATE_ROLES: &str = r#"
CREATE TABLE IF NOT EXISTS roles (
    id BIGSERIAL PRIMARY KEY,
    parent_id BIGINT NOT NULL DEFAULT 0,
    name VARCHAR(64) NOT NULL,
    description VARCHAR(255) NOT NULL DEFAULT '',
    menu_ids TEXT NOT NULL DEFAULT '',
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
CREATE INDEX IF NOT EXISTS idx_roles_parent_id ON roles (parent_id);
"#;

const CREATE_MENUS: &str = r#"
CREATE TABLE IF NOT EXISTS menus (
    id BIGSERIAL PRIMARY KEY,
    parent_id BIGINT NOT NULL DEFAULT 0,
    name VARCHAR(64) NOT NULL,
    title VARCHAR(64) NOT NULL DEFAULT '',
    icon VARCHAR(64) NOT NULL DEFAULT '',
    show SMALLINT NOT NULL DEFAULT 1,
    component VARCHAR(255) NOT NULL DEFAULT '',
    redirect VARCHAR(255) NOT NULL DEFAULT '',
    path VARCHAR(255) NOT NULL DEFAULT '',
    hide_children SMALLINT NOT NULL DEFAULT 0,
    serial_num INTEGER NOT NULL DEFAULT 0,
    permission VARCHAR(128) NOT NULL DEFAULT '',
    menu_type VARCHAR(32) NOT NULL DEFAULT '',
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
CREATE INDEX IF NOT EXISTS idx_menus_parent_id ON menus (parent_id);
"#;

/// 按版本排列的迁移
pub const MIGRATIONS: [Migration; 3] = [
    Migration::new(1, "create_users", CREATE_USERS),
    Migration::new(2, "create_roles", CREATE_ROLES),
    Migration::new(3, "create_menus", CREATE_MENUS),
];

const MIGRATION_TABLE: &str = "_admin_migrations";

pub async fn run_migrations(pool: &PgPool) -> AppResult<()> {
    let report = migrate(pool, MIGRATION_TABLE, &MIGRATIONS).await?;
    info!(
        applied = report.applied.len(),
        skipped = report.skipped.len(),
        "Database migrations complete"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_versions_are_ordered_and_unique() {
        let versions: Vec<i64> = MIGRATIONS.iter().map(|m| m.version).collect();
        assert_eq!(versions, vec![1, 2, 3]);
    }

    #[test]
    fn test_soft_delete_and_id_list_columns() {
        assert!(CREATE_USERS.contains("deleted SMALLINT"));
        assert!(CREATE_USERS.contains("CONSTRAINT users_user_name_key UNIQUE"));
        assert!(CREATE_USERS.contains("CONSTRAINT users_email_key UNIQUE"));
        assert!(CREATE_USERS.contains("role_ids TEXT"));
        assert!(CREATE_ROLES.contains("menu_ids TEXT"));
        assert!(CREATE_MENUS.contains("serial_num INTEGER"));
    }
}
