//! PostgreSQL 用户仓储实现

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use console_adapter_postgres::{map_sqlx_error, unique_violation};
use console_common::{Pagination, UserId, join_id_list, parse_id_list};
use console_errors::{AppError, AppResult};
use sqlx::PgPool;

use super::corrupt_id_list;
use crate::domain::{
    HashedPassword, NewUser, User, UserRepository, email_taken, user_name_taken,
};

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    user_name: String,
    password: String,
    email: String,
    role_ids: String,
    info: serde_json::Value,
    deleted: i16,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> AppResult<User> {
        let role_ids =
            parse_id_list(&self.role_ids).map_err(|e| corrupt_id_list("users.role_ids", self.id, e))?;
        Ok(User {
            id: UserId(self.id),
            user_name: self.user_name,
            password_hash: HashedPassword::from_hash(self.password),
            email: self.email,
            role_ids,
            info: self.info,
            deleted: self.deleted != 0,
            created_at: self.created_at,
        })
    }
}

const USER_NAME_KEY: &str = "users_user_name_key";
const EMAIL_KEY: &str = "users_email_key";

/// 把 users 表唯一约束冲突换成与注册预检一致的提示
fn unique_conflict(constraint: Option<&str>, user_name: &str, email: &str) -> Option<AppError> {
    match constraint? {
        USER_NAME_KEY => Some(user_name_taken(user_name)),
        EMAIL_KEY => Some(email_taken(email)),
        _ => None,
    }
}

fn map_write_error(e: sqlx::Error, user_name: &str, email: &str) -> AppError {
    let conflict = unique_conflict(unique_violation(&e), user_name, email);
    conflict.unwrap_or_else(|| map_sqlx_error(e))
}

const SELECT_USER: &str = r#"
SELECT id, user_name, password, email, role_ids, info, deleted, created_at
FROM users
"#;

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!("{} WHERE id = $1", SELECT_USER))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.map(UserRow::into_user).transpose()
    }

    async fn find_by_user_name(&self, user_name: &str) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "{} WHERE user_name = $1 AND deleted = 0",
            SELECT_USER
        ))
        .bind(user_name)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(UserRow::into_user).transpose()
    }

    async fn exists_user_name(&self, user_name: &str) -> AppResult<bool> {
        let result: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE user_name = $1)")
                .bind(user_name)
                .fetch_one(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        Ok(result.0)
    }

    async fn exists_email(&self, email: &str) -> AppResult<bool> {
        let result: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.0)
    }

    async fn create(&self, user: &NewUser) -> AppResult<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (user_name, password, email)
            VALUES ($1, $2, $3)
            RETURNING id, user_name, password, email, role_ids, info, deleted, created_at
            "#,
        )
        .bind(user.user_name.as_str())
        .bind(user.password_hash.as_str())
        .bind(user.email.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, user.user_name.as_str(), user.email.as_str()))?;

        row.into_user()
    }

    async fn update(&self, user: &User) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET email = $2, role_ids = $3, info = $4, updated_at = NOW()
            WHERE id = $1 AND deleted = 0
            "#,
        )
        .bind(user.id.0)
        .bind(&user.email)
        .bind(join_id_list(&user.role_ids))
        .bind(&user.info)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &user.user_name, &user.email))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("User {} not found", user.id)));
        }
        Ok(())
    }

    async fn soft_delete(&self, id: UserId) -> AppResult<bool> {
        let result =
            sqlx::query("UPDATE users SET deleted = 1, updated_at = NOW() WHERE id = $1 AND deleted = 0")
                .bind(id.0)
                .execute(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_page(&self, pagination: &Pagination) -> AppResult<(Vec<User>, u64)> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "{} WHERE deleted = 0 ORDER BY id LIMIT $1 OFFSET $2",
            SELECT_USER
        ))
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE deleted = 0")
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        let users = rows
            .into_iter()
            .map(UserRow::into_user)
            .collect::<AppResult<Vec<_>>>()?;
        Ok((users, total.0.max(0) as u64))
    }
}
