//! PostgreSQL 仓储实现

mod menu_repository;
mod migrations;
mod role_repository;
mod user_repository;

pub use menu_repository::PostgresMenuRepository;
pub use migrations::{MIGRATIONS, run_migrations};
pub use role_repository::PostgresRoleRepository;
pub use user_repository::PostgresUserRepository;

use console_common::IdListError;
use console_errors::AppError;

/// 存储中的 ID 列表损坏
fn corrupt_id_list(column: &str, owner: i64, e: IdListError) -> AppError {
    AppError::validation(format!("Malformed {} for record {}: {}", column, owner, e))
}
