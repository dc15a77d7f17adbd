//! sqlx 错误到 AppError 的映射
//!
//! 约束类错误保留约束名；唯一约束冲突可通过 [`unique_violation`] 取回约束名，
//! 由仓储层换成面向用户的提示。

use console_errors::AppError;

mod sqlstate {
    pub const UNIQUE_VIOLATION: &str = "23505";
    pub const FOREIGN_KEY_VIOLATION: &str = "23503";
    pub const NOT_NULL_VIOLATION: &str = "23502";
    pub const CHECK_VIOLATION: &str = "23514";
    pub const STRING_TOO_LONG: &str = "22001";
    pub const NUMERIC_OUT_OF_RANGE: &str = "22003";
    pub const INVALID_TEXT: &str = "22P02";
}

pub fn map_sqlx_error(e: sqlx::Error) -> AppError {
    match &e {
        sqlx::Error::RowNotFound => AppError::not_found("Record not found"),
        sqlx::Error::Database(db) => {
            from_sqlstate(db.code().as_deref(), db.constraint(), db.message())
        }
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
            AppError::internal(format!("Database pool unavailable: {}", e))
        }
        _ => AppError::database(e.to_string()),
    }
}

/// 唯一约束冲突时返回约束名
pub fn unique_violation(e: &sqlx::Error) -> Option<&str> {
    match e {
        sqlx::Error::Database(db)
            if db.code().as_deref() == Some(sqlstate::UNIQUE_VIOLATION) =>
        {
            db.constraint()
        }
        _ => None,
    }
}

fn from_sqlstate(code: Option<&str>, constraint: Option<&str>, message: &str) -> AppError {
    let Some(code) = code else {
        return AppError::database(message.to_string());
    };
    let on = constraint.map(|c| format!(" ({})", c)).unwrap_or_default();

    match code {
        sqlstate::UNIQUE_VIOLATION => AppError::conflict(format!("Duplicate value{}", on)),
        sqlstate::FOREIGN_KEY_VIOLATION => {
            AppError::validation(format!("Referenced record does not exist{}", on))
        }
        sqlstate::NOT_NULL_VIOLATION | sqlstate::CHECK_VIOLATION => {
            AppError::validation(format!("Value violates a column constraint{}", on))
        }
        sqlstate::STRING_TOO_LONG => AppError::validation("Value is too long"),
        sqlstate::NUMERIC_OUT_OF_RANGE | sqlstate::INVALID_TEXT => {
            AppError::validation("Value has an invalid format")
        }
        _ => AppError::database(format!("Database error ({}): {}", code, message)),
    }
}
