//! 版本化表结构迁移
//!
//! 待执行的迁移在同一个事务中按版本号依次应用，任一步失败整体回滚。
//! 已应用的迁移以 FNV-1a 校验和记录，SQL 被改动时拒绝启动。

use std::collections::{HashMap, HashSet};

use console_errors::{AppError, AppResult};
use sqlx::PgPool;
use tracing::{debug, info};

use crate::map_sqlx_error;

/// 单个迁移
#[derive(Debug, Clone, Copy)]
pub struct Migration {
    pub version: i64,
    pub name: &'static str,
    pub sql: &'static str,
}

impl Migration {
    pub const fn new(version: i64, name: &'static str, sql: &'static str) -> Self {
        Self { version, name, sql }
    }

    pub fn checksum(&self) -> String {
        fnv1a(self.sql)
    }
}

fn fnv1a(input: &str) -> String {
    const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    let hash = input
        .bytes()
        .fold(OFFSET_BASIS, |acc, b| (acc ^ u64::from(b)).wrapping_mul(PRIME));
    format!("{:016x}", hash)
}

/// 一次迁移的执行结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub applied: Vec<i64>,
    pub skipped: Vec<i64>,
}

/// 对照已记录的 (version, checksum) 计算待执行列表
///
/// 版本重复或校验和不一致都视为配置错误。
fn plan<'a>(
    recorded: &HashMap<i64, String>,
    migrations: &'a [Migration],
) -> AppResult<(Vec<&'a Migration>, Vec<i64>)> {
    let mut seen = HashSet::new();
    if let Some(dup) = migrations.iter().find(|m| !seen.insert(m.version)) {
        return Err(AppError::failed_precondition(format!(
            "Duplicate migration version {}",
            dup.version
        )));
    }

    let mut ordered: Vec<&Migration> = migrations.iter().collect();
    ordered.sort_by_key(|m| m.version);

    let mut pending = Vec::new();
    let mut skipped = Vec::new();
    for migration in ordered {
        match recorded.get(&migration.version) {
            Some(checksum) if *checksum == migration.checksum() => skipped.push(migration.version),
            Some(_) => {
                return Err(AppError::failed_precondition(format!(
                    "Migration {} ({}) was modified after being applied",
                    migration.version, migration.name
                )));
            }
            None => pending.push(migration),
        }
    }
    Ok((pending, skipped))
}

fn check_table_name(table: &str) -> AppResult<()> {
    let valid = !table.is_empty()
        && table
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(AppError::validation(format!(
            "Invalid migration table name '{}'",
            table
        )))
    }
}

/// 应用所有未执行的迁移，记录表为 `table`
pub async fn migrate(
    pool: &PgPool,
    table: &str,
    migrations: &[Migration],
) -> AppResult<MigrationReport> {
    check_table_name(table)?;

    sqlx::raw_sql(&format!(
        "CREATE TABLE IF NOT EXISTS {table} (
            version BIGINT PRIMARY KEY,
            name VARCHAR(255) NOT NULL,
            checksum VARCHAR(16) NOT NULL,
            applied_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )"
    ))
    .execute(pool)
    .await
    .map_err(map_sqlx_error)?;

    let recorded: HashMap<i64, String> =
        sqlx::query_as::<_, (i64, String)>(&format!("SELECT version, checksum FROM {table}"))
            .fetch_all(pool)
            .await
            .map_err(map_sqlx_error)?
            .into_iter()
            .collect();

    let (pending, skipped) = plan(&recorded, migrations)?;
    if pending.is_empty() {
        debug!(table, skipped = skipped.len(), "Schema is up to date");
        return Ok(MigrationReport {
            applied: Vec::new(),
            skipped,
        });
    }

    let mut tx = pool.begin().await.map_err(map_sqlx_error)?;
    let mut applied = Vec::with_capacity(pending.len());
    for migration in pending {
        sqlx::raw_sql(migration.sql)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::database(format!(
                    "Migration {} ({}) failed: {}",
                    migration.version, migration.name, e
                ))
            })?;
        sqlx::query(&format!(
            "INSERT INTO {table} (version, name, checksum) VALUES ($1, $2, $3)"
        ))
        .bind(migration.version)
        .bind(migration.name)
        .bind(migration.checksum())
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        info!(version = migration.version, name = migration.name, "Migration applied");
        applied.push(migration.version);
    }
    tx.commit().await.map_err(map_sqlx_error)?;

    Ok(MigrationReport { applied, skipped })
}
