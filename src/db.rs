// ==========================================
// 刀具磨损追踪系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为（外键、busy_timeout）
// - 从内置 schema/init.sql 建库，支持强制重建
// ==========================================

use crate::domain::datetime::{format_timestamp, now_utc};
use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::path::Path;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 内置建库脚本
pub const INIT_SQL: &str = include_str!("../schema/init.sql");

/// 强制重建时的删表脚本（按外键依赖逆序）
const DROP_SQL: &str = r#"
DROP TABLE IF EXISTS tool_failures;
DROP TABLE IF EXISTS production_records;
DROP TABLE IF EXISTS tools;
DROP TABLE IF EXISTS users;
DROP TABLE IF EXISTS schema_version;
"#;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// foreign_keys 与 busy_timeout 都需要"每个连接"单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置（父目录不存在时自动创建）
pub fn open_sqlite_connection(db_path: &Path) -> rusqlite::Result<Connection> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| {
                rusqlite::Error::InvalidPath(format!("{}: {}", parent.display(), e).into())
            })?;
        }
    }
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

/// 建库（幂等）
///
/// # 参数
/// - `force`: true 时先删除全部业务表再重建（数据全部丢失）
pub fn initialize_schema(conn: &Connection, force: bool) -> rusqlite::Result<()> {
    if force {
        tracing::warn!("强制重建数据库结构，现有数据将被删除");
        conn.execute_batch(DROP_SQL)?;
    }

    conn.execute_batch(INIT_SQL)?;

    match read_schema_version(conn)? {
        None => {
            conn.execute(
                "INSERT INTO schema_version (version, applied_at) VALUES (?1, ?2)",
                rusqlite::params![CURRENT_SCHEMA_VERSION, format_timestamp(&now_utc())],
            )?;
        }
        Some(v) if v != CURRENT_SCHEMA_VERSION => {
            tracing::warn!(
                found = v,
                expected = CURRENT_SCHEMA_VERSION,
                "schema_version 与当前代码不一致，不做自动迁移"
            );
        }
        Some(_) => {}
    }
    Ok(())
}
