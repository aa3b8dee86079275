// ==========================================
// 刀具磨损追踪系统 - 刀具数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::datetime::now_utc;
use crate::domain::tool::{NewTool, Tool, ToolPatch};
use crate::domain::types::ToolStatus;
use crate::repository::columns::{opt_ts, ts, ts_to_db};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex, MutexGuard};

const TOOL_COLUMNS: &str = r#"
    id, code, description, brand, type, diameter, length, material, coating,
    max_rpm, cutting_edges, status, notes, created_at, updated_at
"#;

// ==========================================
// ToolRepository - 刀具仓储
// ==========================================
/// 职责: 管理 tools 表的 CRUD 操作
pub struct ToolRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ToolRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<Tool> {
        Ok(Tool {
            id: row.get(0)?,
            code: row.get(1)?,
            description: row.get(2)?,
            brand: row.get(3)?,
            tool_type: row.get(4)?,
            diameter: row.get(5)?,
            length: row.get(6)?,
            material: row.get(7)?,
            coating: row.get(8)?,
            max_rpm: row.get(9)?,
            cutting_edges: row.get(10)?,
            status: ToolStatus::from_db_str(&row.get::<_, String>(11)?),
            notes: row.get(12)?,
            created_at: ts(row, 13)?,
            updated_at: opt_ts(row, 14)?,
        })
    }

    /// 查询全部刀具（按 id 升序）
    pub fn list(&self) -> RepositoryResult<Vec<Tool>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!("SELECT {} FROM tools ORDER BY id ASC", TOOL_COLUMNS))?;
        let tools = stmt
            .query_map([], Self::map_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tools)
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Tool>> {
        let conn = self.get_conn()?;
        Self::find_by_id_locked(&conn, id)
    }

    fn find_by_id_locked(conn: &Connection, id: i64) -> RepositoryResult<Option<Tool>> {
        let tool = conn
            .query_row(
                &format!("SELECT {} FROM tools WHERE id = ?1", TOOL_COLUMNS),
                params![id],
                Self::map_row,
            )
            .optional()?;
        Ok(tool)
    }

    pub fn find_by_code(&self, code: &str) -> RepositoryResult<Option<Tool>> {
        let conn = self.get_conn()?;
        let tool = conn
            .query_row(
                &format!("SELECT {} FROM tools WHERE code = ?1", TOOL_COLUMNS),
                params![code],
                Self::map_row,
            )
            .optional()?;
        Ok(tool)
    }

    /// 新建刀具，返回含 id 的完整实体
    pub fn insert(&self, tool: &NewTool) -> RepositoryResult<Tool> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO tools (
                code, description, brand, type, diameter, length, material, coating,
                max_rpm, cutting_edges, status, notes, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
            params![
                tool.code,
                tool.description,
                tool.brand,
                tool.tool_type,
                tool.diameter,
                tool.length,
                tool.material,
                tool.coating,
                tool.max_rpm,
                tool.cutting_edges,
                tool.status.unwrap_or_default().to_db_str(),
                tool.notes,
                ts_to_db(&now_utc()),
            ],
        )?;
        let id = conn.last_insert_rowid();
        Self::find_by_id_locked(&conn, id)?.ok_or_else(|| RepositoryError::not_found("Tool", id))
    }

    /// 部分更新：读出 → 应用补丁 → 整行写回
    pub fn update(&self, id: i64, patch: &ToolPatch) -> RepositoryResult<Tool> {
        let conn = self.get_conn()?;
        let mut tool =
            Self::find_by_id_locked(&conn, id)?.ok_or_else(|| RepositoryError::not_found("Tool", id))?;
        patch.apply_to(&mut tool);
        tool.updated_at = Some(now_utc());

        conn.execute(
            r#"
            UPDATE tools SET
                code = ?1, description = ?2, brand = ?3, type = ?4, diameter = ?5,
                length = ?6, material = ?7, coating = ?8, max_rpm = ?9, cutting_edges = ?10,
                status = ?11, notes = ?12, updated_at = ?13
            WHERE id = ?14
            "#,
            params![
                tool.code,
                tool.description,
                tool.brand,
                tool.tool_type,
                tool.diameter,
                tool.length,
                tool.material,
                tool.coating,
                tool.max_rpm,
                tool.cutting_edges,
                tool.status.to_db_str(),
                tool.notes,
                tool.updated_at.as_ref().map(ts_to_db),
                id,
            ],
        )?;
        Ok(tool)
    }

    pub fn delete(&self, id: i64) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM tools WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }

    /// 生产记录与故障中对该刀具的引用总数
    pub fn reference_count(&self, id: i64) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            r#"
            SELECT
                (SELECT COUNT(*) FROM production_records WHERE tool_id = ?1)
              + (SELECT COUNT(*) FROM tool_failures WHERE tool_id = ?1)
            "#,
            params![id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
