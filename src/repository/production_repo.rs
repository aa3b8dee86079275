// ==========================================
// 刀具磨损追踪系统 - 生产记录仓储
// ==========================================
// 红线: 记录只增删，不修改业务字段（status 软标注除外）
// ==========================================

use crate::domain::datetime::now_utc;
use crate::domain::production::{
    NewProductionRecord, ProductionRecord, RecordFilter, RECORD_STATUS_FAILED,
};
use crate::repository::columns::{opt_ts, opt_ts_to_db, ts_to_db};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex, MutexGuard};

const RECORD_COLUMNS: &str =
    "id, tool_id, machine, pieces, entry_datetime, exit_datetime, status, created_at";

pub struct ProductionRecordRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ProductionRecordRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<ProductionRecord> {
        Ok(ProductionRecord {
            id: row.get(0)?,
            tool_id: row.get(1)?,
            machine: row.get(2)?,
            pieces: row.get(3)?,
            entry_datetime: opt_ts(row, 4)?,
            exit_datetime: opt_ts(row, 5)?,
            status: row.get(6)?,
            created_at: opt_ts(row, 7)?,
        })
    }

    /// 按过滤条件查询（最新在前）
    ///
    /// 过滤条件动态拼接为参数化 WHERE 子句
    pub fn list(&self, filter: &RecordFilter) -> RepositoryResult<Vec<ProductionRecord>> {
        let mut clauses: Vec<&str> = Vec::new();
        let mut args: Vec<Value> = Vec::new();

        if let Some(id) = filter.id {
            clauses.push("id = ?");
            args.push(Value::Integer(id));
        }
        if let Some(tool_id) = filter.tool_id {
            clauses.push("tool_id = ?");
            args.push(Value::Integer(tool_id));
        }
        if let Some(machine) = filter.machine.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
            clauses.push("instr(machine, ?) > 0");
            args.push(Value::Text(machine.to_string()));
        }

        let where_sql = if clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", clauses.join(" AND "))
        };
        let sql = format!(
            "SELECT {} FROM production_records {} ORDER BY created_at DESC, id DESC",
            RECORD_COLUMNS, where_sql
        );

        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let records = stmt
            .query_map(params_from_iter(args), Self::map_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    fn find_by_id_locked(conn: &Connection, id: i64) -> RepositoryResult<Option<ProductionRecord>> {
        let record = conn
            .query_row(
                &format!("SELECT {} FROM production_records WHERE id = ?1", RECORD_COLUMNS),
                params![id],
                Self::map_row,
            )
            .optional()?;
        Ok(record)
    }

    /// 新建记录；created_at 由存储层写入
    pub fn insert(&self, record: &NewProductionRecord) -> RepositoryResult<ProductionRecord> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO production_records (
                tool_id, machine, pieces, entry_datetime, exit_datetime, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                record.tool_id,
                record.machine,
                record.pieces,
                opt_ts_to_db(&record.entry_datetime),
                opt_ts_to_db(&record.exit_datetime),
                ts_to_db(&now_utc()),
            ],
        )?;
        let id = conn.last_insert_rowid();
        Self::find_by_id_locked(&conn, id)?
            .ok_or_else(|| RepositoryError::not_found("ProductionRecord", id))
    }

    pub fn delete(&self, id: i64) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM production_records WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }

    /// 批量标注 failed（单事务）
    pub fn mark_failed(&self, ids: &[i64]) -> RepositoryResult<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        let mut affected = 0;
        {
            let mut stmt = tx.prepare("UPDATE production_records SET status = ?1 WHERE id = ?2")?;
            for id in ids {
                affected += stmt.execute(params![RECORD_STATUS_FAILED, id])?;
            }
        }
        tx.commit()?;
        Ok(affected)
    }
}
