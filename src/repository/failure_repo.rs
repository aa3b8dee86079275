// ==========================================
// 刀具磨损追踪系统 - 刀具故障仓储
// ==========================================
// 红线: 故障只追加
// 读模型: 关联 tools 与 users，返回 FailureView
// ==========================================

use crate::domain::datetime::now_utc;
use crate::domain::failure::{FailureEvent, FailureView, NewFailureEvent};
use crate::domain::types::FailureSeverity;
use crate::repository::columns::{ts, ts_to_db};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex, MutexGuard};

const VIEW_SELECT: &str = r#"
    SELECT
        f.id, f.tool_id, f.operator_id, f.failure_datetime, f.failure_type, f.severity,
        f.machine, f.operation_type, f.material_processed, f.cutting_parameters,
        f.reason, f.action_taken, f.maintenance_required, f.created_at,
        t.code, t.description, u.name
    FROM tool_failures f
    LEFT JOIN tools t ON t.id = f.tool_id
    LEFT JOIN users u ON u.id = f.operator_id
"#;

pub struct FailureRepository {
    conn: Arc<Mutex<Connection>>,
}

impl FailureRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_view(row: &Row<'_>) -> rusqlite::Result<FailureView> {
        let severity_raw: String = row.get(5)?;
        Ok(FailureView {
            failure: FailureEvent {
                id: row.get(0)?,
                tool_id: row.get(1)?,
                operator_id: row.get(2)?,
                failure_datetime: ts(row, 3)?,
                failure_type: row.get(4)?,
                severity: FailureSeverity::parse(&severity_raw).unwrap_or(FailureSeverity::Medium),
                machine: row.get(6)?,
                operation_type: row.get(7)?,
                material_processed: row.get(8)?,
                cutting_parameters: row.get(9)?,
                reason: row.get(10)?,
                action_taken: row.get(11)?,
                maintenance_required: row.get::<_, i64>(12)? != 0,
                created_at: ts(row, 13)?,
            },
            tool_code: row.get(14)?,
            tool_description: row.get(15)?,
            operator_name: row.get(16)?,
        })
    }

    /// 全部故障（最新在前）
    pub fn list(&self) -> RepositoryResult<Vec<FailureView>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} ORDER BY f.failure_datetime DESC, f.id DESC",
            VIEW_SELECT
        ))?;
        let failures = stmt
            .query_map([], Self::map_view)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(failures)
    }

    pub fn insert(&self, failure: &NewFailureEvent) -> RepositoryResult<FailureView> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO tool_failures (
                tool_id, operator_id, failure_datetime, failure_type, severity,
                machine, operation_type, material_processed, cutting_parameters,
                reason, action_taken, maintenance_required, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
            params![
                failure.tool_id,
                failure.operator_id,
                ts_to_db(&failure.failure_datetime),
                failure.failure_type,
                failure.severity.to_db_str(),
                failure.machine,
                failure.operation_type,
                failure.material_processed,
                failure.cutting_parameters,
                failure.reason,
                failure.action_taken,
                failure.maintenance_required as i64,
                ts_to_db(&now_utc()),
            ],
        )?;
        let id = conn.last_insert_rowid();
        conn.query_row(&format!("{} WHERE f.id = ?1", VIEW_SELECT), params![id], Self::map_view)
            .optional()?
            .ok_or_else(|| RepositoryError::not_found("FailureEvent", id))
    }
}
