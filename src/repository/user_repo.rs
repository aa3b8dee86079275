// ==========================================
// 刀具磨损追踪系统 - 用户仓储
// ==========================================
// cpf 以 11 位纯数字存储，唯一
// ==========================================

use crate::domain::datetime::now_utc;
use crate::domain::types::UserRole;
use crate::domain::user::{NewUser, User};
use crate::repository::columns::{ts, ts_to_db};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex, MutexGuard};

const USER_COLUMNS: &str = "id, name, cpf, password_hash, role, created_at";

pub struct UserRepository {
    conn: Arc<Mutex<Connection>>,
}

impl UserRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<User> {
        Ok(User {
            id: row.get(0)?,
            name: row.get(1)?,
            cpf: row.get(2)?,
            password_hash: row.get(3)?,
            role: UserRole::from_db_str(&row.get::<_, String>(4)?),
            created_at: ts(row, 5)?,
        })
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<User>> {
        let conn = self.get_conn()?;
        Self::find_by_id_locked(&conn, id)
    }

    fn find_by_id_locked(conn: &Connection, id: i64) -> RepositoryResult<Option<User>> {
        let user = conn
            .query_row(
                &format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS),
                params![id],
                Self::map_row,
            )
            .optional()?;
        Ok(user)
    }

    pub fn find_by_cpf(&self, cpf: &str) -> RepositoryResult<Option<User>> {
        let conn = self.get_conn()?;
        let user = conn
            .query_row(
                &format!("SELECT {} FROM users WHERE cpf = ?1", USER_COLUMNS),
                params![cpf],
                Self::map_row,
            )
            .optional()?;
        Ok(user)
    }

    pub fn insert(&self, user: &NewUser) -> RepositoryResult<User> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO users (name, cpf, password_hash, role, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                user.name,
                user.cpf,
                user.password_hash,
                user.role.to_db_str(),
                ts_to_db(&now_utc()),
            ],
        )?;
        let id = conn.last_insert_rowid();
        Self::find_by_id_locked(&conn, id)?.ok_or_else(|| RepositoryError::not_found("User", id))
    }
}
