// ==========================================
// 刀具磨损追踪系统 - SQLite 存储实现
// ==========================================
// 职责: 聚合各表仓储，实现 ShopStore
// 并发: 所有仓储共享同一个 Arc<Mutex<Connection>>，每次操作独占连接
// ==========================================

use crate::db::{initialize_schema, open_sqlite_connection};
use crate::domain::{
    FailureView, NewFailureEvent, NewProductionRecord, NewTool, NewUser, ProductionRecord,
    RecordFilter, Tool, ToolPatch, User,
};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::failure_repo::FailureRepository;
use crate::repository::production_repo::ProductionRecordRepository;
use crate::repository::store::ShopStore;
use crate::repository::tool_repo::ToolRepository;
use crate::repository::user_repo::UserRepository;
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};

pub struct SqliteShopStore {
    conn: Arc<Mutex<Connection>>,
    tools: ToolRepository,
    records: ProductionRecordRepository,
    failures: FailureRepository,
    users: UserRepository,
}

impl SqliteShopStore {
    /// 打开数据库文件并建库（幂等）
    pub fn open(db_path: &Path) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        let store = Self::from_connection(Arc::new(Mutex::new(conn)));
        store.initialize(false)?;
        tracing::info!(path = %db_path.display(), "SQLite 存储已就绪");
        Ok(store)
    }

    /// 从已有连接创建（不自动建库）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            tools: ToolRepository::from_connection(conn.clone()),
            records: ProductionRecordRepository::from_connection(conn.clone()),
            failures: FailureRepository::from_connection(conn.clone()),
            users: UserRepository::from_connection(conn.clone()),
            conn,
        }
    }
}

impl ShopStore for SqliteShopStore {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    fn initialize(&self, force: bool) -> RepositoryResult<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        initialize_schema(&conn, force)?;
        Ok(())
    }

    fn list_tools(&self) -> RepositoryResult<Vec<Tool>> {
        self.tools.list()
    }

    fn find_tool(&self, id: i64) -> RepositoryResult<Option<Tool>> {
        self.tools.find_by_id(id)
    }

    fn find_tool_by_code(&self, code: &str) -> RepositoryResult<Option<Tool>> {
        self.tools.find_by_code(code)
    }

    fn insert_tool(&self, tool: &NewTool) -> RepositoryResult<Tool> {
        self.tools.insert(tool)
    }

    fn update_tool(&self, id: i64, patch: &ToolPatch) -> RepositoryResult<Tool> {
        self.tools.update(id, patch)
    }

    fn delete_tool(&self, id: i64) -> RepositoryResult<bool> {
        self.tools.delete(id)
    }

    fn tool_reference_count(&self, id: i64) -> RepositoryResult<i64> {
        self.tools.reference_count(id)
    }

    fn list_records(&self, filter: &RecordFilter) -> RepositoryResult<Vec<ProductionRecord>> {
        self.records.list(filter)
    }

    fn insert_record(&self, record: &NewProductionRecord) -> RepositoryResult<ProductionRecord> {
        self.records.insert(record)
    }

    fn delete_record(&self, id: i64) -> RepositoryResult<bool> {
        self.records.delete(id)
    }

    fn mark_records_failed(&self, ids: &[i64]) -> RepositoryResult<usize> {
        self.records.mark_failed(ids)
    }

    fn list_failures(&self) -> RepositoryResult<Vec<FailureView>> {
        self.failures.list()
    }

    fn insert_failure(&self, failure: &NewFailureEvent) -> RepositoryResult<FailureView> {
        self.failures.insert(failure)
    }

    fn find_user(&self, id: i64) -> RepositoryResult<Option<User>> {
        self.users.find_by_id(id)
    }

    fn find_user_by_cpf(&self, cpf: &str) -> RepositoryResult<Option<User>> {
        self.users.find_by_cpf(cpf)
    }

    fn insert_user(&self, user: &NewUser) -> RepositoryResult<User> {
        self.users.insert(user)
    }
}
