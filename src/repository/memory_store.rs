// ==========================================
// 刀具磨损追踪系统 - 内存存储实现
// ==========================================
// 用途: 无数据库的演示/开发模式
// 启动时写入固定演示数据；initialize(force=true) 时重置为演示数据
// 约束: 与 SqliteShopStore 保持相同的排序、唯一性与引用规则
// ==========================================

use crate::auth::password::hash_password;
use crate::domain::datetime::now_utc;
use crate::domain::{
    FailureEvent, FailureView, NewFailureEvent, NewProductionRecord, NewTool, NewUser,
    ProductionRecord, RecordFilter, Tool, ToolPatch, User, UserRole, RECORD_STATUS_FAILED,
};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::store::ShopStore;
use std::sync::{Mutex, MutexGuard, OnceLock};

/// 演示账号
pub const DEMO_OWNER_NAME: &str = "Admin";
pub const DEMO_OWNER_CPF: &str = "52998224725";
pub const DEMO_OWNER_PASSWORD: &str = "password";

/// 演示密码散列只计算一次（argon2 计算较慢）
static DEMO_PASSWORD_HASH: OnceLock<String> = OnceLock::new();

fn demo_password_hash() -> RepositoryResult<String> {
    if let Some(hash) = DEMO_PASSWORD_HASH.get() {
        return Ok(hash.clone());
    }
    let hash = hash_password(DEMO_OWNER_PASSWORD)
        .map_err(|e| RepositoryError::InternalError(e.to_string()))?;
    Ok(DEMO_PASSWORD_HASH.get_or_init(|| hash).clone())
}

#[derive(Debug, Default)]
struct MemoryState {
    tools: Vec<Tool>,
    records: Vec<ProductionRecord>,
    failures: Vec<FailureEvent>,
    users: Vec<User>,
    next_tool_id: i64,
    next_record_id: i64,
    next_failure_id: i64,
    next_user_id: i64,
}

impl MemoryState {
    fn seeded() -> RepositoryResult<Self> {
        let now = now_utc();
        let mut state = MemoryState {
            next_tool_id: 1,
            next_record_id: 1,
            next_failure_id: 1,
            next_user_id: 1,
            ..Default::default()
        };

        for (code, description, brand) in [
            ("T-100", "Fresa 10mm", "Korloy"),
            ("T-200", "Broca 5mm", "Dormer"),
        ] {
            state.push_tool(
                &NewTool {
                    code: code.to_string(),
                    description: description.to_string(),
                    brand: Some(brand.to_string()),
                    ..Default::default()
                },
                now,
            );
        }

        state.push_user(
            &NewUser {
                name: DEMO_OWNER_NAME.to_string(),
                cpf: DEMO_OWNER_CPF.to_string(),
                password_hash: demo_password_hash()?,
                role: UserRole::Owner,
            },
            now,
        );

        for (tool_id, machine, pieces) in [(1, "Maq-1", 120), (2, "Maq-2", 50)] {
            state.push_record(
                &NewProductionRecord {
                    tool_id,
                    machine: machine.to_string(),
                    pieces,
                    entry_datetime: None,
                    exit_datetime: None,
                },
                now,
            );
        }
        Ok(state)
    }

    fn push_tool(&mut self, tool: &NewTool, now: chrono::NaiveDateTime) -> Tool {
        let tool = Tool {
            id: self.next_tool_id,
            code: tool.code.clone(),
            description: tool.description.clone(),
            brand: tool.brand.clone(),
            tool_type: tool.tool_type.clone(),
            diameter: tool.diameter,
            length: tool.length,
            material: tool.material.clone(),
            coating: tool.coating.clone(),
            max_rpm: tool.max_rpm,
            cutting_edges: tool.cutting_edges,
            status: tool.status.unwrap_or_default(),
            notes: tool.notes.clone(),
            created_at: now,
            updated_at: None,
        };
        self.next_tool_id += 1;
        self.tools.push(tool.clone());
        tool
    }

    fn push_record(&mut self, record: &NewProductionRecord, now: chrono::NaiveDateTime) -> ProductionRecord {
        let record = ProductionRecord {
            id: self.next_record_id,
            tool_id: record.tool_id,
            machine: record.machine.clone(),
            pieces: record.pieces,
            entry_datetime: record.entry_datetime,
            exit_datetime: record.exit_datetime,
            status: None,
            created_at: Some(now),
        };
        self.next_record_id += 1;
        self.records.push(record.clone());
        record
    }

    fn push_user(&mut self, user: &NewUser, now: chrono::NaiveDateTime) -> User {
        let user = User {
            id: self.next_user_id,
            name: user.name.clone(),
            cpf: user.cpf.clone(),
            password_hash: user.password_hash.clone(),
            role: user.role,
            created_at: now,
        };
        self.next_user_id += 1;
        self.users.push(user.clone());
        user
    }

    fn tool_exists(&self, id: i64) -> bool {
        self.tools.iter().any(|t| t.id == id)
    }

    fn view(&self, failure: &FailureEvent) -> FailureView {
        let tool = self.tools.iter().find(|t| t.id == failure.tool_id);
        FailureView {
            failure: failure.clone(),
            tool_code: tool.map(|t| t.code.clone()),
            tool_description: tool.map(|t| t.description.clone()),
            operator_name: self
                .users
                .iter()
                .find(|u| u.id == failure.operator_id)
                .map(|u| u.name.clone()),
        }
    }
}

// ==========================================
// MemoryShopStore - 内存存储
// ==========================================
pub struct MemoryShopStore {
    state: Mutex<MemoryState>,
}

impl MemoryShopStore {
    /// 创建并写入演示数据
    pub fn seeded() -> RepositoryResult<Self> {
        let store = Self {
            state: Mutex::new(MemoryState::seeded()?),
        };
        tracing::info!("内存存储已就绪（演示数据）");
        Ok(store)
    }

    /// 创建空存储（测试用）
    pub fn empty() -> Self {
        Self {
            state: Mutex::new(MemoryState {
                next_tool_id: 1,
                next_record_id: 1,
                next_failure_id: 1,
                next_user_id: 1,
                ..Default::default()
            }),
        }
    }

    fn lock(&self) -> RepositoryResult<MutexGuard<MemoryState>> {
        self.state
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }
}

impl ShopStore for MemoryShopStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    fn initialize(&self, force: bool) -> RepositoryResult<()> {
        if force {
            let fresh = MemoryState::seeded()?;
            *self.lock()? = fresh;
            tracing::warn!("内存存储已重置为演示数据");
        }
        Ok(())
    }

    fn list_tools(&self) -> RepositoryResult<Vec<Tool>> {
        let mut tools = self.lock()?.tools.clone();
        tools.sort_by_key(|t| t.id);
        Ok(tools)
    }

    fn find_tool(&self, id: i64) -> RepositoryResult<Option<Tool>> {
        Ok(self.lock()?.tools.iter().find(|t| t.id == id).cloned())
    }

    fn find_tool_by_code(&self, code: &str) -> RepositoryResult<Option<Tool>> {
        Ok(self.lock()?.tools.iter().find(|t| t.code == code).cloned())
    }

    fn insert_tool(&self, tool: &NewTool) -> RepositoryResult<Tool> {
        let mut state = self.lock()?;
        if state.tools.iter().any(|t| t.code == tool.code) {
            return Err(RepositoryError::UniqueConstraintViolation(format!(
                "tools.code={}",
                tool.code
            )));
        }
        Ok(state.push_tool(tool, now_utc()))
    }

    fn update_tool(&self, id: i64, patch: &ToolPatch) -> RepositoryResult<Tool> {
        let mut state = self.lock()?;
        if let Some(code) = &patch.code {
            if state.tools.iter().any(|t| t.id != id && &t.code == code) {
                return Err(RepositoryError::UniqueConstraintViolation(format!(
                    "tools.code={}",
                    code
                )));
            }
        }
        let tool = state
            .tools
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| RepositoryError::not_found("Tool", id))?;
        patch.apply_to(tool);
        tool.updated_at = Some(now_utc());
        Ok(tool.clone())
    }

    fn delete_tool(&self, id: i64) -> RepositoryResult<bool> {
        let mut state = self.lock()?;
        if state.records.iter().any(|r| r.tool_id == id)
            || state.failures.iter().any(|f| f.tool_id == id)
        {
            return Err(RepositoryError::ForeignKeyViolation(format!("tools.id={}", id)));
        }
        let before = state.tools.len();
        state.tools.retain(|t| t.id != id);
        Ok(state.tools.len() < before)
    }

    fn tool_reference_count(&self, id: i64) -> RepositoryResult<i64> {
        let state = self.lock()?;
        let records = state.records.iter().filter(|r| r.tool_id == id).count();
        let failures = state.failures.iter().filter(|f| f.tool_id == id).count();
        Ok((records + failures) as i64)
    }

    fn list_records(&self, filter: &RecordFilter) -> RepositoryResult<Vec<ProductionRecord>> {
        let mut records: Vec<ProductionRecord> = self
            .lock()?
            .records
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        records.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(records)
    }

    fn insert_record(&self, record: &NewProductionRecord) -> RepositoryResult<ProductionRecord> {
        let mut state = self.lock()?;
        if !state.tool_exists(record.tool_id) {
            return Err(RepositoryError::ForeignKeyViolation(format!(
                "production_records.tool_id={}",
                record.tool_id
            )));
        }
        Ok(state.push_record(record, now_utc()))
    }

    fn delete_record(&self, id: i64) -> RepositoryResult<bool> {
        let mut state = self.lock()?;
        let before = state.records.len();
        state.records.retain(|r| r.id != id);
        Ok(state.records.len() < before)
    }

    fn mark_records_failed(&self, ids: &[i64]) -> RepositoryResult<usize> {
        let mut state = self.lock()?;
        let mut affected = 0;
        for record in state.records.iter_mut().filter(|r| ids.contains(&r.id)) {
            record.status = Some(RECORD_STATUS_FAILED.to_string());
            affected += 1;
        }
        Ok(affected)
    }

    fn list_failures(&self) -> RepositoryResult<Vec<FailureView>> {
        let state = self.lock()?;
        let mut views: Vec<FailureView> = state.failures.iter().map(|f| state.view(f)).collect();
        views.sort_by(|a, b| {
            (b.failure.failure_datetime, b.failure.id).cmp(&(a.failure.failure_datetime, a.failure.id))
        });
        Ok(views)
    }

    fn insert_failure(&self, failure: &NewFailureEvent) -> RepositoryResult<FailureView> {
        let mut state = self.lock()?;
        if !state.tool_exists(failure.tool_id) {
            return Err(RepositoryError::ForeignKeyViolation(format!(
                "tool_failures.tool_id={}",
                failure.tool_id
            )));
        }
        if !state.users.iter().any(|u| u.id == failure.operator_id) {
            return Err(RepositoryError::ForeignKeyViolation(format!(
                "tool_failures.operator_id={}",
                failure.operator_id
            )));
        }
        let event = FailureEvent {
            id: state.next_failure_id,
            tool_id: failure.tool_id,
            operator_id: failure.operator_id,
            failure_datetime: failure.failure_datetime,
            failure_type: failure.failure_type.clone(),
            severity: failure.severity,
            machine: failure.machine.clone(),
            operation_type: failure.operation_type.clone(),
            material_processed: failure.material_processed.clone(),
            cutting_parameters: failure.cutting_parameters.clone(),
            reason: failure.reason.clone(),
            action_taken: failure.action_taken.clone(),
            maintenance_required: failure.maintenance_required,
            created_at: now_utc(),
        };
        state.next_failure_id += 1;
        state.failures.push(event.clone());
        Ok(state.view(&event))
    }

    fn find_user(&self, id: i64) -> RepositoryResult<Option<User>> {
        Ok(self.lock()?.users.iter().find(|u| u.id == id).cloned())
    }

    fn find_user_by_cpf(&self, cpf: &str) -> RepositoryResult<Option<User>> {
        Ok(self.lock()?.users.iter().find(|u| u.cpf == cpf).cloned())
    }

    fn insert_user(&self, user: &NewUser) -> RepositoryResult<User> {
        let mut state = self.lock()?;
        if state.users.iter().any(|u| u.cpf == user.cpf) {
            return Err(RepositoryError::UniqueConstraintViolation(format!(
                "users.cpf={}",
                user.cpf
            )));
        }
        Ok(state.push_user(user, now_utc()))
    }
}
