// ==========================================
// 刀具磨损追踪系统 - 数据存储 Trait
// ==========================================
// 职责: 定义持久化协作方接口（不包含业务逻辑）
// 实现者:
// - SqliteShopStore（rusqlite，生产环境）
// - MemoryShopStore（内存，演示/开发模式）
// 启动时二选一注入，API 层只依赖本 trait
// ==========================================

use crate::domain::{
    FailureView, NewFailureEvent, NewProductionRecord, NewTool, NewUser, ProductionRecord,
    RecordFilter, Tool, ToolPatch, User,
};
use crate::repository::error::RepositoryResult;

pub trait ShopStore: Send + Sync {
    /// 存储后端名称（日志与健康检查用）
    fn backend_name(&self) -> &'static str;

    /// 建库；`force` 为 true 时清空后重建
    fn initialize(&self, force: bool) -> RepositoryResult<()>;

    // ===== 刀具 =====

    /// 按 id 升序
    fn list_tools(&self) -> RepositoryResult<Vec<Tool>>;

    fn find_tool(&self, id: i64) -> RepositoryResult<Option<Tool>>;

    fn find_tool_by_code(&self, code: &str) -> RepositoryResult<Option<Tool>>;

    fn insert_tool(&self, tool: &NewTool) -> RepositoryResult<Tool>;

    /// 返回更新后的刀具；id 不存在时返回 NotFound
    fn update_tool(&self, id: i64, patch: &ToolPatch) -> RepositoryResult<Tool>;

    /// 返回是否删除了记录
    fn delete_tool(&self, id: i64) -> RepositoryResult<bool>;

    /// 引用该刀具的生产记录数 + 故障数
    fn tool_reference_count(&self, id: i64) -> RepositoryResult<i64>;

    // ===== 生产记录 =====

    /// 按 created_at、id 倒序（最新在前）
    fn list_records(&self, filter: &RecordFilter) -> RepositoryResult<Vec<ProductionRecord>>;

    fn insert_record(&self, record: &NewProductionRecord) -> RepositoryResult<ProductionRecord>;

    fn delete_record(&self, id: i64) -> RepositoryResult<bool>;

    /// 将被故障覆盖的记录标注为 failed，返回受影响行数
    fn mark_records_failed(&self, ids: &[i64]) -> RepositoryResult<usize>;

    // ===== 故障 =====

    /// 按 failure_datetime、id 倒序
    fn list_failures(&self) -> RepositoryResult<Vec<FailureView>>;

    fn insert_failure(&self, failure: &NewFailureEvent) -> RepositoryResult<FailureView>;

    // ===== 用户 =====

    fn find_user(&self, id: i64) -> RepositoryResult<Option<User>>;

    fn find_user_by_cpf(&self, cpf: &str) -> RepositoryResult<Option<User>>;

    fn insert_user(&self, user: &NewUser) -> RepositoryResult<User>;
}
