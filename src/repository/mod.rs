// ==========================================
// 刀具磨损追踪系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

mod columns;
pub mod error;
pub mod failure_repo;
pub mod memory_store;
pub mod production_repo;
pub mod sqlite_store;
pub mod store;
pub mod tool_repo;
pub mod user_repo;

// 重导出核心仓储
pub use error::{RepositoryError, RepositoryResult};
pub use failure_repo::FailureRepository;
pub use memory_store::MemoryShopStore;
pub use production_repo::ProductionRecordRepository;
pub use sqlite_store::SqliteShopStore;
pub use store::ShopStore;
pub use tool_repo::ToolRepository;
pub use user_repo::UserRepository;
