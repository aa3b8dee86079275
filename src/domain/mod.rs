// ==========================================
// 刀具磨损追踪系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、写模型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod datetime;
pub mod failure;
pub mod production;
pub mod tool;
pub mod types;
pub mod user;

// 重导出核心类型
pub use failure::{FailureEvent, FailureView, NewFailureEvent};
pub use production::{NewProductionRecord, ProductionRecord, RecordFilter, RECORD_STATUS_FAILED};
pub use tool::{NewTool, Tool, ToolPatch};
pub use types::{FailureSeverity, ToolSeverity, ToolStatus, UserRole};
pub use user::{NewUser, User, UserSummary};
