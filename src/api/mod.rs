// ==========================================
// 刀具磨损追踪系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口,供 HTTP 路由调用
// ==========================================

pub mod auth_api;
pub mod dashboard_api;
pub mod error;
pub mod failure_api;
pub mod record_api;
pub mod report_api;
pub mod tool_api;
pub mod validator;

// 重导出核心类型
pub use auth_api::{AuthApi, AuthResponse, LoginRequest, RegisterRequest};
pub use dashboard_api::{DashboardApi, DashboardTotals, DashboardView, ToolRunState, ToolStat};
pub use error::{ApiError, ApiResult};
pub use failure_api::{FailureApi, FailureInput};
pub use record_api::{
    AttributedRecord, DeleteResponse, RecordApi, RecordInput, RecordRowStatus,
    DEFAULT_ATTENTION_THRESHOLD, MAX_PIECES_PER_RECORD,
};
pub use report_api::{CsvExport, ReportApi};
pub use tool_api::{ToolApi, ToolInput, ToolWearView};
