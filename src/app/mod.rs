// ==========================================
// 刀具磨损追踪系统 - 应用层
// ==========================================
// 职责: 应用状态装配、实时事件广播、HTTP 路由
// ==========================================

pub mod broadcaster;
pub mod routes;
pub mod state;

// 重导出
pub use broadcaster::{EventBroadcaster, Subscription, DEFAULT_SUBSCRIBER_BUFFER};
pub use routes::build_router;
pub use state::{open_store, AppState};
