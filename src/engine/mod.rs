// ==========================================
// 刀具磨损追踪系统 - 引擎层
// ==========================================
// 职责: 实现磨损累计、严重度判定与事件定义
// 红线: Engine 不拼 SQL，只消费已加载的记录与故障
// ==========================================

pub mod events;
pub mod severity;
pub mod wear;

// 重导出核心引擎
pub use events::{LiveEvent, LiveEventKind, LiveEventPublisher, NoOpEventPublisher};
pub use severity::{
    alert_for_failure, alert_for_record, alert_for_tool, classify_tool, Alert, AlertKind,
    SeverityThresholds, ToolWearStatus, DEFAULT_PER_RECORD_THRESHOLD, DEFAULT_WARNING_THRESHOLD,
};
pub use wear::{
    accumulated_pieces, accumulated_until_failure, historical_window, live_window, wear_window,
    saturating_total, AccumulationMode, ResetMark, WearSample, WearWindow,
};
