// ==========================================
// 刀具磨损追踪系统 - 报表层
// ==========================================
// 职责: 报表周期、汇总聚合、CSV 导出
// 红线: 只消费已加载的数据，不访问存储
// ==========================================

pub mod export;
pub mod period;
pub mod summary;

pub use export::{render_failures_csv, render_records_csv, CsvOptions, ExportError, ExportKind};
pub use period::ReportPeriod;
pub use summary::{build_summary, FailureCount, ReportSummary, ReportTotals, ToolPieces};
