// ==========================================
// 刀具磨损追踪系统 - 核心库
// ==========================================
// 技术栈: axum + Rust + SQLite
// 系统定位: 刀具寿命追踪（生产记录、故障、实时看板、报表）
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "en");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问（SQLite / 内存）
pub mod repository;

// 引擎层 - 磨损累计与严重度
pub mod engine;

// 报表层 - 汇总与 CSV
pub mod report;

// 认证基础设施
pub mod auth;

// 配置层 - 环境变量
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// 应用层 - HTTP 服务
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

pub use domain::{FailureEvent, FailureSeverity, ProductionRecord, Tool, ToolSeverity, User};
pub use engine::{accumulated_pieces, classify_tool, wear_window, AccumulationMode, WearWindow};
pub use repository::{MemoryShopStore, ShopStore, SqliteShopStore};
pub use app::{build_router, AppState};
pub use config::AppConfig;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "tool-wear-tracker";
