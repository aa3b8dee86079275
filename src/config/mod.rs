// ==========================================
// 刀具磨损追踪系统 - 配置层
// ==========================================
// 职责: 运行参数加载（监听地址、存储、token、阈值、日志、语言）
// 来源: 进程环境变量
// ==========================================

pub mod app_config;

// 重导出核心配置
pub use app_config::{default_db_path, env_keys, parse_bool, AppConfig, ConfigError};
