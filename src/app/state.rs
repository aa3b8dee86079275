// ==========================================
// 刀具磨损追踪系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// 说明: 所有字段为 Arc，克隆代价低，直接作为 axum State
// ==========================================

use std::sync::Arc;

use anyhow::Context;

use crate::api::{AuthApi, DashboardApi, FailureApi, RecordApi, ReportApi, ToolApi};
use crate::app::broadcaster::EventBroadcaster;
use crate::auth::TokenSigner;
use crate::config::AppConfig;
use crate::engine::LiveEventPublisher;
use crate::repository::{MemoryShopStore, ShopStore, SqliteShopStore};

/// 应用状态
///
/// 包含所有API实例和共享资源
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,

    /// 持久化后端（SQLite 或内存演示数据）
    pub store: Arc<dyn ShopStore>,

    /// 实时事件广播（SSE）
    pub broadcaster: Arc<EventBroadcaster>,

    pub auth_api: Arc<AuthApi>,
    pub tool_api: Arc<ToolApi>,
    pub record_api: Arc<RecordApi>,
    pub failure_api: Arc<FailureApi>,
    pub dashboard_api: Arc<DashboardApi>,
    pub report_api: Arc<ReportApi>,
}

impl AppState {
    /// 基于已选定的存储装配所有 API
    pub fn new(config: AppConfig, store: Arc<dyn ShopStore>) -> Self {
        tracing::info!(backend = store.backend_name(), "初始化AppState");

        let broadcaster = Arc::new(EventBroadcaster::new());
        let publisher: Arc<dyn LiveEventPublisher> = broadcaster.clone();
        let thresholds = config.thresholds;
        let signer = TokenSigner::new(config.token_secret.as_bytes(), config.token_ttl_hours);

        Self {
            auth_api: Arc::new(AuthApi::new(store.clone(), signer)),
            tool_api: Arc::new(ToolApi::new(store.clone(), publisher.clone(), thresholds)),
            record_api: Arc::new(RecordApi::new(store.clone(), publisher.clone(), thresholds)),
            failure_api: Arc::new(FailureApi::new(store.clone(), publisher)),
            dashboard_api: Arc::new(DashboardApi::new(store.clone(), thresholds)),
            report_api: Arc::new(ReportApi::new(store.clone())),
            config: Arc::new(config),
            store,
            broadcaster,
        }
    }

    /// 按配置选择存储后端并装配
    pub fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let store = open_store(&config)?;
        Ok(Self::new(config, store))
    }
}

/// 选择存储后端
///
/// - in_memory: 内存存储并写入演示数据
/// - 否则打开（必要时创建）SQLite 数据库文件
pub fn open_store(config: &AppConfig) -> anyhow::Result<Arc<dyn ShopStore>> {
    if config.in_memory {
        tracing::warn!("使用内存存储（演示数据，重启后丢失）");
        let store = MemoryShopStore::seeded().context("无法创建内存存储")?;
        return Ok(Arc::new(store));
    }

    tracing::info!("使用数据库: {}", config.db_path.display());
    let store = SqliteShopStore::open(&config.db_path)
        .with_context(|| format!("无法打开数据库: {}", config.db_path.display()))?;
    Ok(Arc::new(store))
}
