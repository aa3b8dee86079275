// ==========================================
// 系统路由: 健康检查、建库
// ==========================================

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::{ApiError, ApiResult};
use crate::app::routes::common::{ApiQuery, parse_flag};
use crate::app::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub name: &'static str,
    pub version: &'static str,
    pub backend: &'static str,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        name: crate::APP_NAME,
        version: crate::VERSION,
        backend: state.store.backend_name(),
    })
}

#[derive(Debug, Default, Deserialize)]
pub struct InitializeQuery {
    pub force: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InitializeResponse {
    pub success: bool,
    pub force: bool,
    pub backend: &'static str,
}

/// 建库；force 时先删表（内存存储则重置演示数据）
pub async fn initialize_db(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<InitializeQuery>,
) -> ApiResult<Json<InitializeResponse>> {
    let force = parse_flag(query.force.as_deref());
    state.store.initialize(force).map_err(ApiError::from)?;
    tracing::info!(force, backend = state.store.backend_name(), "数据库已初始化");
    Ok(Json(InitializeResponse {
        success: true,
        force,
        backend: state.store.backend_name(),
    }))
}
