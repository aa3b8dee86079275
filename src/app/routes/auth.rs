// ==========================================
// 认证路由: 注册、登录
// ==========================================

use axum::extract::State;
use axum::Json;

use crate::api::{ApiResult, AuthResponse, LoginRequest, RegisterRequest};
use crate::app::routes::common::ApiJson;
use crate::app::state::AppState;

pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> ApiResult<Json<AuthResponse>> {
    state.auth_api.register(req).map(Json)
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    state.auth_api.login(req).map(Json)
}
