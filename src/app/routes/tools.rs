// ==========================================
// 刀具路由
// ==========================================

use axum::extract::State;
use axum::Json;

use crate::api::{ApiResult, DeleteResponse, ToolInput, ToolWearView};
use crate::app::routes::common::{ApiJson, ApiPath, AuthenticatedUser};
use crate::app::state::AppState;
use crate::domain::datetime::now_utc;
use crate::domain::Tool;

pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<Tool>>> {
    state.tool_api.list_tools().map(Json)
}

pub async fn detail(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> ApiResult<Json<Tool>> {
    state.tool_api.get_tool(id).map(Json)
}

pub async fn create(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    ApiJson(input): ApiJson<ToolInput>,
) -> ApiResult<Json<Tool>> {
    tracing::debug!(user_id = user.sub, "创建刀具");
    state.tool_api.create_tool(input).map(Json)
}

pub async fn update(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<ToolInput>,
) -> ApiResult<Json<Tool>> {
    tracing::debug!(user_id = user.sub, tool_id = id, "更新刀具");
    state.tool_api.update_tool(id, input).map(Json)
}

pub async fn remove(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<DeleteResponse>> {
    tracing::debug!(user_id = user.sub, tool_id = id, "删除刀具");
    state.tool_api.delete_tool(id)?;
    Ok(Json(DeleteResponse { success: true, id }))
}

/// 单刀具实时磨损
pub async fn wear(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> ApiResult<Json<ToolWearView>> {
    state.tool_api.tool_wear(id, now_utc()).map(Json)
}
