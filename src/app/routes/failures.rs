// ==========================================
// 刀具故障路由
// ==========================================

use axum::extract::State;
use axum::Json;

use crate::api::{ApiResult, FailureInput};
use crate::app::routes::common::{ApiJson, AuthenticatedUser};
use crate::app::state::AppState;
use crate::domain::FailureView;

pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<FailureView>>> {
    state.failure_api.list_failures().map(Json)
}

/// 操作员取自 token
pub async fn create(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    ApiJson(input): ApiJson<FailureInput>,
) -> ApiResult<Json<FailureView>> {
    state.failure_api.create_failure(input, &user).map(Json)
}
