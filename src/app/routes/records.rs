// ==========================================
// 生产记录路由
// ==========================================

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::api::{ApiResult, AttributedRecord, DeleteResponse, RecordInput};
use crate::app::routes::common::{ApiJson, ApiPath, ApiQuery, AuthenticatedUser, parse_opt_i64};
use crate::app::state::AppState;
use crate::domain::{ProductionRecord, RecordFilter};

#[derive(Debug, Default, Deserialize)]
pub struct RecordQuery {
    pub id: Option<String>,
    pub machine: Option<String>,
    pub tool_id: Option<String>,
}

impl RecordQuery {
    fn to_filter(&self) -> ApiResult<RecordFilter> {
        Ok(RecordFilter {
            id: parse_opt_i64("id", self.id.as_deref())?,
            tool_id: parse_opt_i64("tool_id", self.tool_id.as_deref())?,
            machine: self
                .machine
                .as_deref()
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(str::to_string),
        })
    }
}

pub async fn list(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<RecordQuery>,
) -> ApiResult<Json<Vec<ProductionRecord>>> {
    let filter = query.to_filter()?;
    state.record_api.list_records(&filter).map(Json)
}

#[derive(Debug, Default, Deserialize)]
pub struct AttributedQuery {
    pub threshold: Option<String>,
}

pub async fn attributed(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<AttributedQuery>,
) -> ApiResult<Json<Vec<AttributedRecord>>> {
    let threshold = parse_opt_i64("threshold", query.threshold.as_deref())?;
    state.record_api.list_attributed(threshold).map(Json)
}

pub async fn create(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    ApiJson(input): ApiJson<RecordInput>,
) -> ApiResult<Json<ProductionRecord>> {
    tracing::debug!(user_id = user.sub, "新增生产记录");
    state.record_api.create_record(input).map(Json)
}

pub async fn remove(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<DeleteResponse>> {
    tracing::debug!(user_id = user.sub, record_id = id, "删除生产记录");
    state.record_api.delete_record(id).map(Json)
}
