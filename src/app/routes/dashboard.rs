// ==========================================
// 看板路由
// ==========================================

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::api::{ApiResult, DashboardView};
use crate::app::routes::common::{ApiQuery, parse_opt_i64};
use crate::app::state::AppState;
use crate::domain::datetime::now_utc;

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub warning_threshold: Option<String>,
    pub per_record_threshold: Option<String>,
}

/// 请求参数可覆盖配置阈值
pub async fn dashboard(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<DashboardQuery>,
) -> ApiResult<Json<DashboardView>> {
    let thresholds = state.dashboard_api.thresholds().with_overrides(
        parse_opt_i64("warning_threshold", query.warning_threshold.as_deref())?,
        parse_opt_i64("per_record_threshold", query.per_record_threshold.as_deref())?,
    );
    state.dashboard_api.dashboard(now_utc(), thresholds).map(Json)
}
