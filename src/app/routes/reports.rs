// ==========================================
// 报表路由: 汇总、CSV 导出
// ==========================================

use axum::extract::State;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use crate::api::ApiResult;
use crate::app::routes::common::{ApiQuery, AuthenticatedUser, parse_opt_i64};
use crate::app::state::AppState;
use crate::domain::datetime::now_utc;
use crate::report::{CsvOptions, ExportKind, ReportPeriod, ReportSummary};

#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    pub period: Option<String>,
    pub tool_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub delimiter: Option<String>,
    pub bom: Option<String>,
}

pub async fn summary(
    State(state): State<AppState>,
    AuthenticatedUser(_): AuthenticatedUser,
    ApiQuery(query): ApiQuery<ReportQuery>,
) -> ApiResult<Json<ReportSummary>> {
    let period = ReportPeriod::from_query(query.period.as_deref());
    let tool_id = parse_opt_i64("tool_id", query.tool_id.as_deref())?;
    state.report_api.summary(period, tool_id, now_utc()).map(Json)
}

pub async fn export(
    State(state): State<AppState>,
    AuthenticatedUser(_): AuthenticatedUser,
    ApiQuery(query): ApiQuery<ReportQuery>,
) -> ApiResult<Response> {
    let period = ReportPeriod::from_query(query.period.as_deref());
    let tool_id = parse_opt_i64("tool_id", query.tool_id.as_deref())?;
    let kind = ExportKind::from_query(query.kind.as_deref());
    let options = CsvOptions::from_query(query.delimiter.as_deref(), query.bom.as_deref())?;

    let file = state
        .report_api
        .export(kind, period, tool_id, &options, now_utc())?;
    let disposition = format!("attachment; filename=\"{}\"", file.filename);
    Ok((
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (CONTENT_DISPOSITION, disposition),
        ],
        file.body,
    )
        .into_response())
}
