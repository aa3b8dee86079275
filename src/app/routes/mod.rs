// ==========================================
// 刀具磨损追踪系统 - HTTP 路由
// ==========================================
// 职责: 将 API 层暴露为 JSON/SSE/CSV 接口
// 认证: 写操作与报表需要 bearer token（AuthenticatedUser 提取器）
// ==========================================

pub mod auth;
pub mod common;
pub mod dashboard;
pub mod failures;
pub mod records;
pub mod reports;
pub mod stream;
pub mod system;
pub mod tools;

use axum::middleware::from_fn;
use axum::routing::{get, post};
use axum::Router;

use crate::app::state::AppState;

pub use common::{AuthenticatedUser, ErrorBody};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(system::health))
        .route("/api/initialize-db", get(system::initialize_db))
        .route("/api/register", post(auth::register))
        .route("/api/login", post(auth::login))
        .route("/api/tools", get(tools::list).post(tools::create))
        .route(
            "/api/tools/:id",
            get(tools::detail).put(tools::update).delete(tools::remove),
        )
        .route("/api/tools/:id/wear", get(tools::wear))
        .route("/api/records", get(records::list).post(records::create))
        .route("/api/records/attributed", get(records::attributed))
        .route("/api/records/:id", axum::routing::delete(records::remove))
        .route("/api/failures", get(failures::list).post(failures::create))
        .route("/api/dashboard", get(dashboard::dashboard))
        .route("/api/reports/summary", get(reports::summary))
        .route("/api/reports/export", get(reports::export))
        .route("/api/stream", get(stream::stream))
        .layer(from_fn(common::request_span))
        .with_state(state)
}
