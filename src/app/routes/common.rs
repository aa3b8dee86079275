// ==========================================
// 刀具磨损追踪系统 - 路由公共部分
// ==========================================
// 职责: 错误映射、请求 span、认证提取器、请求体/路径/查询参数提取与解析
// ==========================================

use async_trait::async_trait;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, MatchedPath, Path, Query, Request};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::Instrument;

use crate::api::ApiError;
use crate::app::state::AppState;
use crate::auth::Claims;
use crate::i18n::{t, t_with_args};

/// 错误响应体
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: &'static str,
}

fn error_code(err: &ApiError) -> &'static str {
    match err {
        ApiError::InvalidInput(_) => "INVALID_INPUT",
        ApiError::ValidationError(_) => "VALIDATION_ERROR",
        ApiError::BusinessRuleViolation(_) => "BUSINESS_RULE_VIOLATION",
        ApiError::Unauthorized(_) => "UNAUTHORIZED",
        ApiError::NotFound(_) => "NOT_FOUND",
        ApiError::DatabaseError(_) => "DATABASE_ERROR",
        ApiError::DatabaseConnectionError(_) => "DATABASE_CONNECTION_ERROR",
        ApiError::InternalError(_) => "INTERNAL_ERROR",
        ApiError::Other(_) => "OTHER_ERROR",
    }
}

pub fn status_for(err: &ApiError) -> StatusCode {
    match err {
        ApiError::InvalidInput(_)
        | ApiError::ValidationError(_)
        | ApiError::BusinessRuleViolation(_) => StatusCode::BAD_REQUEST,
        ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        ApiError::DatabaseError(_)
        | ApiError::DatabaseConnectionError(_)
        | ApiError::InternalError(_)
        | ApiError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self);
        // 服务端错误细节只进日志
        let message = if self.is_server_error() {
            tracing::error!(error = %self, "请求处理失败");
            t("common.internal_error")
        } else {
            tracing::warn!(status = status.as_u16(), error = %self, "请求被拒绝");
            self.to_string()
        };
        let body = ErrorBody {
            error: message,
            code: error_code(&self),
        };
        (status, Json(body)).into_response()
    }
}

/// 每个请求一个 http.request span
pub async fn request_span(req: Request, next: Next) -> Response {
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());
    let span = tracing::info_span!("http.request", method = %req.method(), route = %route);

    async move {
        let response = next.run(req).await;
        tracing::debug!(status = response.status().as_u16(), "请求完成");
        response
    }
    .instrument(span)
    .await
}

// ==========================================
// AuthenticatedUser - bearer token 提取器
// ==========================================
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Claims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ApiError::Unauthorized(t("auth.unauthorized")))?;
        let claims = state.auth_api.authenticate(token)?;
        Ok(AuthenticatedUser(claims))
    }
}

// ==========================================
// 请求提取器: axum 拒绝统一转为 400 {error, code}
// ==========================================

fn malformed_request(detail: String) -> ApiError {
    ApiError::InvalidInput(t_with_args("validation.malformed_request", &[("detail", &detail)]))
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        malformed_request(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        malformed_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        malformed_request(rejection.body_text())
    }
}

/// JSON 请求体
#[derive(Debug)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(ApiJson(value))
    }
}

/// 路径参数
#[derive(Debug)]
pub struct ApiPath<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state).await?;
        Ok(ApiPath(value))
    }
}

/// 查询参数
#[derive(Debug)]
pub struct ApiQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(ApiQuery(value))
    }
}

// ==========================================
// 查询参数解析
// ==========================================

/// 可选整数参数；空串视为缺省，非数字返回 400
pub fn parse_opt_i64(name: &str, raw: Option<&str>) -> Result<Option<i64>, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => s
            .parse()
            .map(Some)
            .map_err(|_| ApiError::InvalidInput(format!("{}: {}", name, s))),
    }
}

/// 可选布尔参数，接受 1/true/yes
pub fn parse_flag(raw: Option<&str>) -> bool {
    raw.map(crate::config::parse_bool).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(&ApiError::ValidationError("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(&ApiError::Unauthorized("x".into())), StatusCode::UNAUTHORIZED);
        assert_eq!(status_for(&ApiError::NotFound("x".into())), StatusCode::NOT_FOUND);
        assert_eq!(
            status_for(&ApiError::DatabaseError("disk".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_query_parsing() {
        assert_eq!(parse_opt_i64("tool_id", None).unwrap(), None);
        assert_eq!(parse_opt_i64("tool_id", Some(" ")).unwrap(), None);
        assert_eq!(parse_opt_i64("tool_id", Some("7")).unwrap(), Some(7));
        assert!(parse_opt_i64("tool_id", Some("x")).is_err());
        assert!(parse_flag(Some("true")));
        assert!(!parse_flag(None));
    }
}
