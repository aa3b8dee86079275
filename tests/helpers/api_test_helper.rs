// ==========================================
// API集成测试辅助工具
// ==========================================
// 职责: 装配 AppState（临时 SQLite）并提供已登录操作员
// ==========================================
#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use tool_wear_tracker::api::{AuthResponse, RegisterRequest};
use tool_wear_tracker::app::{build_router, open_store, AppState};
use tool_wear_tracker::config::AppConfig;

pub const OPERATOR_CPF: &str = "12345678909";
pub const OPERATOR_PASSWORD: &str = "abc123!@";

/// API测试环境
pub struct ApiTestEnv {
    _dir: Option<TempDir>,
    pub state: AppState,
    pub token: String,
}

impl ApiTestEnv {
    /// 临时 SQLite 库 + 已注册操作员
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("无法创建临时目录");
        let config = AppConfig {
            db_path: dir.path().join("api_test.db"),
            token_secret: "api-test-secret".to_string(),
            ..AppConfig::default()
        };
        Self::with_config(config, Some(dir))
    }

    /// 内存存储（演示数据）+ 已注册操作员
    pub fn in_memory() -> Self {
        let config = AppConfig {
            in_memory: true,
            token_secret: "api-test-secret".to_string(),
            ..AppConfig::default()
        };
        Self::with_config(config, None)
    }

    fn with_config(config: AppConfig, dir: Option<TempDir>) -> Self {
        let store = open_store(&config).expect("无法打开存储");
        let state = AppState::new(config, store);
        let AuthResponse { token, .. } = state
            .auth_api
            .register(RegisterRequest {
                name: Some("Operador Teste".to_string()),
                cpf: Some(OPERATOR_CPF.to_string()),
                password: Some(OPERATOR_PASSWORD.to_string()),
            })
            .expect("注册测试操作员失败");
        Self {
            _dir: dir,
            state,
            token,
        }
    }

    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }

    /// 发送请求并返回状态码与响应体
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        auth: bool,
        body: Option<Value>,
    ) -> (StatusCode, Vec<u8>, axum::http::HeaderMap) {
        let mut builder = Request::builder().method(method).uri(uri);
        if auth {
            builder = builder.header(header::AUTHORIZATION, self.bearer());
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("请求构造失败");

        let response = self.router().oneshot(request).await.expect("请求失败");
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("读取响应体失败");
        (status, bytes.to_vec(), headers)
    }

    pub async fn send_json(
        &self,
        method: Method,
        uri: &str,
        auth: bool,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let (status, bytes, _) = self.send(method, uri, auth, body).await;
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("响应不是 JSON")
        };
        (status, json)
    }
}
