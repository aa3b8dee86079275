// ==========================================
// 刀具磨损追踪系统 - 认证 API
// ==========================================
// 职责: 注册、登录、bearer token 校验
// 红线: 登录失败统一返回同一条消息，不暴露账号是否存在
// ==========================================

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::{require_text, validate_cpf, validate_name, validate_password};
use crate::auth::password::{hash_password, verify_password};
use crate::auth::token::{Claims, TokenSigner};
use crate::domain::{NewUser, User, UserRole, UserSummary};
use crate::i18n::t;
use crate::repository::ShopStore;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub cpf: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    pub cpf: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub user: UserSummary,
    pub token: String,
}

// ==========================================
// AuthApi - 认证 API
// ==========================================
pub struct AuthApi {
    store: Arc<dyn ShopStore>,
    signer: TokenSigner,
}

impl AuthApi {
    pub fn new(store: Arc<dyn ShopStore>, signer: TokenSigner) -> Self {
        Self { store, signer }
    }

    /// 注册操作员账号
    ///
    /// 校验顺序: 必填 → 姓名 → CPF → 密码 → CPF 重复
    pub fn register(&self, req: RegisterRequest) -> ApiResult<AuthResponse> {
        let (name, cpf, password) = match (&req.name, &req.cpf, &req.password) {
            (Some(n), Some(c), Some(p)) if !n.is_empty() && !c.is_empty() && !p.is_empty() => {
                (n.as_str(), c.as_str(), p.as_str())
            }
            _ => return Err(ApiError::InvalidInput(t("validation.register_required"))),
        };

        validate_name(name)?;
        let cpf = validate_cpf(cpf)?;
        validate_password(password)?;

        if self.store.find_user_by_cpf(&cpf)?.is_some() {
            return Err(ApiError::BusinessRuleViolation(t("auth.cpf_taken")));
        }

        let password_hash =
            hash_password(password).map_err(|e| ApiError::InternalError(e.to_string()))?;
        let user = self.store.insert_user(&NewUser {
            name: name.trim().to_string(),
            cpf,
            password_hash,
            role: UserRole::Operator,
        })?;

        tracing::info!(user_id = user.id, "新用户注册");
        self.respond(&user)
    }

    /// 登录
    pub fn login(&self, req: LoginRequest) -> ApiResult<AuthResponse> {
        let cpf = require_text(req.cpf.as_deref(), "validation.cpf_required")?;
        let password = match req.password.as_deref() {
            None | Some("") => return Err(ApiError::InvalidInput(t("validation.password_required"))),
            Some(p) if p.trim().is_empty() => {
                return Err(ApiError::InvalidInput(t("validation.password_blank")))
            }
            Some(p) => p,
        };
        let cpf = validate_cpf(&cpf)?;

        let user = match self.store.find_user_by_cpf(&cpf)? {
            Some(user) if verify_password(password, &user.password_hash) => user,
            _ => {
                tracing::warn!("登录失败");
                return Err(ApiError::invalid_credentials());
            }
        };

        tracing::info!(user_id = user.id, "用户登录");
        self.respond(&user)
    }

    /// 校验 bearer token；任何失败都视为未认证
    pub fn authenticate(&self, token: &str) -> ApiResult<Claims> {
        self.signer.verify(token).map_err(|e| {
            tracing::debug!(error = %e, "token 校验失败");
            ApiError::Unauthorized(t("auth.unauthorized"))
        })
    }

    fn respond(&self, user: &User) -> ApiResult<AuthResponse> {
        let token = self
            .signer
            .issue(user)
            .map_err(|e| ApiError::InternalError(e.to_string()))?;
        Ok(AuthResponse {
            user: UserSummary::from(user),
            token,
        })
    }
}
