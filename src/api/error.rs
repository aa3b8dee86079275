// ==========================================
// 刀具磨损追踪系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换Repository错误为用户可读的错误消息
// HTTP 映射见 app::routes::common
// ==========================================

use crate::i18n::{t, t_with_args};
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 客户端错误（400）
    // ==========================================
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    ValidationError(String),

    /// 唯一约束、外键引用等
    #[error("{0}")]
    BusinessRuleViolation(String),

    // ==========================================
    // 认证错误（401）
    // ==========================================
    #[error("{0}")]
    Unauthorized(String),

    // ==========================================
    // 资源不存在（404）
    // ==========================================
    #[error("{0}")]
    NotFound(String),

    // ==========================================
    // 数据访问错误（500）
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// 统一的认证失败（不区分账号不存在与密码错误）
    pub fn invalid_credentials() -> Self {
        ApiError::Unauthorized(t("auth.invalid_credentials"))
    }

    pub fn not_found(entity_key: &str, id: i64) -> Self {
        ApiError::NotFound(t_with_args(
            "error.not_found",
            &[("entity", &t(entity_key)), ("id", &id.to_string())],
        ))
    }

    /// 是否为服务端错误（对外只返回通用消息）
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            ApiError::DatabaseError(_)
                | ApiError::DatabaseConnectionError(_)
                | ApiError::InternalError(_)
                | ApiError::Other(_)
        )
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => ApiError::NotFound(t_with_args(
                "error.not_found",
                &[("entity", &entity), ("id", &id)],
            )),
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                tracing::debug!(detail = %msg, "唯一约束违反");
                ApiError::BusinessRuleViolation(t("error.duplicate"))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                tracing::debug!(detail = %msg, "外键约束违反");
                ApiError::BusinessRuleViolation(t("error.reference"))
            }
            RepositoryError::BusinessRuleViolation(msg) => ApiError::BusinessRuleViolation(msg),
            RepositoryError::ValidationError(msg) => ApiError::ValidationError(msg),
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_conversion() {
        let api_err: ApiError = RepositoryError::NotFound {
            entity: "Tool".to_string(),
            id: "42".to_string(),
        }
        .into();
        match api_err {
            ApiError::NotFound(msg) => assert!(msg.contains("42")),
            other => panic!("Expected NotFound, got {:?}", other),
        }

        let api_err: ApiError =
            RepositoryError::UniqueConstraintViolation("tools.code".to_string()).into();
        assert!(matches!(api_err, ApiError::BusinessRuleViolation(_)));

        let api_err: ApiError = RepositoryError::LockError("poisoned".to_string()).into();
        assert!(api_err.is_server_error());
    }
}
