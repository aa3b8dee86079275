// ==========================================
// 刀具磨损追踪系统 - 用户领域模型
// ==========================================
// 不变量: cpf 为 11 位数字且通过双校验位（mod-11）
// ==========================================

use crate::domain::types::UserRole;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub cpf: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: UserRole,
    pub created_at: NaiveDateTime,
}

/// 对外暴露的用户信息（不含密码散列）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: i64,
    pub name: String,
    pub cpf: String,
    pub role: UserRole,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            cpf: user.cpf.clone(),
            role: user.role,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub name: String,
    pub cpf: String,
    pub password_hash: String,
    pub role: UserRole,
}
