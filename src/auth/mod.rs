// ==========================================
// 刀具磨损追踪系统 - 认证基础设施
// ==========================================
// password: argon2 PHC 散列
// token: HMAC-SHA256 签名的 bearer token
// ==========================================

pub mod password;
pub mod token;

pub use password::{hash_password, verify_password, PasswordError};
pub use token::{Claims, TokenError, TokenSigner, DEFAULT_TOKEN_TTL_HOURS};
