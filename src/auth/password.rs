// ==========================================
// 刀具磨损追踪系统 - 密码散列
// ==========================================
// 算法: Argon2id（argon2 crate 默认参数）
// 存储: PHC 字符串（含算法、参数与盐）
// ==========================================

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum PasswordError {
    #[error("密码散列失败: {0}")]
    HashFailed(String),
}

/// 生成 PHC 格式散列；盐取自随机 UUID 的 16 字节
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::encode_b64(Uuid::new_v4().as_bytes())
        .map_err(|e| PasswordError::HashFailed(e.to_string()))?;
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::HashFailed(e.to_string()))
}

/// 校验密码；散列格式损坏视为不匹配
pub fn verify_password(password: &str, phc: &str) -> bool {
    match PasswordHash::new(phc) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!(error = %e, "存储的密码散列无法解析");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("abc123!@").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("abc123!@", &hash));
        assert!(!verify_password("abc123!#", &hash));
    }

    #[test]
    fn test_salts_differ() {
        let a = hash_password("password").unwrap();
        let b = hash_password("password").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_malformed_hash_rejected() {
        assert!(!verify_password("password", "not-a-phc-string"));
    }
}
