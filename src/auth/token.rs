// ==========================================
// 刀具磨损追踪系统 - Bearer Token
// ==========================================
// 格式: base64url(JSON claims) "." base64url(HMAC-SHA256(payload 部分))
// 有效期: 默认 8 小时
// ==========================================

use crate::domain::{User, UserRole};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 8;

/// 防止超长输入
const MAX_TOKEN_LEN: usize = 4096;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TokenError {
    #[error("token 格式错误")]
    Malformed,
    #[error("token 签名无效")]
    BadSignature,
    #[error("token 已过期")]
    Expired,
    #[error("签名密钥无效")]
    InvalidKey,
}

/// token 负载
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// 用户 id
    pub sub: i64,
    pub name: String,
    pub cpf: String,
    pub role: UserRole,
    /// 过期时间（Unix 秒）
    pub exp: i64,
    /// 签发时间（Unix 秒）
    pub iat: i64,
}

#[derive(Clone)]
pub struct TokenSigner {
    secret: Vec<u8>,
    ttl: Duration,
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner")
            .field("ttl_hours", &self.ttl.num_hours())
            .finish_non_exhaustive()
    }
}

impl TokenSigner {
    pub fn new(secret: impl Into<Vec<u8>>, ttl_hours: i64) -> Self {
        Self {
            secret: secret.into(),
            ttl: Duration::hours(ttl_hours),
        }
    }

    fn mac(&self) -> Result<HmacSha256, TokenError> {
        HmacSha256::new_from_slice(&self.secret).map_err(|_| TokenError::InvalidKey)
    }

    /// 为用户签发 token
    pub fn issue(&self, user: &User) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id,
            name: user.name.clone(),
            cpf: user.cpf.clone(),
            role: user.role,
            exp: (now + self.ttl).timestamp(),
            iat: now.timestamp(),
        };
        self.sign(&claims)
    }

    pub fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        let payload = serde_json::to_vec(claims).map_err(|_| TokenError::Malformed)?;
        let payload_part = URL_SAFE_NO_PAD.encode(payload);
        let mut mac = self.mac()?;
        mac.update(payload_part.as_bytes());
        let sig_part = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        Ok(format!("{}.{}", payload_part, sig_part))
    }

    /// 校验签名与有效期，返回负载
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        if token.len() > MAX_TOKEN_LEN {
            return Err(TokenError::Malformed);
        }
        let (payload_part, sig_part) = token.split_once('.').ok_or(TokenError::Malformed)?;

        let expected = URL_SAFE_NO_PAD
            .decode(sig_part)
            .map_err(|_| TokenError::Malformed)?;
        let mut mac = self.mac()?;
        mac.update(payload_part.as_bytes());
        mac.verify_slice(&expected)
            .map_err(|_| TokenError::BadSignature)?;

        let payload = URL_SAFE_NO_PAD
            .decode(payload_part)
            .map_err(|_| TokenError::Malformed)?;
        let claims: Claims = serde_json::from_slice(&payload).map_err(|_| TokenError::Malformed)?;

        if claims.exp <= Utc::now().timestamp() {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::datetime::now_utc;

    fn user() -> User {
        User {
            id: 3,
            name: "Admin".to_string(),
            cpf: "52998224725".to_string(),
            password_hash: String::new(),
            role: UserRole::Owner,
            created_at: now_utc(),
        }
    }

    #[test]
    fn test_issue_and_verify() {
        let signer = TokenSigner::new("segredo", DEFAULT_TOKEN_TTL_HOURS);
        let token = signer.issue(&user()).unwrap();
        let claims = signer.verify(&token).unwrap();
        assert_eq!(claims.sub, 3);
        assert_eq!(claims.role, UserRole::Owner);
        assert_eq!(claims.exp - claims.iat, 8 * 3600);
    }

    #[test]
    fn test_rejects_other_secret_and_tampering() {
        let signer = TokenSigner::new("segredo", 8);
        let token = signer.issue(&user()).unwrap();

        let other = TokenSigner::new("outro", 8);
        assert_eq!(other.verify(&token), Err(TokenError::BadSignature));

        let (payload, sig) = token.split_once('.').unwrap();
        let mut forged = Claims {
            role: UserRole::Owner,
            ..signer.verify(&token).unwrap()
        };
        forged.sub = 99;
        let forged_payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&forged).unwrap());
        assert_ne!(forged_payload, payload);
        assert_eq!(
            signer.verify(&format!("{}.{}", forged_payload, sig)),
            Err(TokenError::BadSignature)
        );
        assert_eq!(signer.verify("garbage"), Err(TokenError::Malformed));
    }

    #[test]
    fn test_expired_token() {
        let signer = TokenSigner::new("segredo", 8);
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: 1,
            name: "x".to_string(),
            cpf: "52998224725".to_string(),
            role: UserRole::Operator,
            exp: now - 1,
            iat: now - 10,
        };
        let token = signer.sign(&claims).unwrap();
        assert_eq!(signer.verify(&token), Err(TokenError::Expired));
    }
}
