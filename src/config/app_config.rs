// ==========================================
// 刀具磨损追踪系统 - 运行配置
// ==========================================
// 来源: 环境变量（部分键有兼容别名）
// 布尔值接受 1/true/yes（不区分大小写）
// ==========================================

use std::path::PathBuf;

use thiserror::Error;

use crate::auth::DEFAULT_TOKEN_TTL_HOURS;
use crate::engine::SeverityThresholds;
use crate::logging::LogFormat;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3001";
pub const DEFAULT_LOCALE: &str = "pt-BR";
pub const DEFAULT_STREAM_BUFFER: usize = 64;
pub const DEV_TOKEN_SECRET: &str = "tool-wear-dev-secret";

// ==========================================
// 配置键
// ==========================================
pub mod env_keys {
    pub const BIND: &str = "TOOL_WEAR_BIND";
    pub const PORT: &str = "PORT";
    pub const DB_PATH: &str = "TOOL_WEAR_DB_PATH";
    pub const IN_MEMORY: &str = "TOOL_WEAR_IN_MEMORY";
    pub const DEV_NO_DB: &str = "DEV_NO_DB";
    pub const TOKEN_SECRET: &str = "TOOL_WEAR_TOKEN_SECRET";
    pub const JWT_SECRET: &str = "JWT_SECRET";
    pub const TOKEN_TTL_HOURS: &str = "TOOL_WEAR_TOKEN_TTL_HOURS";
    pub const WARNING_THRESHOLD: &str = "TOOL_WEAR_WARNING_THRESHOLD";
    pub const PER_RECORD_THRESHOLD: &str = "TOOL_WEAR_PER_RECORD_THRESHOLD";
    pub const LOG_FORMAT: &str = "TOOL_WEAR_LOG_FORMAT";
    pub const LOCALE: &str = "TOOL_WEAR_LOCALE";
    pub const STREAM_BUFFER: &str = "TOOL_WEAR_STREAM_BUFFER";
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("配置项 {key} 取值无效: {value}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub db_path: PathBuf,
    pub in_memory: bool,
    pub token_secret: String,
    pub token_ttl_hours: i64,
    pub thresholds: SeverityThresholds,
    pub log_format: LogFormat,
    pub locale: String,
    pub stream_buffer: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            db_path: default_db_path(),
            in_memory: false,
            token_secret: DEV_TOKEN_SECRET.to_string(),
            token_ttl_hours: DEFAULT_TOKEN_TTL_HOURS,
            thresholds: SeverityThresholds::default(),
            log_format: LogFormat::Pretty,
            locale: DEFAULT_LOCALE.to_string(),
            stream_buffer: DEFAULT_STREAM_BUFFER,
        }
    }
}

impl AppConfig {
    /// 从进程环境变量加载
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意键值来源加载（测试注入用）
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let bind_addr = match (get(env_keys::BIND), get(env_keys::PORT)) {
            (Some(bind), _) => bind,
            (None, Some(port)) => {
                let port: u16 = parse_value(env_keys::PORT, &port)?;
                format!("0.0.0.0:{}", port)
            }
            (None, None) => defaults.bind_addr,
        };

        let db_path = get(env_keys::DB_PATH).map(PathBuf::from).unwrap_or(defaults.db_path);

        let in_memory = get(env_keys::IN_MEMORY)
            .or_else(|| get(env_keys::DEV_NO_DB))
            .map(|v| parse_bool(&v))
            .unwrap_or(false);

        let token_secret = match get(env_keys::TOKEN_SECRET).or_else(|| get(env_keys::JWT_SECRET)) {
            Some(secret) => secret,
            None => {
                tracing::warn!("未配置 {}，使用开发用默认密钥", env_keys::TOKEN_SECRET);
                defaults.token_secret
            }
        };

        let token_ttl_hours = match get(env_keys::TOKEN_TTL_HOURS) {
            Some(v) => parse_value(env_keys::TOKEN_TTL_HOURS, &v)?,
            None => defaults.token_ttl_hours,
        };

        let warning = get(env_keys::WARNING_THRESHOLD)
            .map(|v| parse_value(env_keys::WARNING_THRESHOLD, &v))
            .transpose()?;
        let per_record = get(env_keys::PER_RECORD_THRESHOLD)
            .map(|v| parse_value(env_keys::PER_RECORD_THRESHOLD, &v))
            .transpose()?;

        let log_format = match get(env_keys::LOG_FORMAT) {
            Some(v) => LogFormat::parse(&v).ok_or(ConfigError::InvalidValue {
                key: env_keys::LOG_FORMAT,
                value: v,
            })?,
            None => defaults.log_format,
        };

        let stream_buffer = match get(env_keys::STREAM_BUFFER) {
            Some(v) => parse_value(env_keys::STREAM_BUFFER, &v)?,
            None => defaults.stream_buffer,
        };

        Ok(Self {
            bind_addr,
            db_path,
            in_memory,
            token_secret,
            token_ttl_hours,
            thresholds: defaults.thresholds.with_overrides(warning, per_record),
            log_format,
            locale: get(env_keys::LOCALE).unwrap_or(defaults.locale),
            stream_buffer,
        })
    }
}

/// 默认数据库路径: <用户数据目录>/tool_wear/tool_wear.db，取不到时回退到当前目录
pub fn default_db_path() -> PathBuf {
    match dirs::data_dir() {
        Some(dir) => dir.join("tool_wear").join("tool_wear.db"),
        None => PathBuf::from("./tool_wear.db"),
    }
}

pub fn parse_bool(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes")
}

fn parse_value<T: std::str::FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let cfg = load(&[]).unwrap();
        assert_eq!(cfg.bind_addr, DEFAULT_BIND_ADDR);
        assert!(!cfg.in_memory);
        assert_eq!(cfg.token_secret, DEV_TOKEN_SECRET);
        assert_eq!(cfg.token_ttl_hours, 8);
        assert_eq!(cfg.thresholds, SeverityThresholds::default());
        assert_eq!(cfg.locale, "pt-BR");
        assert_eq!(cfg.stream_buffer, 64);
        assert!(cfg.db_path.ends_with("tool_wear.db"));
    }

    #[test]
    fn test_aliases_and_port() {
        let cfg = load(&[("PORT", "8080"), ("DEV_NO_DB", "yes"), ("JWT_SECRET", "s3")]).unwrap();
        assert_eq!(cfg.bind_addr, "0.0.0.0:8080");
        assert!(cfg.in_memory);
        assert_eq!(cfg.token_secret, "s3");

        let cfg = load(&[("TOOL_WEAR_BIND", "127.0.0.1:9000"), ("PORT", "8080")]).unwrap();
        assert_eq!(cfg.bind_addr, "127.0.0.1:9000");
    }

    #[test]
    fn test_thresholds_and_format() {
        let cfg = load(&[
            ("TOOL_WEAR_WARNING_THRESHOLD", "300"),
            ("TOOL_WEAR_LOG_FORMAT", "json"),
        ])
        .unwrap();
        assert_eq!(cfg.thresholds.warning_threshold, 300);
        assert_eq!(cfg.thresholds.per_record_threshold, 1000);
        assert_eq!(cfg.log_format, LogFormat::Json);
    }

    #[test]
    fn test_invalid_values() {
        assert_eq!(
            load(&[("TOOL_WEAR_TOKEN_TTL_HOURS", "eight")]).unwrap_err(),
            ConfigError::InvalidValue {
                key: env_keys::TOKEN_TTL_HOURS,
                value: "eight".to_string()
            }
        );
        assert!(load(&[("TOOL_WEAR_LOG_FORMAT", "xml")]).is_err());
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("TRUE"));
        assert!(parse_bool("1"));
        assert!(!parse_bool("0"));
        assert!(!parse_bool("on"));
    }
}
