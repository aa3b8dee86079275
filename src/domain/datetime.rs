// ==========================================
// 刀具磨损追踪系统 - 时间戳解析
// ==========================================
// 约定: 系统内部统一使用 UTC 的 NaiveDateTime
// 入参兼容:
// - RFC 3339（带时区偏移，转换为 UTC）
// - YYYY-MM-DDTHH:MM[:SS[.fff]]（datetime-local 控件格式）
// - YYYY-MM-DD HH:MM:SS[.fff]
// 空字符串视为缺失
// ==========================================

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// 当前 UTC 时间
pub fn now_utc() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// 解析时间戳字符串
///
/// # 返回
/// - Some(NaiveDateTime): 解析成功
/// - None: 空串或无法识别的格式
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc).naive_utc());
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

/// CSV/日志输出用的时间格式
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format("%Y-%m-%dT%H:%M:%S").to_string()
}

/// 数据库存储格式: 定宽纳秒小数，保留完整精度且文本序与时间序一致
pub fn format_storage_timestamp(ts: &NaiveDateTime) -> String {
    ts.format("%Y-%m-%dT%H:%M:%S%.9f").to_string()
}

/// serde: 可选时间戳（宽松解析）
///
/// 无法解析的非空字符串视为错误，避免静默丢失时间信息
pub mod lenient_option {
    use super::*;
    use serde::de::Error;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw {
            None => Ok(None),
            Some(s) if s.trim().is_empty() => Ok(None),
            Some(s) => parse_timestamp(&s)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid timestamp: {}", s))),
        }
    }
}
