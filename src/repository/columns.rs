// 时间列读写辅助：数据库中统一存 UTC 文本

use crate::domain::datetime::{format_storage_timestamp, parse_timestamp};
use chrono::NaiveDateTime;
use rusqlite::Row;

pub(crate) fn ts_to_db(ts: &NaiveDateTime) -> String {
    format_storage_timestamp(ts)
}

pub(crate) fn opt_ts_to_db(ts: &Option<NaiveDateTime>) -> Option<String> {
    ts.as_ref().map(format_storage_timestamp)
}

/// 可空时间列；无法解析的值按缺失处理
pub(crate) fn opt_ts(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<NaiveDateTime>> {
    Ok(row
        .get::<_, Option<String>>(idx)?
        .as_deref()
        .and_then(parse_timestamp))
}

/// 非空时间列；无法解析时回落到 Unix 纪元
pub(crate) fn ts(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDateTime> {
    Ok(opt_ts(row, idx)?.unwrap_or_default())
}
