// ==========================================
// 刀具磨损追踪系统 - 报表周期
// ==========================================
// day   = now - 1 天
// week  = now - 7 天
// month = now - 1 个日历月
// all   = Unix 纪元（NaiveDateTime 默认值）
// 未提供周期时默认 day；无法识别的周期按 all 处理
// ==========================================

use chrono::{Duration, Months, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportPeriod {
    Day,
    Week,
    Month,
    All,
}

impl ReportPeriod {
    /// 解析查询参数
    pub fn from_query(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()) {
            None => ReportPeriod::Day,
            Some(s) if s.is_empty() => ReportPeriod::Day,
            Some(s) => match s.as_str() {
                "day" => ReportPeriod::Day,
                "week" => ReportPeriod::Week,
                "month" => ReportPeriod::Month,
                _ => ReportPeriod::All,
            },
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportPeriod::Day => "day",
            ReportPeriod::Week => "week",
            ReportPeriod::Month => "month",
            ReportPeriod::All => "all",
        }
    }

    /// 周期起点（含）
    ///
    /// 起点超出可表示范围时回落到 Unix 纪元（等同 all），并记录告警
    pub fn since(&self, now: NaiveDateTime) -> NaiveDateTime {
        let start = match self {
            ReportPeriod::Day => now.checked_sub_signed(Duration::days(1)),
            ReportPeriod::Week => now.checked_sub_signed(Duration::days(7)),
            ReportPeriod::Month => now.checked_sub_months(Months::new(1)),
            ReportPeriod::All => return NaiveDateTime::default(),
        };
        start.unwrap_or_else(|| {
            tracing::warn!(period = %self, now = %now, "报表周期起点越界，按全部数据统计");
            NaiveDateTime::default()
        })
    }

    /// 创建时间是否落在周期内；缺失创建时间的数据只计入 all
    pub fn includes(&self, since: NaiveDateTime, created_at: Option<NaiveDateTime>) -> bool {
        match created_at {
            Some(t) => t >= since,
            None => *self == ReportPeriod::All,
        }
    }
}

impl fmt::Display for ReportPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
