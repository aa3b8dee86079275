// ==========================================
// 刀具磨损追踪系统 - 累计磨损引擎
// ==========================================
// 职责: 计算"自上次故障以来"的累计加工件数
// 输入: 刀具ID + 参考时间 + 生产记录集合 + 故障集合
// 输出: WearWindow（窗口边界 + 件数 + 参与记录）
// ==========================================
// 语义:
// - 故障是里程表归零点：归零点 = 严格早于参考时间的最后一次故障
// - 窗口为左开右闭区间 (start, end]
// - 与故障同一时刻的记录归入故障前窗口（不被该故障归零）
// - 同一时刻的多个故障按 (时间, id) 全序打破平局
// - 没有参考时间的记录无法排序，不参与累计
// ==========================================
// 两种模式:
// - Live: end = as_of，用于看板与刀具详情
// - HistoricalAttribution: end = 参考时间及之后的第一次故障（若有），
//   否则为参考时间本身；用于记录行"累计至故障"与导出
// ==========================================

use crate::domain::{FailureEvent, FailureView, ProductionRecord};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// 输入抽象
// ==========================================

/// 可参与磨损累计的样本（生产记录）
pub trait WearSample {
    fn sample_id(&self) -> i64;
    fn tool_id(&self) -> i64;
    fn reference_time(&self) -> Option<NaiveDateTime>;
    fn pieces(&self) -> i64;
}

/// 磨损归零点（故障）
pub trait ResetMark {
    fn mark_id(&self) -> i64;
    fn tool_id(&self) -> i64;
    fn reset_time(&self) -> NaiveDateTime;
}

impl WearSample for ProductionRecord {
    fn sample_id(&self) -> i64 {
        self.id
    }

    fn tool_id(&self) -> i64 {
        self.tool_id
    }

    fn reference_time(&self) -> Option<NaiveDateTime> {
        ProductionRecord::reference_time(self)
    }

    fn pieces(&self) -> i64 {
        self.pieces
    }
}

impl ResetMark for FailureEvent {
    fn mark_id(&self) -> i64 {
        self.id
    }

    fn tool_id(&self) -> i64 {
        self.tool_id
    }

    fn reset_time(&self) -> NaiveDateTime {
        self.failure_datetime
    }
}

impl ResetMark for FailureView {
    fn mark_id(&self) -> i64 {
        self.failure.id
    }

    fn tool_id(&self) -> i64 {
        self.failure.tool_id
    }

    fn reset_time(&self) -> NaiveDateTime {
        self.failure.failure_datetime
    }
}

// ==========================================
// 输出
// ==========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccumulationMode {
    /// 实时模式：窗口止于 as_of
    Live,
    /// 历史归属模式：窗口止于参考时间及之后的第一次故障
    HistoricalAttribution,
}

/// 磨损累计窗口
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WearWindow {
    pub tool_id: i64,
    pub mode: AccumulationMode,
    /// 左边界（不含）；None 表示从未故障，从最早时间开始
    pub start: Option<NaiveDateTime>,
    /// 右边界（含）
    pub end: NaiveDateTime,
    pub reset_failure_id: Option<i64>,
    pub closing_failure_id: Option<i64>,
    pub pieces: i64,
    pub record_count: usize,
    pub record_ids: Vec<i64>,
}

impl WearWindow {
    pub fn contains(&self, t: NaiveDateTime) -> bool {
        self.start.map_or(true, |start| t > start) && t <= self.end
    }
}

// ==========================================
// 故障定位
// ==========================================

/// 严格早于 `as_of` 的最后一次故障（归零点）
pub fn last_reset_before<F: ResetMark>(
    tool_id: i64,
    as_of: NaiveDateTime,
    failures: &[F],
) -> Option<&F> {
    failures
        .iter()
        .filter(|f| f.tool_id() == tool_id && f.reset_time() < as_of)
        .max_by_key(|f| (f.reset_time(), f.mark_id()))
}

/// 不晚于 `as_of` 的最后一次故障（含同一时刻）
pub fn last_reset_at_or_before<F: ResetMark>(
    tool_id: i64,
    as_of: NaiveDateTime,
    failures: &[F],
) -> Option<&F> {
    failures
        .iter()
        .filter(|f| f.tool_id() == tool_id && f.reset_time() <= as_of)
        .max_by_key(|f| (f.reset_time(), f.mark_id()))
}

/// `at` 及之后的第一次故障
pub fn next_reset_at_or_after<F: ResetMark>(
    tool_id: i64,
    at: NaiveDateTime,
    failures: &[F],
) -> Option<&F> {
    failures
        .iter()
        .filter(|f| f.tool_id() == tool_id && f.reset_time() >= at)
        .min_by_key(|f| (f.reset_time(), f.mark_id()))
}

// ==========================================
// 累计计算
// ==========================================

fn collect_window<R: WearSample>(
    tool_id: i64,
    mode: AccumulationMode,
    start: Option<NaiveDateTime>,
    end: NaiveDateTime,
    reset_failure_id: Option<i64>,
    closing_failure_id: Option<i64>,
    records: &[R],
) -> WearWindow {
    let mut window = WearWindow {
        tool_id,
        mode,
        start,
        end,
        reset_failure_id,
        closing_failure_id,
        pieces: 0,
        record_count: 0,
        record_ids: Vec::new(),
    };

    for record in records.iter().filter(|r| r.tool_id() == tool_id) {
        let Some(t) = record.reference_time() else {
            continue;
        };
        if window.contains(t) {
            window.pieces = window.pieces.saturating_add(record.pieces());
            window.record_count += 1;
            window.record_ids.push(record.sample_id());
        }
    }

    window
}

/// 实时模式窗口：(最近归零点, as_of]
pub fn live_window<R: WearSample, F: ResetMark>(
    tool_id: i64,
    as_of: NaiveDateTime,
    records: &[R],
    failures: &[F],
) -> WearWindow {
    let reset = last_reset_before(tool_id, as_of, failures);
    collect_window(
        tool_id,
        AccumulationMode::Live,
        reset.map(|f| f.reset_time()),
        as_of,
        reset.map(|f| f.mark_id()),
        None,
        records,
    )
}

/// 历史归属模式窗口：(参考时间前的最近归零点, 参考时间及之后的第一次故障 或 参考时间]
///
/// 之后发生的故障只在"收口"时起作用：窗口止于该故障，而不是止于当前时间
pub fn historical_window<R: WearSample, F: ResetMark>(
    tool_id: i64,
    reference: NaiveDateTime,
    records: &[R],
    failures: &[F],
) -> WearWindow {
    let reset = last_reset_before(tool_id, reference, failures);
    let closing = next_reset_at_or_after(tool_id, reference, failures);
    let end = closing.map(|f| f.reset_time()).unwrap_or(reference);

    collect_window(
        tool_id,
        AccumulationMode::HistoricalAttribution,
        reset.map(|f| f.reset_time()),
        end,
        reset.map(|f| f.mark_id()),
        closing.map(|f| f.mark_id()),
        records,
    )
}

/// 按模式计算窗口
pub fn wear_window<R: WearSample, F: ResetMark>(
    mode: AccumulationMode,
    tool_id: i64,
    reference: NaiveDateTime,
    records: &[R],
    failures: &[F],
) -> WearWindow {
    match mode {
        AccumulationMode::Live => live_window(tool_id, reference, records, failures),
        AccumulationMode::HistoricalAttribution => {
            historical_window(tool_id, reference, records, failures)
        }
    }
}

/// 件数求和，溢出时饱和到 i64::MAX
pub fn saturating_total(pieces: impl IntoIterator<Item = i64>) -> i64 {
    pieces.into_iter().fold(0i64, i64::saturating_add)
}

/// 自上次故障以来的累计件数（实时模式）
pub fn accumulated_pieces<R: WearSample, F: ResetMark>(
    tool_id: i64,
    as_of: NaiveDateTime,
    records: &[R],
    failures: &[F],
) -> i64 {
    live_window(tool_id, as_of, records, failures).pieces
}

/// 某条记录的"累计至故障"件数（历史归属模式）
///
/// 记录没有参考时间时返回 None
pub fn accumulated_until_failure<F: ResetMark>(
    record: &ProductionRecord,
    records: &[ProductionRecord],
    failures: &[F],
) -> Option<i64> {
    record
        .reference_time()
        .map(|t| historical_window(record.tool_id, t, records, failures).pieces)
}
