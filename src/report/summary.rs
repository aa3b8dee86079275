// ==========================================
// 刀具磨损追踪系统 - 报表汇总
// ==========================================
// 输入: 周期、刀具过滤、全部刀具/记录/故障
// 输出: 总计 + 按刀具件数（降序，稳定排序）+ 按刀具故障数
// 说明: 周期过滤基于 created_at；刀具过滤同样作用于总计
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::{FailureView, ProductionRecord, Tool};
use crate::engine::wear::{accumulated_pieces, saturating_total};
use crate::report::period::ReportPeriod;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportTotals {
    pub total_records: i64,
    pub total_pieces: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolPieces {
    pub tool_id: i64,
    pub code: String,
    pub description: String,
    /// 周期内件数
    pub pieces: i64,
    /// 自上次故障以来的实时累计（不受周期限制）
    pub accumulated_since_failure: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureCount {
    pub tool_id: i64,
    pub failures: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub period: ReportPeriod,
    pub since: NaiveDateTime,
    pub tool_id: Option<i64>,
    pub totals: ReportTotals,
    pub pieces_by_tool: Vec<ToolPieces>,
    pub failures_by_tool: Vec<FailureCount>,
}

/// 构建汇总
pub fn build_summary(
    period: ReportPeriod,
    now: NaiveDateTime,
    tool_filter: Option<i64>,
    tools: &[Tool],
    records: &[ProductionRecord],
    failures: &[FailureView],
) -> ReportSummary {
    let since = period.since(now);
    let wanted = |tool_id: i64| tool_filter.map_or(true, |id| id == tool_id);

    let in_period: Vec<&ProductionRecord> = records
        .iter()
        .filter(|r| wanted(r.tool_id) && period.includes(since, r.created_at))
        .collect();

    let totals = ReportTotals {
        total_records: in_period.len() as i64,
        total_pieces: saturating_total(in_period.iter().map(|r| r.pieces)),
    };

    let mut pieces_by_tool: Vec<ToolPieces> = tools
        .iter()
        .filter(|t| wanted(t.id))
        .map(|t| ToolPieces {
            tool_id: t.id,
            code: t.code.clone(),
            description: t.description.clone(),
            pieces: saturating_total(
                in_period.iter().filter(|r| r.tool_id == t.id).map(|r| r.pieces),
            ),
            accumulated_since_failure: accumulated_pieces(t.id, now, records, failures),
        })
        .collect();
    // sort_by 是稳定排序：同件数保持刀具列表顺序
    pieces_by_tool.sort_by(|a, b| b.pieces.cmp(&a.pieces));

    let mut counts: BTreeMap<i64, i64> = BTreeMap::new();
    for f in failures
        .iter()
        .filter(|f| wanted(f.failure.tool_id) && period.includes(since, Some(f.failure.created_at)))
    {
        *counts.entry(f.failure.tool_id).or_insert(0) += 1;
    }
    let failures_by_tool = counts
        .into_iter()
        .map(|(tool_id, failures)| FailureCount { tool_id, failures })
        .collect();

    ReportSummary {
        period,
        since,
        tool_id: tool_filter,
        totals,
        pieces_by_tool,
        failures_by_tool,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FailureEvent, FailureSeverity, ToolStatus};
    use chrono::{Duration, NaiveDate};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 5, 20).unwrap().and_hms_opt(12, 0, 0).unwrap()
    }

    fn tool(id: i64, code: &str) -> Tool {
        Tool {
            id,
            code: code.to_string(),
            description: format!("desc {}", code),
            brand: None,
            tool_type: None,
            diameter: None,
            length: None,
            material: None,
            coating: None,
            max_rpm: None,
            cutting_edges: None,
            status: ToolStatus::Active,
            notes: None,
            created_at: now() - Duration::days(60),
            updated_at: None,
        }
    }

    fn rec(id: i64, tool_id: i64, days_ago: i64, pieces: i64) -> ProductionRecord {
        let at = now() - Duration::days(days_ago);
        ProductionRecord {
            id,
            tool_id,
            machine: "Maq-1".to_string(),
            pieces,
            entry_datetime: Some(at),
            exit_datetime: None,
            status: None,
            created_at: Some(at),
        }
    }

    fn fail(id: i64, tool_id: i64, days_ago: i64) -> FailureView {
        let at = now() - Duration::days(days_ago);
        FailureView {
            failure: FailureEvent {
                id,
                tool_id,
                operator_id: 1,
                failure_datetime: at,
                failure_type: None,
                severity: FailureSeverity::Low,
                machine: None,
                operation_type: None,
                material_processed: None,
                cutting_parameters: None,
                reason: "x".to_string(),
                action_taken: None,
                maintenance_required: false,
                created_at: at,
            },
            tool_code: None,
            tool_description: None,
            operator_name: None,
        }
    }

    fn fixture() -> (Vec<Tool>, Vec<ProductionRecord>, Vec<FailureView>) {
        let tools = vec![tool(1, "T-1"), tool(2, "T-2"), tool(3, "T-3")];
        let records = vec![
            rec(1, 1, 1, 100),
            rec(2, 2, 3, 40),
            rec(3, 1, 10, 500),
            rec(4, 2, 6, 60),
        ];
        let failures = vec![fail(1, 1, 2), fail(2, 2, 20)];
        (tools, records, failures)
    }

    #[test]
    fn test_week_totals_sum_last_seven_days() {
        let (tools, records, failures) = fixture();
        let summary = build_summary(ReportPeriod::Week, now(), None, &tools, &records, &failures);
        assert_eq!(summary.totals.total_records, 3);
        assert_eq!(summary.totals.total_pieces, 200);
        assert_eq!(summary.failures_by_tool, vec![FailureCount { tool_id: 1, failures: 1 }]);
    }

    #[test]
    fn test_pieces_by_tool_sorted_stable() {
        let (tools, records, failures) = fixture();
        let summary = build_summary(ReportPeriod::Week, now(), None, &tools, &records, &failures);
        let order: Vec<i64> = summary.pieces_by_tool.iter().map(|p| p.tool_id).collect();
        // T-1 与 T-2 同为 100 件，保持刀具列表顺序；T-3 无记录排最后
        assert_eq!(order, vec![1, 2, 3]);

        let t1 = &summary.pieces_by_tool[0];
        // 故障在 2 天前，只有 1 天前的 100 件计入累计
        assert_eq!(t1.accumulated_since_failure, 100);
        assert_eq!(summary.pieces_by_tool[1].accumulated_since_failure, 100);
    }

    #[test]
    fn test_tool_filter_applies_to_totals() {
        let (tools, records, failures) = fixture();
        let summary = build_summary(ReportPeriod::All, now(), Some(2), &tools, &records, &failures);
        assert_eq!(summary.totals.total_pieces, 100);
        assert_eq!(summary.pieces_by_tool.len(), 1);
        assert_eq!(summary.failures_by_tool, vec![FailureCount { tool_id: 2, failures: 1 }]);
    }
}
