// ==========================================
// 刀具磨损追踪系统 - 严重度判定引擎
// ==========================================
// 职责: 基于实时累计磨损与故障状态判定刀具严重度，生成告警
// 输入: 累计磨损窗口 + 阈值配置
// 输出: ToolWearStatus + Alert
// ==========================================
// 规则:
// - Critical: 最近一次故障（不晚于当前）之后没有任何生产记录
// - Warning: 实时累计件数 ≥ warning_threshold
// - 否则 Ok
// 说明: 每次请求重新计算，不持久化；前端"确认告警"只影响界面
// ==========================================

use crate::domain::datetime::format_timestamp;
use crate::domain::{FailureView, ProductionRecord, Tool, ToolSeverity};
use crate::engine::wear::{last_reset_at_or_before, live_window, ResetMark, WearSample};
use crate::i18n::t_with_args;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// 默认累计告警阈值（件）
pub const DEFAULT_WARNING_THRESHOLD: i64 = 5_000;

/// 默认单条记录高产量告警阈值（件）
pub const DEFAULT_PER_RECORD_THRESHOLD: i64 = 1_000;

// ==========================================
// SeverityThresholds - 阈值配置
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityThresholds {
    pub warning_threshold: i64,
    pub per_record_threshold: i64,
}

impl Default for SeverityThresholds {
    fn default() -> Self {
        Self {
            warning_threshold: DEFAULT_WARNING_THRESHOLD,
            per_record_threshold: DEFAULT_PER_RECORD_THRESHOLD,
        }
    }
}

impl SeverityThresholds {
    /// 用请求参数覆盖（None 保持原值）
    pub fn with_overrides(self, warning: Option<i64>, per_record: Option<i64>) -> Self {
        Self {
            warning_threshold: warning.unwrap_or(self.warning_threshold),
            per_record_threshold: per_record.unwrap_or(self.per_record_threshold),
        }
    }
}

// ==========================================
// ToolWearStatus - 单把刀具的实时磨损状态
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolWearStatus {
    pub tool_id: i64,
    pub accumulated_pieces: i64,
    pub severity: ToolSeverity,
    pub last_failure_id: Option<i64>,
    pub last_failure_at: Option<NaiveDateTime>,
    /// 最近故障之后尚无生产
    pub in_failed_state: bool,
}

/// 判定单把刀具的严重度
pub fn classify_tool<R: WearSample, F: ResetMark>(
    tool_id: i64,
    now: NaiveDateTime,
    records: &[R],
    failures: &[F],
    thresholds: &SeverityThresholds,
) -> ToolWearStatus {
    let window = live_window(tool_id, now, records, failures);
    let last_failure = last_reset_at_or_before(tool_id, now, failures);

    let in_failed_state = last_failure
        .map(|f| {
            let failed_at = f.reset_time();
            !records.iter().any(|r| {
                r.tool_id() == tool_id
                    && r.reference_time()
                        .map_or(false, |t| t > failed_at && t <= now)
            })
        })
        .unwrap_or(false);

    let severity = if in_failed_state {
        ToolSeverity::Critical
    } else if window.pieces >= thresholds.warning_threshold {
        ToolSeverity::Warning
    } else {
        ToolSeverity::Ok
    };

    ToolWearStatus {
        tool_id,
        accumulated_pieces: window.pieces,
        severity,
        last_failure_id: last_failure.map(|f| f.mark_id()),
        last_failure_at: last_failure.map(|f| f.reset_time()),
        in_failed_state,
    }
}

// ==========================================
// Alert - 告警
// ==========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    /// 刀具故障
    Failure,
    /// 累计件数超过告警阈值
    Threshold,
    /// 单条记录产量过高
    HighVolume,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub kind: AlertKind,
    pub severity: ToolSeverity,
    pub tool_id: i64,
    pub message: String,
    pub at: NaiveDateTime,
}

/// 看板告警：每把 Warning/Critical 刀具一条
pub fn alert_for_tool(tool: &Tool, status: &ToolWearStatus, now: NaiveDateTime) -> Option<Alert> {
    match status.severity {
        ToolSeverity::Ok => None,
        ToolSeverity::Critical => {
            let last = status
                .last_failure_at
                .as_ref()
                .map(format_timestamp)
                .unwrap_or_else(|| "N/A".to_string());
            Some(Alert {
                kind: AlertKind::Failure,
                severity: ToolSeverity::Critical,
                tool_id: tool.id,
                message: t_with_args("alert.tool_critical", &[("code", &tool.code), ("at", &last)]),
                at: now,
            })
        }
        ToolSeverity::Warning => Some(Alert {
            kind: AlertKind::Threshold,
            severity: ToolSeverity::Warning,
            tool_id: tool.id,
            message: t_with_args(
                "alert.tool_near_threshold",
                &[
                    ("code", &tool.code),
                    ("pieces", &status.accumulated_pieces.to_string()),
                ],
            ),
            at: now,
        }),
    }
}

/// 新生产记录的高产量告警
pub fn alert_for_record(
    record: &ProductionRecord,
    thresholds: &SeverityThresholds,
    now: NaiveDateTime,
) -> Option<Alert> {
    if record.pieces < thresholds.per_record_threshold {
        return None;
    }
    Some(Alert {
        kind: AlertKind::HighVolume,
        severity: ToolSeverity::Warning,
        tool_id: record.tool_id,
        message: t_with_args(
            "alert.high_volume_record",
            &[
                ("pieces", &record.pieces.to_string()),
                ("tool_id", &record.tool_id.to_string()),
            ],
        ),
        at: now,
    })
}

/// 新故障告警（总是 Critical）
pub fn alert_for_failure(failure: &FailureView, now: NaiveDateTime) -> Alert {
    let tool_label = failure
        .tool_code
        .clone()
        .unwrap_or_else(|| failure.failure.tool_id.to_string());
    Alert {
        kind: AlertKind::Failure,
        severity: ToolSeverity::Critical,
        tool_id: failure.failure.tool_id,
        message: t_with_args(
            "alert.failure_reported",
            &[("tool", &tool_label), ("reason", &failure.failure.reason)],
        ),
        at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FailureEvent, FailureSeverity, ToolStatus};
    use chrono::{Duration, NaiveDate};

    fn t(offset: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
            + Duration::minutes(offset)
    }

    fn rec(id: i64, at: i64, pieces: i64) -> ProductionRecord {
        ProductionRecord {
            id,
            tool_id: 1,
            machine: "Maq-1".to_string(),
            pieces,
            entry_datetime: Some(t(at)),
            exit_datetime: None,
            status: None,
            created_at: Some(t(at)),
        }
    }

    fn fail(id: i64, at: i64) -> FailureView {
        FailureView {
            failure: FailureEvent {
                id,
                tool_id: 1,
                operator_id: 1,
                failure_datetime: t(at),
                failure_type: None,
                severity: FailureSeverity::Critical,
                machine: None,
                operation_type: None,
                material_processed: None,
                cutting_parameters: None,
                reason: "lascou".to_string(),
                action_taken: None,
                maintenance_required: true,
                created_at: t(at),
            },
            tool_code: Some("T-100".to_string()),
            tool_description: None,
            operator_name: None,
        }
    }

    fn tool() -> Tool {
        Tool {
            id: 1,
            code: "T-100".to_string(),
            description: "Fresa".to_string(),
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
            created_at: t(0),
            updated_at: None,
        }
    }

    const THRESHOLDS: SeverityThresholds = SeverityThresholds {
        warning_threshold: 100,
        per_record_threshold: 50,
    };

    #[test]
    fn test_ok_below_threshold() {
        let records = vec![rec(1, 1, 40), rec(2, 2, 40)];
        let failures: Vec<FailureView> = vec![];
        let status = classify_tool(1, t(10), &records, &failures, &THRESHOLDS);
        assert_eq!(status.severity, ToolSeverity::Ok);
        assert_eq!(status.accumulated_pieces, 80);
        assert!(alert_for_tool(&tool(), &status, t(10)).is_none());
    }

    #[test]
    fn test_warning_at_threshold() {
        let records = vec![rec(1, 1, 60), rec(2, 2, 40)];
        let failures: Vec<FailureView> = vec![];
        let status = classify_tool(1, t(10), &records, &failures, &THRESHOLDS);
        assert_eq!(status.severity, ToolSeverity::Warning);
        let alert = alert_for_tool(&tool(), &status, t(10)).unwrap();
        assert_eq!(alert.kind, AlertKind::Threshold);
    }

    #[test]
    fn test_critical_until_production_resumes() {
        let mut records = vec![rec(1, 1, 500)];
        let failures = vec![fail(1, 5)];

        let status = classify_tool(1, t(10), &records, &failures, &THRESHOLDS);
        assert_eq!(status.severity, ToolSeverity::Critical);
        assert!(status.in_failed_state);
        assert_eq!(status.last_failure_id, Some(1));
        assert_eq!(status.accumulated_pieces, 0);

        // 故障时刻的记录不算恢复生产
        records.push(rec(2, 5, 10));
        let status = classify_tool(1, t(10), &records, &failures, &THRESHOLDS);
        assert_eq!(status.severity, ToolSeverity::Critical);

        // 故障之后有了新记录 → 恢复
        records.push(rec(3, 7, 10));
        let status = classify_tool(1, t(10), &records, &failures, &THRESHOLDS);
        assert_eq!(status.severity, ToolSeverity::Ok);
        assert_eq!(status.accumulated_pieces, 10);
        assert_eq!(status.last_failure_at, Some(t(5)));
    }

    #[test]
    fn test_future_failure_does_not_count() {
        let records = vec![rec(1, 1, 10)];
        let failures = vec![fail(1, 60)];
        let status = classify_tool(1, t(10), &records, &failures, &THRESHOLDS);
        assert_eq!(status.severity, ToolSeverity::Ok);
        assert_eq!(status.last_failure_id, None);
    }

    #[test]
    fn test_record_and_failure_alerts() {
        assert!(alert_for_record(&rec(1, 1, 49), &THRESHOLDS, t(1)).is_none());
        let alert = alert_for_record(&rec(1, 1, 50), &THRESHOLDS, t(1)).unwrap();
        assert_eq!(alert.kind, AlertKind::HighVolume);
        assert_eq!(alert.severity, ToolSeverity::Warning);

        let alert = alert_for_failure(&fail(3, 2), t(2));
        assert_eq!(alert.severity, ToolSeverity::Critical);
        assert_eq!(alert.tool_id, 1);
    }

    #[test]
    fn test_threshold_overrides() {
        let th = SeverityThresholds::default().with_overrides(Some(10), None);
        assert_eq!(th.warning_threshold, 10);
        assert_eq!(th.per_record_threshold, DEFAULT_PER_RECORD_THRESHOLD);
    }
}
