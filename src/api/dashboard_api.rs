// ==========================================
// 刀具磨损追踪系统 - 看板 API
// ==========================================
// 职责: 看板读模型（总计、刀具状态、产量排行、告警、最近记录）
// 说明: 每次请求按当前时间重新计算，不做缓存
// ==========================================

use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::api::error::ApiResult;
use crate::domain::{ProductionRecord, RecordFilter, ToolSeverity};
use crate::engine::severity::{alert_for_tool, classify_tool, Alert, SeverityThresholds};
use crate::engine::wear::saturating_total;
use crate::repository::ShopStore;

/// 产量排行条数
pub const TOP_TOOLS_LIMIT: usize = 6;
/// 最近记录条数
pub const RECENT_RECORDS_LIMIT: usize = 5;

#[derive(Debug, Clone, Serialize)]
pub struct DashboardTotals {
    pub tools: usize,
    pub records: usize,
    pub pieces: i64,
    pub failures: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolRunState {
    Active,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolStat {
    pub tool_id: i64,
    pub code: String,
    pub description: String,
    /// 历史总件数
    pub total_pieces: i64,
    /// 自上次故障以来的实时累计
    pub accumulated_pieces: i64,
    pub severity: ToolSeverity,
    pub last_failure_at: Option<NaiveDateTime>,
    pub state: ToolRunState,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub generated_at: NaiveDateTime,
    pub thresholds: SeverityThresholds,
    pub totals: DashboardTotals,
    pub tools: Vec<ToolStat>,
    pub top_tools: Vec<ToolStat>,
    pub alerts: Vec<Alert>,
    pub recent_records: Vec<ProductionRecord>,
}

// ==========================================
// DashboardApi - 看板 API
// ==========================================
pub struct DashboardApi {
    store: Arc<dyn ShopStore>,
    thresholds: SeverityThresholds,
}

impl DashboardApi {
    pub fn new(store: Arc<dyn ShopStore>, thresholds: SeverityThresholds) -> Self {
        Self { store, thresholds }
    }

    pub fn thresholds(&self) -> SeverityThresholds {
        self.thresholds
    }

    /// 构建看板
    ///
    /// # 参数
    /// - `now`: 判定时刻
    /// - `thresholds`: 本次请求使用的阈值（已合并请求参数覆盖）
    pub fn dashboard(&self, now: NaiveDateTime, thresholds: SeverityThresholds) -> ApiResult<DashboardView> {
        let tools = self.store.list_tools()?;
        let records = self.store.list_records(&RecordFilter::default())?;
        let failures = self.store.list_failures()?;

        let mut alerts = Vec::new();
        let stats: Vec<ToolStat> = tools
            .iter()
            .map(|tool| {
                let status = classify_tool(tool.id, now, &records, &failures, &thresholds);
                if let Some(alert) = alert_for_tool(tool, &status, now) {
                    alerts.push(alert);
                }
                ToolStat {
                    tool_id: tool.id,
                    code: tool.code.clone(),
                    description: tool.description.clone(),
                    total_pieces: saturating_total(
                        records.iter().filter(|r| r.tool_id == tool.id).map(|r| r.pieces),
                    ),
                    accumulated_pieces: status.accumulated_pieces,
                    severity: status.severity,
                    last_failure_at: status.last_failure_at,
                    state: if status.in_failed_state {
                        ToolRunState::Failed
                    } else {
                        ToolRunState::Active
                    },
                }
            })
            .collect();

        // Critical 在前
        alerts.sort_by(|a, b| b.severity.cmp(&a.severity));

        let mut top_tools = stats.clone();
        top_tools.sort_by(|a, b| b.total_pieces.cmp(&a.total_pieces));
        top_tools.truncate(TOP_TOOLS_LIMIT);

        let totals = DashboardTotals {
            tools: tools.len(),
            records: records.len(),
            pieces: saturating_total(records.iter().map(|r| r.pieces)),
            failures: failures.len(),
        };

        // 存储已按最新在前返回
        let recent_records = records.into_iter().take(RECENT_RECORDS_LIMIT).collect();

        Ok(DashboardView {
            generated_at: now,
            thresholds,
            totals,
            tools: stats,
            top_tools,
            alerts,
            recent_records,
        })
    }
}
