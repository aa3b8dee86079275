// ==========================================
// 刀具磨损追踪系统 - 生产记录 API
// ==========================================
// 职责: 记录查询、新建、删除；历史归属磨损行视图
// 事件: record_created / record_deleted / alert（单条高产量）
// ==========================================

use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::require_text;
use crate::domain::datetime::{lenient_option, now_utc};
use crate::domain::{NewProductionRecord, ProductionRecord, RecordFilter};
use crate::engine::severity::{alert_for_record, SeverityThresholds};
use crate::engine::wear::{historical_window, ResetMark};
use crate::engine::{LiveEvent, LiveEventKind, LiveEventPublisher};
use crate::i18n::{t, t_with_args};
use crate::repository::ShopStore;

/// 记录行"注意"状态的默认阈值（件）
pub const DEFAULT_ATTENTION_THRESHOLD: i64 = 500;

/// 单条记录件数上限
pub const MAX_PIECES_PER_RECORD: i64 = 1_000_000_000;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecordInput {
    pub tool_id: Option<i64>,
    pub machine: Option<String>,
    pub pieces: Option<i64>,
    #[serde(default, deserialize_with = "lenient_option::deserialize")]
    pub entry_datetime: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "lenient_option::deserialize")]
    pub exit_datetime: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordRowStatus {
    Ok,
    Attention,
    Failed,
}

/// 带历史归属磨损的记录行
#[derive(Debug, Clone, Serialize)]
pub struct AttributedRecord {
    #[serde(flatten)]
    pub record: ProductionRecord,
    pub tool_code: Option<String>,
    pub tool_description: Option<String>,
    /// 无参考时间的记录为 None
    pub accumulated_until_failure: Option<i64>,
    pub closing_failure_id: Option<i64>,
    pub row_status: RecordRowStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub id: i64,
}

// ==========================================
// RecordApi - 生产记录 API
// ==========================================
pub struct RecordApi {
    store: Arc<dyn ShopStore>,
    publisher: Arc<dyn LiveEventPublisher>,
    thresholds: SeverityThresholds,
}

impl RecordApi {
    pub fn new(
        store: Arc<dyn ShopStore>,
        publisher: Arc<dyn LiveEventPublisher>,
        thresholds: SeverityThresholds,
    ) -> Self {
        Self {
            store,
            publisher,
            thresholds,
        }
    }

    /// 按过滤条件查询（最新在前）
    pub fn list_records(&self, filter: &RecordFilter) -> ApiResult<Vec<ProductionRecord>> {
        Ok(self.store.list_records(filter)?)
    }

    /// 全部记录 + 历史归属累计件数 + 行状态
    pub fn list_attributed(&self, attention_threshold: Option<i64>) -> ApiResult<Vec<AttributedRecord>> {
        let threshold = attention_threshold.unwrap_or(DEFAULT_ATTENTION_THRESHOLD);
        let records = self.store.list_records(&RecordFilter::default())?;
        let failures = self.store.list_failures()?;
        let tools = self.store.list_tools()?;

        let rows = records
            .iter()
            .map(|record| {
                let tool = tools.iter().find(|t| t.id == record.tool_id);
                let window = record
                    .reference_time()
                    .map(|t| historical_window(record.tool_id, t, &records, &failures));
                let accumulated = window.as_ref().map(|w| w.pieces);

                let failed_after = record.reference_time().map_or(false, |t| {
                    failures
                        .iter()
                        .any(|f| f.tool_id() == record.tool_id && f.reset_time() > t)
                });
                let row_status = if record.is_marked_failed() || failed_after {
                    RecordRowStatus::Failed
                } else if accumulated.unwrap_or(0) >= threshold {
                    RecordRowStatus::Attention
                } else {
                    RecordRowStatus::Ok
                };

                AttributedRecord {
                    record: record.clone(),
                    tool_code: tool.map(|t| t.code.clone()),
                    tool_description: tool.map(|t| t.description.clone()),
                    accumulated_until_failure: accumulated,
                    closing_failure_id: window.and_then(|w| w.closing_failure_id),
                    row_status,
                }
            })
            .collect();
        Ok(rows)
    }

    /// 新建记录
    ///
    /// 校验: tool_id 存在、machine 非空、0 < pieces ≤ MAX_PIECES_PER_RECORD、exit ≥ entry
    pub fn create_record(&self, input: RecordInput) -> ApiResult<ProductionRecord> {
        let tool_id = input
            .tool_id
            .ok_or_else(|| ApiError::InvalidInput(t("validation.record_required")))?;
        let machine = require_text(input.machine.as_deref(), "validation.record_required")?;
        let pieces = input
            .pieces
            .ok_or_else(|| ApiError::InvalidInput(t("validation.record_required")))?;

        if pieces <= 0 {
            return Err(ApiError::ValidationError(t("validation.pieces_positive")));
        }
        if pieces > MAX_PIECES_PER_RECORD {
            return Err(ApiError::ValidationError(t_with_args(
                "validation.pieces_too_large",
                &[("max", &MAX_PIECES_PER_RECORD.to_string())],
            )));
        }
        if let (Some(entry), Some(exit)) = (input.entry_datetime, input.exit_datetime) {
            if exit < entry {
                return Err(ApiError::ValidationError(t("validation.exit_before_entry")));
            }
        }
        if self.store.find_tool(tool_id)?.is_none() {
            return Err(ApiError::ValidationError(t("validation.tool_unknown")));
        }

        let record = self.store.insert_record(&NewProductionRecord {
            tool_id,
            machine,
            pieces,
            entry_datetime: input.entry_datetime,
            exit_datetime: input.exit_datetime,
        })?;

        tracing::info!(record_id = record.id, tool_id, pieces, "生产记录已创建");
        self.publisher
            .publish(LiveEvent::new(LiveEventKind::RecordCreated, &record));
        if let Some(alert) = alert_for_record(&record, &self.thresholds, now_utc()) {
            tracing::warn!(record_id = record.id, pieces, "单条记录产量超过告警阈值");
            self.publisher.publish(LiveEvent::new(LiveEventKind::Alert, &alert));
        }
        Ok(record)
    }

    pub fn delete_record(&self, id: i64) -> ApiResult<DeleteResponse> {
        if !self.store.delete_record(id)? {
            return Err(ApiError::not_found("entity.record", id));
        }
        tracing::info!(record_id = id, "生产记录已删除");
        self.publisher
            .publish(LiveEvent::deleted(LiveEventKind::RecordDeleted, id));
        Ok(DeleteResponse { success: true, id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::NoOpEventPublisher;
    use crate::repository::MemoryShopStore;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingPublisher {
        events: Mutex<Vec<LiveEventKind>>,
    }

    impl LiveEventPublisher for RecordingPublisher {
        fn publish(&self, event: LiveEvent) -> usize {
            self.events.lock().unwrap().push(event.kind);
            1
        }
    }

    fn input(tool_id: i64, pieces: i64) -> RecordInput {
        RecordInput {
            tool_id: Some(tool_id),
            machine: Some("Maq-3".to_string()),
            pieces: Some(pieces),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_validation() {
        let api = RecordApi::new(
            Arc::new(MemoryShopStore::seeded().unwrap()),
            Arc::new(NoOpEventPublisher),
            SeverityThresholds::default(),
        );
        assert!(matches!(api.create_record(input(1, 0)), Err(ApiError::ValidationError(_))));
        assert!(matches!(
            api.create_record(input(1, MAX_PIECES_PER_RECORD + 1)),
            Err(ApiError::ValidationError(_))
        ));
        assert!(api.create_record(input(1, MAX_PIECES_PER_RECORD)).is_ok());
        assert!(matches!(api.create_record(input(99, 5)), Err(ApiError::ValidationError(_))));
        assert!(matches!(
            api.create_record(RecordInput { machine: None, ..input(1, 5) }),
            Err(ApiError::InvalidInput(_))
        ));

        let entry = crate::domain::datetime::parse_timestamp("2025-02-01T10:00").unwrap();
        let exit = crate::domain::datetime::parse_timestamp("2025-02-01T09:00").unwrap();
        let backwards = RecordInput {
            entry_datetime: Some(entry),
            exit_datetime: Some(exit),
            ..input(1, 5)
        };
        assert!(matches!(api.create_record(backwards), Err(ApiError::ValidationError(_))));
    }

    #[test]
    fn test_high_volume_record_raises_alert() {
        let publisher = Arc::new(RecordingPublisher::default());
        let api = RecordApi::new(
            Arc::new(MemoryShopStore::seeded().unwrap()),
            publisher.clone(),
            SeverityThresholds::default(),
        );
        api.create_record(input(1, 10)).unwrap();
        api.create_record(input(1, 1_000)).unwrap();

        let events = publisher.events.lock().unwrap().clone();
        assert_eq!(
            events,
            vec![
                LiveEventKind::RecordCreated,
                LiveEventKind::RecordCreated,
                LiveEventKind::Alert
            ]
        );
    }

    #[test]
    fn test_attributed_rows_and_delete() {
        let api = RecordApi::new(
            Arc::new(MemoryShopStore::seeded().unwrap()),
            Arc::new(NoOpEventPublisher),
            SeverityThresholds::default(),
        );
        let rows = api.list_attributed(Some(100)).unwrap();
        let t100 = rows.iter().find(|r| r.record.tool_id == 1).unwrap();
        assert_eq!(t100.accumulated_until_failure, Some(120));
        assert_eq!(t100.row_status, RecordRowStatus::Attention);
        assert_eq!(t100.tool_code.as_deref(), Some("T-100"));
        let t200 = rows.iter().find(|r| r.record.tool_id == 2).unwrap();
        assert_eq!(t200.row_status, RecordRowStatus::Ok);

        let resp = api.delete_record(t200.record.id).unwrap();
        assert!(resp.success);
        assert!(matches!(api.delete_record(t200.record.id), Err(ApiError::NotFound(_))));
    }
}
