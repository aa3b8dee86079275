// ==========================================
// 刀具磨损追踪系统 - 刀具故障 API
// ==========================================
// 职责: 故障查询与上报
// 上报流程:
// 1. 校验并写入故障（操作员取自 token）
// 2. 故障时刻的实时窗口内记录标注为 failed
// 3. 发布 failure_created 与 critical 告警
// ==========================================

use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::Deserialize;

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::{optional_text, require_text};
use crate::auth::Claims;
use crate::domain::datetime::{lenient_option, now_utc};
use crate::domain::{FailureSeverity, FailureView, NewFailureEvent, RecordFilter};
use crate::engine::severity::alert_for_failure;
use crate::engine::wear::live_window;
use crate::engine::{LiveEvent, LiveEventKind, LiveEventPublisher};
use crate::i18n::t;
use crate::repository::ShopStore;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FailureInput {
    pub tool_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_option::deserialize")]
    pub failure_datetime: Option<NaiveDateTime>,
    pub failure_type: Option<String>,
    pub severity: Option<String>,
    pub machine: Option<String>,
    pub operation_type: Option<String>,
    pub material_processed: Option<String>,
    pub cutting_parameters: Option<String>,
    pub reason: Option<String>,
    pub action_taken: Option<String>,
    #[serde(default)]
    pub maintenance_required: bool,
}

// ==========================================
// FailureApi - 刀具故障 API
// ==========================================
pub struct FailureApi {
    store: Arc<dyn ShopStore>,
    publisher: Arc<dyn LiveEventPublisher>,
}

impl FailureApi {
    pub fn new(store: Arc<dyn ShopStore>, publisher: Arc<dyn LiveEventPublisher>) -> Self {
        Self { store, publisher }
    }

    /// 全部故障（最新在前）
    pub fn list_failures(&self) -> ApiResult<Vec<FailureView>> {
        Ok(self.store.list_failures()?)
    }

    /// 上报故障
    pub fn create_failure(&self, input: FailureInput, operator: &Claims) -> ApiResult<FailureView> {
        let tool_id = input
            .tool_id
            .ok_or_else(|| ApiError::InvalidInput(t("validation.failure_tool_required")))?;
        let reason = require_text(input.reason.as_deref(), "validation.failure_reason_required")?;
        let severity_raw =
            require_text(input.severity.as_deref(), "validation.failure_severity_required")?;
        let severity = FailureSeverity::parse(&severity_raw)
            .ok_or_else(|| ApiError::ValidationError(t("validation.failure_severity_invalid")))?;

        if self.store.find_tool(tool_id)?.is_none() {
            return Err(ApiError::ValidationError(t("validation.tool_unknown")));
        }
        if self.store.find_user(operator.sub)?.is_none() {
            // token 有效但账号已不存在（例如内存存储被重置）
            return Err(ApiError::Unauthorized(t("auth.unauthorized")));
        }

        let failure_datetime = input.failure_datetime.unwrap_or_else(now_utc);
        let failure = self.store.insert_failure(&NewFailureEvent {
            tool_id,
            operator_id: operator.sub,
            failure_datetime,
            failure_type: optional_text(input.failure_type),
            severity,
            machine: optional_text(input.machine),
            operation_type: optional_text(input.operation_type),
            material_processed: optional_text(input.material_processed),
            cutting_parameters: optional_text(input.cutting_parameters),
            reason,
            action_taken: optional_text(input.action_taken),
            maintenance_required: input.maintenance_required,
        })?;

        let superseded = self.annotate_superseded(tool_id, failure_datetime)?;
        tracing::warn!(
            failure_id = failure.failure.id,
            tool_id,
            severity = %severity,
            superseded,
            "刀具故障已上报"
        );

        self.publisher
            .publish(LiveEvent::new(LiveEventKind::FailureCreated, &failure));
        let alert = alert_for_failure(&failure, now_utc());
        self.publisher.publish(LiveEvent::new(LiveEventKind::Alert, &alert));
        Ok(failure)
    }

    /// 将故障时刻之前、上一次故障之后的记录标注为 failed
    fn annotate_superseded(&self, tool_id: i64, failure_datetime: NaiveDateTime) -> ApiResult<usize> {
        let records = self.store.list_records(&RecordFilter {
            tool_id: Some(tool_id),
            ..Default::default()
        })?;
        let failures = self.store.list_failures()?;
        let window = live_window(tool_id, failure_datetime, &records, &failures);
        Ok(self.store.mark_records_failed(&window.record_ids)?)
    }
}
