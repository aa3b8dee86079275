// ==========================================
// 刀具磨损追踪系统 - 刀具故障领域模型
// ==========================================
// 对齐: schema/init.sql tool_failures 表
// 红线: 故障只追加，不编辑、不删除
// 语义: 故障是磨损"里程表"的归零点
// ==========================================

use crate::domain::types::FailureSeverity;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// FailureEvent - 刀具故障
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureEvent {
    pub id: i64,
    pub tool_id: i64,
    pub operator_id: i64,
    pub failure_datetime: NaiveDateTime,
    pub failure_type: Option<String>,
    pub severity: FailureSeverity,
    pub machine: Option<String>,
    pub operation_type: Option<String>,
    pub material_processed: Option<String>,
    pub cutting_parameters: Option<String>,
    pub reason: String,

    // ===== 处置信息（可选） =====
    pub action_taken: Option<String>,
    pub maintenance_required: bool,

    pub created_at: NaiveDateTime,
}

// ==========================================
// FailureView - 故障读模型（关联刀具与操作员）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureView {
    #[serde(flatten)]
    pub failure: FailureEvent,
    pub tool_code: Option<String>,
    pub tool_description: Option<String>,
    pub operator_name: Option<String>,
}

// ==========================================
// NewFailureEvent - 新建故障（已通过校验）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewFailureEvent {
    pub tool_id: i64,
    pub operator_id: i64,
    pub failure_datetime: NaiveDateTime,
    pub failure_type: Option<String>,
    pub severity: FailureSeverity,
    pub machine: Option<String>,
    pub operation_type: Option<String>,
    pub material_processed: Option<String>,
    pub cutting_parameters: Option<String>,
    pub reason: String,
    pub action_taken: Option<String>,
    pub maintenance_required: bool,
}
