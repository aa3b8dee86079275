// ==========================================
// 刀具磨损追踪系统 - 刀具领域模型
// ==========================================
// 对齐: schema/init.sql tools 表
// 红线: 被生产记录或故障引用的刀具不得物理删除
// ==========================================

use crate::domain::types::ToolStatus;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// Tool - 刀具
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    pub id: i64,
    pub code: String, // 刀具编码（唯一）
    pub description: String,

    // ===== 物理属性（可选） =====
    pub brand: Option<String>,
    #[serde(rename = "type")]
    pub tool_type: Option<String>,
    pub diameter: Option<f64>,
    pub length: Option<f64>,
    pub material: Option<String>,
    pub coating: Option<String>,
    pub max_rpm: Option<i64>,
    pub cutting_edges: Option<i64>,

    pub status: ToolStatus,
    pub notes: Option<String>,

    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
}

// ==========================================
// NewTool - 新建刀具（已通过校验的写模型）
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewTool {
    pub code: String,
    pub description: String,
    pub brand: Option<String>,
    #[serde(rename = "type")]
    pub tool_type: Option<String>,
    pub diameter: Option<f64>,
    pub length: Option<f64>,
    pub material: Option<String>,
    pub coating: Option<String>,
    pub max_rpm: Option<i64>,
    pub cutting_edges: Option<i64>,
    pub status: Option<ToolStatus>,
    pub notes: Option<String>,
}

// ==========================================
// ToolPatch - 刀具部分更新
// ==========================================
// None 表示该字段保持不变
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolPatch {
    pub code: Option<String>,
    pub description: Option<String>,
    pub brand: Option<String>,
    #[serde(rename = "type")]
    pub tool_type: Option<String>,
    pub diameter: Option<f64>,
    pub length: Option<f64>,
    pub material: Option<String>,
    pub coating: Option<String>,
    pub max_rpm: Option<i64>,
    pub cutting_edges: Option<i64>,
    pub status: Option<ToolStatus>,
    pub notes: Option<String>,
}

impl ToolPatch {
    pub fn is_empty(&self) -> bool {
        self == &ToolPatch::default()
    }

    /// 将补丁应用到刀具上（内存仓储与 SQL 仓储共用同一语义）
    pub fn apply_to(&self, tool: &mut Tool) {
        if let Some(code) = &self.code {
            tool.code = code.clone();
        }
        if let Some(description) = &self.description {
            tool.description = description.clone();
        }
        if self.brand.is_some() {
            tool.brand = self.brand.clone();
        }
        if self.tool_type.is_some() {
            tool.tool_type = self.tool_type.clone();
        }
        if self.diameter.is_some() {
            tool.diameter = self.diameter;
        }
        if self.length.is_some() {
            tool.length = self.length;
        }
        if self.material.is_some() {
            tool.material = self.material.clone();
        }
        if self.coating.is_some() {
            tool.coating = self.coating.clone();
        }
        if self.max_rpm.is_some() {
            tool.max_rpm = self.max_rpm;
        }
        if self.cutting_edges.is_some() {
            tool.cutting_edges = self.cutting_edges;
        }
        if let Some(status) = self.status {
            tool.status = status;
        }
        if self.notes.is_some() {
            tool.notes = self.notes.clone();
        }
    }
}
