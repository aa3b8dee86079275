// ==========================================
// 刀具磨损追踪系统 - 生产记录领域模型
// ==========================================
// 对齐: schema/init.sql production_records 表
// 红线: 记录创建后不可修改，唯一例外是故障覆盖时的软状态标注
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// 故障覆盖后的软状态标注值
pub const RECORD_STATUS_FAILED: &str = "failed";

// ==========================================
// ProductionRecord - 生产记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionRecord {
    pub id: i64,
    pub tool_id: i64,
    pub machine: String,
    pub pieces: i64, // 加工件数（写入时已保证 > 0）
    pub entry_datetime: Option<NaiveDateTime>,
    pub exit_datetime: Option<NaiveDateTime>,
    pub status: Option<String>,
    pub created_at: Option<NaiveDateTime>,
}

impl ProductionRecord {
    /// 参考时间：优先上机时间，缺失时回落到创建时间
    ///
    /// 两者都缺失的记录无法排序，不参与磨损累计
    pub fn reference_time(&self) -> Option<NaiveDateTime> {
        self.entry_datetime.or(self.created_at)
    }

    pub fn is_marked_failed(&self) -> bool {
        self.status
            .as_deref()
            .map(|s| s.eq_ignore_ascii_case(RECORD_STATUS_FAILED))
            .unwrap_or(false)
    }
}

// ==========================================
// NewProductionRecord - 新建生产记录（已通过校验）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProductionRecord {
    pub tool_id: i64,
    pub machine: String,
    pub pieces: i64,
    pub entry_datetime: Option<NaiveDateTime>,
    pub exit_datetime: Option<NaiveDateTime>,
}

// ==========================================
// RecordFilter - 列表查询过滤条件
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordFilter {
    pub id: Option<i64>,
    pub tool_id: Option<i64>,
    /// 机台名称子串匹配
    pub machine: Option<String>,
}

impl RecordFilter {
    pub fn matches(&self, record: &ProductionRecord) -> bool {
        if let Some(id) = self.id {
            if record.id != id {
                return false;
            }
        }
        if let Some(tool_id) = self.tool_id {
            if record.tool_id != tool_id {
                return false;
            }
        }
        match self.machine.as_deref().map(str::trim) {
            Some(m) if !m.is_empty() => record.machine.contains(m),
            _ => true,
        }
    }
}
