// ==========================================
// 刀具磨损追踪系统 - 领域类型定义
// ==========================================
// 职责: 刀具状态、故障严重度、用户角色、看板严重度
// 序列化格式: snake_case (与数据库、前端一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 刀具状态 (Tool Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ToolStatus {
    #[default]
    Active, // 在用
    Inactive,    // 停用
    Maintenance, // 维护中
}

impl ToolStatus {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ToolStatus::Active => "active",
            ToolStatus::Inactive => "inactive",
            ToolStatus::Maintenance => "maintenance",
        }
    }

    /// 从数据库字符串解析（未知值回落为 Active）
    pub fn from_db_str(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "inactive" => ToolStatus::Inactive,
            "maintenance" => ToolStatus::Maintenance,
            _ => ToolStatus::Active,
        }
    }
}

impl fmt::Display for ToolStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_str())
    }
}

// ==========================================
// 故障严重度 (Failure Severity)
// ==========================================
// 顺序: Low < Medium < High < Critical
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl FailureSeverity {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            FailureSeverity::Low => "low",
            FailureSeverity::Medium => "medium",
            FailureSeverity::High => "high",
            FailureSeverity::Critical => "critical",
        }
    }

    /// 严格解析：未知值返回 None，由调用方决定报错方式
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Some(FailureSeverity::Low),
            "medium" => Some(FailureSeverity::Medium),
            "high" => Some(FailureSeverity::High),
            "critical" => Some(FailureSeverity::Critical),
            _ => None,
        }
    }
}

impl fmt::Display for FailureSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_str())
    }
}

// ==========================================
// 用户角色 (User Role)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Owner, // 车间负责人
    #[default]
    Operator, // 操作员（注册默认角色）
}

impl UserRole {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            UserRole::Owner => "owner",
            UserRole::Operator => "operator",
        }
    }

    pub fn from_db_str(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "owner" => UserRole::Owner,
            _ => UserRole::Operator,
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_str())
    }
}

// ==========================================
// 看板严重度 (Tool Severity)
// ==========================================
// 依据: 累计磨损 + 未恢复故障 派生，不落库
// 顺序: Ok < Warning < Critical
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolSeverity {
    Ok,       // 正常
    Warning,  // 接近阈值
    Critical, // 故障未恢复
}

impl fmt::Display for ToolSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolSeverity::Ok => write!(f, "ok"),
            ToolSeverity::Warning => write!(f, "warning"),
            ToolSeverity::Critical => write!(f, "critical"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_severity_parse() {
        assert_eq!(FailureSeverity::parse("HIGH"), Some(FailureSeverity::High));
        assert_eq!(FailureSeverity::parse(" low "), Some(FailureSeverity::Low));
        assert_eq!(FailureSeverity::parse("fatal"), None);
        assert!(FailureSeverity::Critical > FailureSeverity::Medium);
    }

    #[test]
    fn test_status_round_trip_db_str() {
        for status in [ToolStatus::Active, ToolStatus::Inactive, ToolStatus::Maintenance] {
            assert_eq!(ToolStatus::from_db_str(status.to_db_str()), status);
        }
        assert_eq!(ToolStatus::from_db_str("unknown"), ToolStatus::Active);
        assert_eq!(UserRole::from_db_str("OWNER"), UserRole::Owner);
    }

    #[test]
    fn test_severity_serde() {
        let json = serde_json::to_string(&ToolSeverity::Critical).unwrap();
        assert_eq!(json, "\"critical\"");
        assert!(ToolSeverity::Critical > ToolSeverity::Warning);
    }
}
