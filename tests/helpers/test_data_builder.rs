// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================
#![allow(dead_code)]

use chrono::NaiveDateTime;
use tool_wear_tracker::auth::hash_password;
use tool_wear_tracker::domain::{
    FailureSeverity, NewFailureEvent, NewProductionRecord, NewTool, NewUser, UserRole,
};

// ==========================================
// NewTool 构建器
// ==========================================

pub struct ToolBuilder {
    tool: NewTool,
}

impl ToolBuilder {
    pub fn new(code: &str) -> Self {
        Self {
            tool: NewTool {
                code: code.to_string(),
                description: format!("Ferramenta {}", code),
                ..Default::default()
            },
        }
    }

    pub fn description(mut self, description: &str) -> Self {
        self.tool.description = description.to_string();
        self
    }

    pub fn brand(mut self, brand: &str) -> Self {
        self.tool.brand = Some(brand.to_string());
        self
    }

    pub fn diameter(mut self, diameter: f64) -> Self {
        self.tool.diameter = Some(diameter);
        self
    }

    pub fn build(self) -> NewTool {
        self.tool
    }
}

// ==========================================
// NewProductionRecord 构建器
// ==========================================

pub struct RecordBuilder {
    record: NewProductionRecord,
}

impl RecordBuilder {
    pub fn new(tool_id: i64, pieces: i64) -> Self {
        Self {
            record: NewProductionRecord {
                tool_id,
                machine: "Maq-1".to_string(),
                pieces,
                entry_datetime: None,
                exit_datetime: None,
            },
        }
    }

    pub fn machine(mut self, machine: &str) -> Self {
        self.record.machine = machine.to_string();
        self
    }

    pub fn entry(mut self, at: NaiveDateTime) -> Self {
        self.record.entry_datetime = Some(at);
        self
    }

    pub fn exit(mut self, at: NaiveDateTime) -> Self {
        self.record.exit_datetime = Some(at);
        self
    }

    pub fn build(self) -> NewProductionRecord {
        self.record
    }
}

// ==========================================
// NewFailureEvent 构建器
// ==========================================

pub struct FailureBuilder {
    failure: NewFailureEvent,
}

impl FailureBuilder {
    pub fn new(tool_id: i64, operator_id: i64, at: NaiveDateTime) -> Self {
        Self {
            failure: NewFailureEvent {
                tool_id,
                operator_id,
                failure_datetime: at,
                failure_type: None,
                severity: FailureSeverity::High,
                machine: None,
                operation_type: None,
                material_processed: None,
                cutting_parameters: None,
                reason: "desgaste".to_string(),
                action_taken: None,
                maintenance_required: false,
            },
        }
    }

    pub fn severity(mut self, severity: FailureSeverity) -> Self {
        self.failure.severity = severity;
        self
    }

    pub fn reason(mut self, reason: &str) -> Self {
        self.failure.reason = reason.to_string();
        self
    }

    pub fn build(self) -> NewFailureEvent {
        self.failure
    }
}

// ==========================================
// NewUser 构建器
// ==========================================

pub fn operator(name: &str, cpf: &str, password: &str) -> NewUser {
    NewUser {
        name: name.to_string(),
        cpf: cpf.to_string(),
        password_hash: hash_password(password).expect("散列失败"),
        role: UserRole::Operator,
    }
}
