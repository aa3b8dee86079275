// ==========================================
// 刀具磨损追踪系统 - 引擎层事件发布
// ==========================================
// 职责: 定义实时事件类型与发布 trait
// 说明: API 层只依赖 trait，应用层的 EventBroadcaster 实现它
// ==========================================

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

// ==========================================
// 实时事件类型
// ==========================================

/// 推送给订阅客户端的事件名
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiveEventKind {
    ToolCreated,
    ToolUpdated,
    ToolDeleted,
    RecordCreated,
    RecordDeleted,
    FailureCreated,
    Alert,
}

impl LiveEventKind {
    /// SSE event 字段取值
    pub fn as_str(&self) -> &'static str {
        match self {
            LiveEventKind::ToolCreated => "tool_created",
            LiveEventKind::ToolUpdated => "tool_updated",
            LiveEventKind::ToolDeleted => "tool_deleted",
            LiveEventKind::RecordCreated => "record_created",
            LiveEventKind::RecordDeleted => "record_deleted",
            LiveEventKind::FailureCreated => "failure_created",
            LiveEventKind::Alert => "alert",
        }
    }
}

impl fmt::Display for LiveEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 实时事件：名称 + JSON 负载
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveEvent {
    pub kind: LiveEventKind,
    pub payload: Value,
}

impl LiveEvent {
    /// 将任意可序列化对象包装为事件；序列化失败时负载为 null
    pub fn new<T: Serialize>(kind: LiveEventKind, payload: &T) -> Self {
        let payload = serde_json::to_value(payload).unwrap_or_else(|e| {
            tracing::warn!(event = kind.as_str(), error = %e, "事件负载序列化失败");
            Value::Null
        });
        Self { kind, payload }
    }

    /// 删除类事件只携带 id
    pub fn deleted(kind: LiveEventKind, id: i64) -> Self {
        Self {
            kind,
            payload: serde_json::json!({ "id": id }),
        }
    }
}

// ==========================================
// 事件发布 Trait
// ==========================================

/// 实时事件发布者
///
/// 发布是尽力而为的：没有订阅者时直接丢弃，慢订阅者不得阻塞调用方
pub trait LiveEventPublisher: Send + Sync {
    /// 返回本次成功投递的订阅者数量
    fn publish(&self, event: LiveEvent) -> usize;
}

/// 空操作事件发布者（单元测试用）
#[derive(Debug, Clone, Default)]
pub struct NoOpEventPublisher;

impl LiveEventPublisher for NoOpEventPublisher {
    fn publish(&self, event: LiveEvent) -> usize {
        tracing::debug!(event = event.kind.as_str(), "NoOpEventPublisher: 跳过事件发布");
        0
    }
}
