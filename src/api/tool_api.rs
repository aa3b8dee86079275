// ==========================================
// 刀具磨损追踪系统 - 刀具管理 API
// ==========================================
// 职责: 刀具 CRUD、单刀具实时磨损查询
// 事件: tool_created / tool_updated / tool_deleted
// 红线: 被记录或故障引用的刀具不可删除
// ==========================================

use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::{optional_text, require_text};
use crate::domain::{NewTool, RecordFilter, Tool, ToolPatch, ToolStatus};
use crate::engine::severity::{classify_tool, SeverityThresholds, ToolWearStatus};
use crate::engine::wear::{live_window, WearWindow};
use crate::engine::{LiveEvent, LiveEventKind, LiveEventPublisher};
use crate::i18n::t;
use crate::repository::ShopStore;

/// 新建/更新刀具的请求体
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolInput {
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

/// 单刀具实时磨损
#[derive(Debug, Clone, Serialize)]
pub struct ToolWearView {
    pub tool: Tool,
    pub window: WearWindow,
    pub status: ToolWearStatus,
}

// ==========================================
// ToolApi - 刀具管理 API
// ==========================================
pub struct ToolApi {
    store: Arc<dyn ShopStore>,
    publisher: Arc<dyn LiveEventPublisher>,
    thresholds: SeverityThresholds,
}

impl ToolApi {
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

    pub fn list_tools(&self) -> ApiResult<Vec<Tool>> {
        Ok(self.store.list_tools()?)
    }

    pub fn get_tool(&self, id: i64) -> ApiResult<Tool> {
        self.store
            .find_tool(id)?
            .ok_or_else(|| ApiError::not_found("entity.tool", id))
    }

    /// 新建刀具：编码与描述必填，编码唯一
    pub fn create_tool(&self, input: ToolInput) -> ApiResult<Tool> {
        let code = require_text(input.code.as_deref(), "validation.tool_code_description_required")?;
        let description =
            require_text(input.description.as_deref(), "validation.tool_code_description_required")?;
        validate_numbers(&input)?;

        if self.store.find_tool_by_code(&code)?.is_some() {
            return Err(ApiError::BusinessRuleViolation(t("tool.code_taken")));
        }

        let tool = self.store.insert_tool(&NewTool {
            code,
            description,
            brand: optional_text(input.brand),
            tool_type: optional_text(input.tool_type),
            diameter: input.diameter,
            length: input.length,
            material: optional_text(input.material),
            coating: optional_text(input.coating),
            max_rpm: input.max_rpm,
            cutting_edges: input.cutting_edges,
            status: input.status,
            notes: optional_text(input.notes),
        })?;

        tracing::info!(tool_id = tool.id, code = %tool.code, "刀具已创建");
        self.publisher
            .publish(LiveEvent::new(LiveEventKind::ToolCreated, &tool));
        Ok(tool)
    }

    /// 部分更新：未提供的字段保持不变
    pub fn update_tool(&self, id: i64, input: ToolInput) -> ApiResult<Tool> {
        self.get_tool(id)?;
        validate_numbers(&input)?;

        let code = match input.code.as_deref() {
            Some(raw) => {
                let code = require_text(Some(raw), "validation.tool_code_description_required")?;
                if let Some(existing) = self.store.find_tool_by_code(&code)? {
                    if existing.id != id {
                        return Err(ApiError::BusinessRuleViolation(t("tool.code_taken")));
                    }
                }
                Some(code)
            }
            None => None,
        };
        let description = match input.description.as_deref() {
            Some(raw) => Some(require_text(Some(raw), "validation.tool_code_description_required")?),
            None => None,
        };

        let patch = ToolPatch {
            code,
            description,
            brand: input.brand,
            tool_type: input.tool_type,
            diameter: input.diameter,
            length: input.length,
            material: input.material,
            coating: input.coating,
            max_rpm: input.max_rpm,
            cutting_edges: input.cutting_edges,
            status: input.status,
            notes: input.notes,
        };

        let tool = self.store.update_tool(id, &patch)?;
        tracing::info!(tool_id = id, "刀具已更新");
        self.publisher
            .publish(LiveEvent::new(LiveEventKind::ToolUpdated, &tool));
        Ok(tool)
    }

    pub fn delete_tool(&self, id: i64) -> ApiResult<()> {
        self.get_tool(id)?;
        let references = self.store.tool_reference_count(id)?;
        if references > 0 {
            tracing::warn!(tool_id = id, references, "刀具仍被引用，拒绝删除");
            return Err(ApiError::BusinessRuleViolation(t("tool.in_use")));
        }
        if !self.store.delete_tool(id)? {
            return Err(ApiError::not_found("entity.tool", id));
        }

        tracing::info!(tool_id = id, "刀具已删除");
        self.publisher
            .publish(LiveEvent::deleted(LiveEventKind::ToolDeleted, id));
        Ok(())
    }

    /// 单刀具实时磨损窗口与严重度
    pub fn tool_wear(&self, id: i64, now: NaiveDateTime) -> ApiResult<ToolWearView> {
        let tool = self.get_tool(id)?;
        let records = self.store.list_records(&RecordFilter {
            tool_id: Some(id),
            ..Default::default()
        })?;
        let failures = self.store.list_failures()?;

        let window = live_window(id, now, &records, &failures);
        let status = classify_tool(id, now, &records, &failures, &self.thresholds);
        Ok(ToolWearView {
            tool,
            window,
            status,
        })
    }
}

fn validate_numbers(input: &ToolInput) -> ApiResult<()> {
    let negative_float = [input.diameter, input.length]
        .into_iter()
        .flatten()
        .any(|v| !v.is_finite() || v < 0.0);
    let negative_int = [input.max_rpm, input.cutting_edges]
        .into_iter()
        .flatten()
        .any(|v| v < 0);
    if negative_float || negative_int {
        return Err(ApiError::ValidationError(t("validation.tool_numbers_non_negative")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::datetime::now_utc;
    use crate::engine::NoOpEventPublisher;
    use crate::repository::MemoryShopStore;

    fn api() -> ToolApi {
        ToolApi::new(
            Arc::new(MemoryShopStore::seeded().unwrap()),
            Arc::new(NoOpEventPublisher),
            SeverityThresholds::default(),
        )
    }

    fn input(code: &str, description: &str) -> ToolInput {
        ToolInput {
            code: Some(code.to_string()),
            description: Some(description.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_requires_code_and_description() {
        let api = api();
        assert!(matches!(
            api.create_tool(input("T-300", "  ")),
            Err(ApiError::InvalidInput(_))
        ));
        assert!(matches!(
            api.create_tool(input("T-100", "dup")),
            Err(ApiError::BusinessRuleViolation(_))
        ));
        let tool = api.create_tool(input(" T-300 ", "Alargador")).unwrap();
        assert_eq!(tool.code, "T-300");
        assert_eq!(tool.status, ToolStatus::Active);
    }

    #[test]
    fn test_update_keeps_unspecified_fields() {
        let api = api();
        let updated = api
            .update_tool(
                1,
                ToolInput {
                    status: Some(ToolStatus::Maintenance),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.code, "T-100");
        assert_eq!(updated.brand.as_deref(), Some("Korloy"));
        assert_eq!(updated.status, ToolStatus::Maintenance);

        assert!(matches!(
            api.update_tool(1, input("T-200", "x")),
            Err(ApiError::BusinessRuleViolation(_))
        ));
        assert!(matches!(
            api.update_tool(99, ToolInput::default()),
            Err(ApiError::NotFound(_))
        ));
    }

    #[test]
    fn test_delete_rules() {
        let api = api();
        assert!(matches!(api.delete_tool(1), Err(ApiError::BusinessRuleViolation(_))));
        let tool = api.create_tool(input("T-300", "Alargador")).unwrap();
        api.delete_tool(tool.id).unwrap();
        assert!(matches!(api.delete_tool(tool.id), Err(ApiError::NotFound(_))));
    }

    #[test]
    fn test_tool_wear_counts_seed_record() {
        let api = api();
        let wear = api.tool_wear(1, now_utc()).unwrap();
        assert_eq!(wear.window.pieces, 120);
        assert_eq!(wear.status.accumulated_pieces, 120);
    }

    #[test]
    fn test_negative_dimensions_rejected() {
        let api = api();
        let mut bad = input("T-301", "Fresa");
        bad.diameter = Some(-1.0);
        assert!(matches!(api.create_tool(bad), Err(ApiError::ValidationError(_))));
    }
}
