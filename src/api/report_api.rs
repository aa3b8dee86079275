// ==========================================
// 刀具磨损追踪系统 - 报表 API
// ==========================================
// 职责: 周期汇总、CSV 导出
// ==========================================

use std::sync::Arc;

use chrono::NaiveDateTime;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::{FailureView, ProductionRecord, RecordFilter};
use crate::i18n::t;
use crate::report::export::{render_failures_csv, render_records_csv, CsvOptions, ExportError, ExportKind};
use crate::report::period::ReportPeriod;
use crate::report::summary::{build_summary, ReportSummary};
use crate::repository::ShopStore;

/// 导出结果
#[derive(Debug, Clone)]
pub struct CsvExport {
    pub filename: String,
    pub body: Vec<u8>,
    pub rows: usize,
}

impl From<ExportError> for ApiError {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::InvalidDelimiter(d) => {
                ApiError::InvalidInput(format!("{}: {}", t("report.invalid_delimiter"), d))
            }
            other => ApiError::InternalError(other.to_string()),
        }
    }
}

// ==========================================
// ReportApi - 报表 API
// ==========================================
pub struct ReportApi {
    store: Arc<dyn ShopStore>,
}

impl ReportApi {
    pub fn new(store: Arc<dyn ShopStore>) -> Self {
        Self { store }
    }

    pub fn summary(
        &self,
        period: ReportPeriod,
        tool_id: Option<i64>,
        now: NaiveDateTime,
    ) -> ApiResult<ReportSummary> {
        let tools = self.store.list_tools()?;
        let records = self.store.list_records(&RecordFilter::default())?;
        let failures = self.store.list_failures()?;
        Ok(build_summary(period, now, tool_id, &tools, &records, &failures))
    }

    /// 导出 CSV；文件名为 `<type>_<period>.csv`
    pub fn export(
        &self,
        kind: ExportKind,
        period: ReportPeriod,
        tool_id: Option<i64>,
        options: &CsvOptions,
        now: NaiveDateTime,
    ) -> ApiResult<CsvExport> {
        let since = period.since(now);
        let wanted = |id: i64| tool_id.map_or(true, |want| want == id);
        let records = self.store.list_records(&RecordFilter::default())?;
        let failures = self.store.list_failures()?;

        let (body, rows) = match kind {
            ExportKind::Records => {
                let rows: Vec<ProductionRecord> = records
                    .iter()
                    .filter(|r| wanted(r.tool_id) && period.includes(since, r.created_at))
                    .cloned()
                    .collect();
                let tools = self.store.list_tools()?;
                (
                    render_records_csv(&rows, &records, &tools, &failures, options)?,
                    rows.len(),
                )
            }
            ExportKind::Failures => {
                let rows: Vec<FailureView> = failures
                    .iter()
                    .filter(|f| {
                        wanted(f.failure.tool_id) && period.includes(since, Some(f.failure.created_at))
                    })
                    .cloned()
                    .collect();
                (render_failures_csv(&rows, options)?, rows.len())
            }
        };

        tracing::info!(
            kind = kind.as_str(),
            period = period.as_str(),
            rows,
            "CSV 报表已导出"
        );
        Ok(CsvExport {
            filename: format!("{}_{}.csv", kind.as_str(), period.as_str()),
            body,
            rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::datetime::now_utc;
    use crate::repository::MemoryShopStore;

    fn api() -> ReportApi {
        ReportApi::new(Arc::new(MemoryShopStore::seeded().unwrap()))
    }

    #[test]
    fn test_summary_from_seed() {
        let summary = api().summary(ReportPeriod::Day, None, now_utc()).unwrap();
        assert_eq!(summary.totals.total_records, 2);
        assert_eq!(summary.totals.total_pieces, 170);
        assert_eq!(summary.pieces_by_tool[0].code, "T-100");
    }

    #[test]
    fn test_export_filename_and_rows() {
        let export = api()
            .export(
                ExportKind::Records,
                ReportPeriod::Week,
                Some(2),
                &CsvOptions::default(),
                now_utc(),
            )
            .unwrap();
        assert_eq!(export.filename, "records_week.csv");
        assert_eq!(export.rows, 1);
        let text = String::from_utf8(export.body).unwrap();
        assert!(text.contains("T-200"));
        assert!(!text.contains("T-100"));
    }

    #[test]
    fn test_failures_export_empty() {
        let export = api()
            .export(
                ExportKind::Failures,
                ReportPeriod::All,
                None,
                &CsvOptions::default(),
                now_utc(),
            )
            .unwrap();
        assert_eq!(export.filename, "failures_all.csv");
        assert_eq!(export.rows, 0);
    }
}
