// ==========================================
// ReportApi 集成测试
// ==========================================
// 测试范围:
// 1. 周期汇总（week 无刀具过滤 = 近 7 天全部件数）
// 2. CSV 导出: 文件名、引号、分隔符、刀具过滤
// ==========================================

mod helpers;

use std::sync::Arc;

use chrono::Duration;
use helpers::test_data_builder::{operator, FailureBuilder, RecordBuilder, ToolBuilder};
use test_helpers::create_test_store;
use tool_wear_tracker::api::{ApiError, ReportApi};
use tool_wear_tracker::domain::datetime::now_utc;
use tool_wear_tracker::report::export::RECORDS_HEADER;
use tool_wear_tracker::report::{CsvOptions, ExportKind, ReportPeriod};
use tool_wear_tracker::repository::ShopStore;

fn seeded() -> (tempfile::TempDir, Arc<dyn ShopStore>, i64, i64) {
    let (dir, store) = create_test_store();
    let t1 = store.insert_tool(&ToolBuilder::new("T-1").build()).unwrap();
    let t2 = store.insert_tool(&ToolBuilder::new("T-2").build()).unwrap();
    store
        .insert_record(&RecordBuilder::new(t1.id, 120).machine("Centro \"A\", baia 2").build())
        .unwrap();
    store.insert_record(&RecordBuilder::new(t1.id, 30).build()).unwrap();
    store.insert_record(&RecordBuilder::new(t2.id, 50).build()).unwrap();
    (dir, store, t1.id, t2.id)
}

#[test]
fn test_week_summary_sums_recent_records() {
    let (_dir, store, t1, t2) = seeded();
    let api = ReportApi::new(store);
    let summary = api.summary(ReportPeriod::Week, None, now_utc()).unwrap();

    assert_eq!(summary.totals.total_records, 3);
    assert_eq!(summary.totals.total_pieces, 200);
    assert_eq!(summary.pieces_by_tool[0].tool_id, t1);
    assert_eq!(summary.pieces_by_tool[0].pieces, 150);
    assert_eq!(summary.pieces_by_tool[1].tool_id, t2);
}

#[test]
fn test_period_window_excludes_future_cutoff() {
    let (_dir, store, _t1, _t2) = seeded();
    let api = ReportApi::new(store);
    // 以 10 天后为基准，day/week 均不含今天创建的记录
    let later = now_utc() + Duration::days(10);
    let summary = api.summary(ReportPeriod::Week, None, later).unwrap();
    assert_eq!(summary.totals.total_records, 0);

    let month = api.summary(ReportPeriod::Month, None, later).unwrap();
    assert_eq!(month.totals.total_pieces, 200);
}

#[test]
fn test_tool_filter_applies_to_totals() {
    let (_dir, store, _t1, t2) = seeded();
    let api = ReportApi::new(store);
    let summary = api.summary(ReportPeriod::All, Some(t2), now_utc()).unwrap();
    assert_eq!(summary.totals.total_pieces, 50);
    assert_eq!(summary.pieces_by_tool.len(), 1);
}

#[test]
fn test_records_export_quotes_and_filename() {
    let (_dir, store, t1, _t2) = seeded();
    let api = ReportApi::new(store);
    let file = api
        .export(ExportKind::Records, ReportPeriod::Day, Some(t1), &CsvOptions::default(), now_utc())
        .unwrap();
    assert_eq!(file.filename, "records_day.csv");
    assert_eq!(file.rows, 2);

    let mut rdr = csv::Reader::from_reader(file.body.as_slice());
    assert_eq!(rdr.headers().unwrap().iter().collect::<Vec<_>>(), RECORDS_HEADER.to_vec());
    let machines: Vec<String> = rdr.records().map(|r| r.unwrap()[3].to_string()).collect();
    assert!(machines.contains(&"Centro \"A\", baia 2".to_string()));
}

#[test]
fn test_failures_export_with_semicolon() {
    let (_dir, store, t1, t2) = seeded();
    let user = store.insert_user(&operator("Operador", "52998224725", "abc123!@")).unwrap();
    store
        .insert_failure(&FailureBuilder::new(t1, user.id, now_utc()).reason("quebra; vibração").build())
        .unwrap();
    store
        .insert_failure(&FailureBuilder::new(t2, user.id, now_utc()).build())
        .unwrap();

    let api = ReportApi::new(store);
    let options = CsvOptions::from_query(Some(";"), Some("1")).unwrap();
    let file = api
        .export(ExportKind::Failures, ReportPeriod::All, Some(t1), &options, now_utc())
        .unwrap();
    assert_eq!(file.filename, "failures_all.csv");
    assert_eq!(file.rows, 1);
    assert!(file.body.starts_with(b"\xEF\xBB\xBF"));

    let text = String::from_utf8(file.body[3..].to_vec()).unwrap();
    assert!(text.starts_with("id;tool_id;tool_code;failure_datetime"));
    assert!(text.contains("\"quebra; vibração\""));
}

#[test]
fn test_invalid_delimiter_maps_to_invalid_input() {
    let err: ApiError = CsvOptions::from_query(Some("x"), None).unwrap_err().into();
    assert!(matches!(err, ApiError::InvalidInput(_)));
}
