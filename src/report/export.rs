// ==========================================
// 刀具磨损追踪系统 - CSV 导出
// ==========================================
// 列顺序固定:
// - records:  id,tool_id,tool_code,machine,pieces,entry_datetime,exit_datetime,created_at,accumulated_until_failure
// - failures: id,tool_id,tool_code,failure_datetime,severity,reason,created_at
// 引号规则: 字段含分隔符/引号/换行时加引号，内部引号加倍（csv crate QuoteStyle::Necessary）
// 分隔符在渲染时替换，不影响引号规则；可选 UTF-8 BOM
// ==========================================

use csv::{QuoteStyle, WriterBuilder};
use thiserror::Error;

use crate::domain::datetime::format_timestamp;
use crate::domain::{FailureView, ProductionRecord, Tool};
use crate::engine::wear::accumulated_until_failure;

pub const RECORDS_HEADER: [&str; 9] = [
    "id",
    "tool_id",
    "tool_code",
    "machine",
    "pieces",
    "entry_datetime",
    "exit_datetime",
    "created_at",
    "accumulated_until_failure",
];

pub const FAILURES_HEADER: [&str; 7] = [
    "id",
    "tool_id",
    "tool_code",
    "failure_datetime",
    "severity",
    "reason",
    "created_at",
];

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("不支持的分隔符: {0}")]
    InvalidDelimiter(String),

    #[error("CSV 写入失败: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV 缓冲区写出失败: {0}")]
    Buffer(String),
}

// ==========================================
// ExportKind - 导出类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Records,
    Failures,
}

impl ExportKind {
    /// 默认导出生产记录
    pub fn from_query(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(s) if s.eq_ignore_ascii_case("failures") => ExportKind::Failures,
            _ => ExportKind::Records,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExportKind::Records => "records",
            ExportKind::Failures => "failures",
        }
    }
}

// ==========================================
// CsvOptions - 渲染选项
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvOptions {
    pub delimiter: u8,
    pub bom: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            bom: false,
        }
    }
}

impl CsvOptions {
    /// 解析查询参数
    ///
    /// 分隔符接受单个字符（`,` `;` `|` 或制表符）或名称 comma/semicolon/tab/pipe
    pub fn from_query(delimiter: Option<&str>, bom: Option<&str>) -> Result<Self, ExportError> {
        let delimiter = match delimiter {
            None | Some("") => b',',
            Some(raw) => match raw {
                "," | "comma" => b',',
                ";" | "semicolon" => b';',
                "\t" | "tab" => b'\t',
                "|" | "pipe" => b'|',
                other => return Err(ExportError::InvalidDelimiter(other.to_string())),
            },
        };
        let bom = matches!(
            bom.map(|s| s.trim().to_ascii_lowercase()).as_deref(),
            Some("1") | Some("true") | Some("yes")
        );
        Ok(Self { delimiter, bom })
    }
}

fn opt_ts(ts: &Option<chrono::NaiveDateTime>) -> String {
    ts.as_ref().map(format_timestamp).unwrap_or_default()
}

fn write_rows<I>(header: &[&str], rows: I, options: &CsvOptions) -> Result<Vec<u8>, ExportError>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut buf = Vec::new();
    if options.bom {
        buf.extend_from_slice(UTF8_BOM);
    }

    let mut wtr = WriterBuilder::new()
        .delimiter(options.delimiter)
        .quote_style(QuoteStyle::Necessary)
        .from_writer(buf);
    wtr.write_record(header)?;
    for row in rows {
        wtr.write_record(&row)?;
    }
    wtr.flush().map_err(|e| ExportError::Buffer(e.to_string()))?;
    wtr.into_inner().map_err(|e| ExportError::Buffer(e.to_string()))
}

/// 生产记录 CSV
///
/// # 参数
/// - `rows`: 待导出记录（已按周期/刀具过滤）
/// - `history`: 全部记录，用于计算 accumulated_until_failure
pub fn render_records_csv(
    rows: &[ProductionRecord],
    history: &[ProductionRecord],
    tools: &[Tool],
    failures: &[FailureView],
    options: &CsvOptions,
) -> Result<Vec<u8>, ExportError> {
    let lines = rows.iter().map(|r| {
        let tool_code = tools
            .iter()
            .find(|t| t.id == r.tool_id)
            .map(|t| t.code.clone())
            .unwrap_or_default();
        let accumulated = accumulated_until_failure(r, history, failures)
            .map(|v| v.to_string())
            .unwrap_or_default();
        vec![
            r.id.to_string(),
            r.tool_id.to_string(),
            tool_code,
            r.machine.clone(),
            r.pieces.to_string(),
            opt_ts(&r.entry_datetime),
            opt_ts(&r.exit_datetime),
            opt_ts(&r.created_at),
            accumulated,
        ]
    });
    write_rows(&RECORDS_HEADER, lines, options)
}

/// 故障 CSV
pub fn render_failures_csv(rows: &[FailureView], options: &CsvOptions) -> Result<Vec<u8>, ExportError> {
    let lines = rows.iter().map(|f| {
        vec![
            f.failure.id.to_string(),
            f.failure.tool_id.to_string(),
            f.tool_code.clone().unwrap_or_default(),
            format_timestamp(&f.failure.failure_datetime),
            f.failure.severity.to_db_str().to_string(),
            f.failure.reason.clone(),
            format_timestamp(&f.failure.created_at),
        ]
    });
    write_rows(&FAILURES_HEADER, lines, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FailureEvent, FailureSeverity};
    use chrono::NaiveDate;

    fn ts(h: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 4, 1).unwrap().and_hms_opt(h, 0, 0).unwrap()
    }

    fn record(id: i64, machine: &str, h: u32, pieces: i64) -> ProductionRecord {
        ProductionRecord {
            id,
            tool_id: 1,
            machine: machine.to_string(),
            pieces,
            entry_datetime: Some(ts(h)),
            exit_datetime: None,
            status: None,
            created_at: Some(ts(h)),
        }
    }

    fn failure(reason: &str) -> FailureView {
        FailureView {
            failure: FailureEvent {
                id: 7,
                tool_id: 1,
                operator_id: 1,
                failure_datetime: ts(12),
                failure_type: None,
                severity: FailureSeverity::Critical,
                machine: None,
                operation_type: None,
                material_processed: None,
                cutting_parameters: None,
                reason: reason.to_string(),
                action_taken: None,
                maintenance_required: false,
                created_at: ts(12),
            },
            tool_code: Some("T-1".to_string()),
            tool_description: None,
            operator_name: None,
        }
    }

    #[test]
    fn test_round_trip_with_commas_and_quotes() {
        let rows = vec![record(1, "Maq \"A\", linha 2", 8, 10), record(2, "Torno\nnovo", 9, 5)];
        let failures = vec![failure("quebrou")];
        let bytes =
            render_records_csv(&rows, &rows, &[], &failures, &CsvOptions::default()).unwrap();

        let mut rdr = csv::Reader::from_reader(bytes.as_slice());
        let headers = rdr.headers().unwrap().clone();
        assert_eq!(headers.iter().collect::<Vec<_>>(), RECORDS_HEADER.to_vec());

        let parsed: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(parsed.len(), 2);
        assert_eq!(&parsed[0][3], "Maq \"A\", linha 2");
        assert_eq!(&parsed[1][3], "Torno\nnovo");
        // 两条记录都在 12 点故障之前：累计至故障 = 15
        assert_eq!(&parsed[0][8], "15");
        assert_eq!(&parsed[1][8], "15");
    }

    #[test]
    fn test_semicolon_delimiter_keeps_quoting() {
        let options = CsvOptions::from_query(Some(";"), None).unwrap();
        let bytes = render_failures_csv(&[failure("corte; vibração")], &options).unwrap();
        let text = String::from_utf8(bytes.clone()).unwrap();
        assert!(text.starts_with("id;tool_id;tool_code"));
        assert!(text.contains("\"corte; vibração\""));

        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(b';')
            .from_reader(bytes.as_slice());
        let row = rdr.records().next().unwrap().unwrap();
        assert_eq!(&row[4], "critical");
        assert_eq!(&row[5], "corte; vibração");
    }

    #[test]
    fn test_bom_and_bad_delimiter() {
        let options = CsvOptions::from_query(None, Some("1")).unwrap();
        let bytes = render_failures_csv(&[], &options).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));
        assert!(matches!(
            CsvOptions::from_query(Some("\""), None),
            Err(ExportError::InvalidDelimiter(_))
        ));
    }

    #[test]
    fn test_export_kind() {
        assert_eq!(ExportKind::from_query(None), ExportKind::Records);
        assert_eq!(ExportKind::from_query(Some("failures")), ExportKind::Failures);
        assert_eq!(ExportKind::from_query(Some("other")), ExportKind::Records);
    }
}
