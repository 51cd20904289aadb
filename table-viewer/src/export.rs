//! Result exporter
//!
//! Serializes a [`RowSet`] into one of three encodings (CSV, JSON, XLSX) and
//! produces the transport framing to go with it: content type and suggested
//! attachment filename. An empty result set is never turned into a zero-row
//! document; callers surface it as a not-found condition instead.

use chrono::Utc;
use rust_xlsxwriter::Workbook;
use serde_json::Value;
use thiserror::Error;

use crate::schema::RowSet;

/// Export error type
#[derive(Debug, Error)]
pub enum ExportError {
    /// Export requested on a zero-row result
    #[error("No data found")]
    EmptyResult,

    /// Format value not one of the recognized encodings
    #[error("Unsupported export format: {0}")]
    UnsupportedFormat(String),

    /// CSV encoding failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON encoding failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Workbook construction failed
    #[error("Spreadsheet error: {0}")]
    Excel(#[from] rust_xlsxwriter::XlsxError),

    /// Buffer finalization failed
    #[error("Export failed: {0}")]
    Encoding(String),
}

/// Recognized export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
    Excel,
}

impl ExportFormat {
    /// Parse a format value, case-insensitively
    pub fn parse(format: &str) -> Option<Self> {
        match format.to_lowercase().as_str() {
            "csv" => Some(ExportFormat::Csv),
            "json" => Some(ExportFormat::Json),
            "excel" => Some(ExportFormat::Excel),
            _ => None,
        }
    }

    /// File extension for the format
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Excel => "xlsx",
        }
    }

    /// Content-Type header value for the format
    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Json => "application/json",
            ExportFormat::Excel => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
        }
    }
}

/// A serialized export: payload bytes plus transport framing
#[derive(Debug)]
pub struct ExportPayload {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    pub filename: String,
}

/// Default base filename for a table export: `{table}_export_{ISO-date}`
pub fn table_export_basename(table: &str) -> String {
    format!("{}_export_{}", table, Utc::now().format("%Y-%m-%d"))
}

/// Base filename for a custom-query export: the user-supplied name, or
/// `custom_export_{ISO-date}` when none was given
pub fn custom_export_basename(filename: Option<&str>) -> String {
    match filename {
        Some(name) if !name.trim().is_empty() => name.to_string(),
        _ => format!("custom_export_{}", Utc::now().format("%Y-%m-%d")),
    }
}

/// Serialize a result set in the requested format
///
/// The empty check runs before the format switch, mirroring the handler flow
/// where the query has already executed by the time the format is examined.
///
/// # Arguments
///
/// * `row_set` - rows plus driver-ordered column names
/// * `format` - requested format value, validated here
/// * `base_name` - filename without extension
/// * `sheet_name` - worksheet name for spreadsheet output
pub fn export_rows(
    row_set: &RowSet,
    format: &str,
    base_name: &str,
    sheet_name: &str,
) -> Result<ExportPayload, ExportError> {
    if row_set.is_empty() {
        return Err(ExportError::EmptyResult);
    }

    let format = ExportFormat::parse(format)
        .ok_or_else(|| ExportError::UnsupportedFormat(format.to_string()))?;

    let bytes = match format {
        ExportFormat::Csv => to_csv(row_set)?,
        ExportFormat::Json => serde_json::to_vec(&row_set.rows)?,
        ExportFormat::Excel => to_xlsx(row_set, sheet_name)?,
    };

    Ok(ExportPayload {
        bytes,
        content_type: format.content_type(),
        filename: format!("{}.{}", base_name, format.extension()),
    })
}

/// Encode the result set as CSV: one header row in driver column order, then
/// one record per row with standard field quoting
fn to_csv(row_set: &RowSet) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record(&row_set.columns)?;
    for row in &row_set.rows {
        let record: Vec<String> = row_set
            .columns
            .iter()
            .map(|column| csv_field(row.get(column)))
            .collect();
        writer.write_record(&record)?;
    }

    writer
        .into_inner()
        .map_err(|error| ExportError::Encoding(error.to_string()))
}

/// Render one JSON value as a CSV field
fn csv_field(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

/// Encode the result set as a single-sheet XLSX workbook
fn to_xlsx(row_set: &RowSet, sheet_name: &str) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name)?;

    for (column_index, column) in row_set.columns.iter().enumerate() {
        worksheet.write_string(0, column_index as u16, column)?;
    }

    for (row_index, row) in row_set.rows.iter().enumerate() {
        for (column_index, column) in row_set.columns.iter().enumerate() {
            let cell_row = (row_index + 1) as u32;
            let cell_column = column_index as u16;

            match row.get(column) {
                None | Some(Value::Null) => {}
                Some(Value::Bool(flag)) => {
                    worksheet.write_boolean(cell_row, cell_column, *flag)?;
                }
                Some(Value::Number(number)) => {
                    if let Some(as_float) = number.as_f64() {
                        worksheet.write_number(cell_row, cell_column, as_float)?;
                    } else {
                        worksheet.write_string(cell_row, cell_column, number.to_string())?;
                    }
                }
                Some(Value::String(text)) => {
                    worksheet.write_string(cell_row, cell_column, text)?;
                }
                Some(other) => {
                    worksheet.write_string(cell_row, cell_column, other.to_string())?;
                }
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_rows() -> RowSet {
        RowSet {
            columns: vec!["id".to_string(), "name".to_string(), "note".to_string()],
            rows: vec![
                json!({"id": 1, "name": "Ada", "note": "first, \"quoted\""}),
                json!({"id": 2, "name": "Grace", "note": null}),
            ],
        }
    }

    #[test]
    fn test_format_parse() {
        assert_eq!(ExportFormat::parse("csv"), Some(ExportFormat::Csv));
        assert_eq!(ExportFormat::parse("JSON"), Some(ExportFormat::Json));
        assert_eq!(ExportFormat::parse("Excel"), Some(ExportFormat::Excel));
        assert_eq!(ExportFormat::parse("xml"), None);
    }

    #[test]
    fn test_csv_round_trip() {
        let rows = sample_rows();
        let payload = export_rows(&rows, "csv", "people_export_2025-01-01", "people").unwrap();

        assert_eq!(payload.content_type, "text/csv");
        assert_eq!(payload.filename, "people_export_2025-01-01.csv");

        let mut reader = csv::Reader::from_reader(payload.bytes.as_slice());
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers, vec!["id", "name", "note"]);

        let records: Vec<csv::StringRecord> =
            reader.records().map(|record| record.unwrap()).collect();
        assert_eq!(records.len(), rows.rows.len());
        assert_eq!(&records[0][0], "1");
        assert_eq!(&records[0][1], "Ada");
        assert_eq!(&records[0][2], "first, \"quoted\"");
        // NULL renders as an empty field
        assert_eq!(&records[1][2], "");
    }

    #[test]
    fn test_json_round_trip() {
        let rows = sample_rows();
        let payload = export_rows(&rows, "json", "export", "people").unwrap();

        assert_eq!(payload.content_type, "application/json");
        assert_eq!(payload.filename, "export.json");

        let parsed: Vec<serde_json::Value> = serde_json::from_slice(&payload.bytes).unwrap();
        assert_eq!(parsed, rows.rows);
    }

    #[test]
    fn test_xlsx_produces_workbook() {
        let rows = sample_rows();
        let payload = export_rows(&rows, "excel", "export", "people").unwrap();

        assert_eq!(
            payload.content_type,
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        );
        assert_eq!(payload.filename, "export.xlsx");
        // XLSX files are zip archives
        assert_eq!(&payload.bytes[..2], b"PK");
    }

    #[test]
    fn test_empty_rows_never_export() {
        let empty = RowSet {
            columns: vec!["id".to_string()],
            rows: vec![],
        };

        for format in ["csv", "json", "excel"] {
            let error = export_rows(&empty, format, "export", "sheet").unwrap_err();
            assert!(matches!(error, ExportError::EmptyResult));
        }
    }

    #[test]
    fn test_empty_check_precedes_format_check() {
        let empty = RowSet {
            columns: vec![],
            rows: vec![],
        };
        let error = export_rows(&empty, "xml", "export", "sheet").unwrap_err();
        assert!(matches!(error, ExportError::EmptyResult));
    }

    #[test]
    fn test_unsupported_format() {
        let error = export_rows(&sample_rows(), "xml", "export", "sheet").unwrap_err();
        assert!(matches!(error, ExportError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_filename_conventions() {
        let table_name = table_export_basename("users");
        assert!(table_name.starts_with("users_export_"));
        // ISO date suffix: users_export_YYYY-MM-DD
        assert_eq!(table_name.len(), "users_export_".len() + 10);

        assert_eq!(
            custom_export_basename(Some("my_export")),
            "my_export".to_string()
        );
        assert!(custom_export_basename(None).starts_with("custom_export_"));
        assert!(custom_export_basename(Some("  ")).starts_with("custom_export_"));
    }
}
