use std::path::Path;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use arrow::util::display::array_value_to_string;
use calamine::{open_workbook_auto, Data, Reader};
use log::info;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::filter::{retain_complete, RawRow};
use super::model::RelationTable;
use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a relationship table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.parquet` – Parquet file with the two id columns (string or numeric)
/// * `.json`    – `[{ "CompanyName": "...", "Suppliers": "..." }, ...]`
/// * `.csv`     – header row plus one relationship per line
/// * `.xlsx`, `.xls` (and `.xlsm`, `.xlsb`, `.ods`) – first sheet, header row first
///
/// Rows with a missing entity or counterparty are dropped.
pub fn load_file(path: &Path, cfg: &PipelineConfig) -> PipelineResult<RelationTable> {
    let rows = read_rows(path, cfg).map_err(|e| PipelineError::load(path, e))?;
    let table = retain_complete(rows, cfg);
    info!(
        "loaded {} relationships from {} ({} rows read, {} dropped)",
        table.len(),
        path.display(),
        table.rows_read,
        table.rows_dropped
    );
    Ok(table)
}

fn read_rows(path: &Path, cfg: &PipelineConfig) -> Result<Vec<RawRow>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "parquet" | "pq" => load_parquet(path, cfg),
        "json" => load_json(path, cfg),
        "csv" => load_csv(path, cfg),
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => load_spreadsheet(path, cfg),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "CompanyName": "Acme", "Suppliers": "Globex" },
///   { "CompanyName": "Acme", "Suppliers": null },
///   ...
/// ]
/// ```
///
/// A key absent from every object is treated as a missing column.
fn load_json(path: &Path, cfg: &PipelineConfig) -> Result<Vec<RawRow>> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut rows = Vec::with_capacity(records.len());
    let mut seen_entity = false;
    let mut seen_counterparty = false;

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let entity = obj.get(&cfg.entity_column);
        let counterparty = obj.get(&cfg.counterparty_column);
        seen_entity |= entity.is_some();
        seen_counterparty |= counterparty.is_some();

        rows.push(RawRow::new(
            entity.and_then(json_to_cell),
            counterparty.and_then(json_to_cell),
        ));
    }

    if !records.is_empty() {
        if !seen_entity {
            bail!("JSON missing '{}' column", cfg.entity_column);
        }
        if !seen_counterparty {
            bail!("JSON missing '{}' column", cfg.counterparty_column);
        }
    }

    Ok(rows)
}

fn json_to_cell(val: &JsonValue) -> Option<String> {
    match val {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one relationship per line.
/// Columns other than the entity and counterparty columns are ignored.
fn load_csv(path: &Path, cfg: &PipelineConfig) -> Result<Vec<RawRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .context("opening CSV")?;
    let headers = reader.headers().context("reading CSV headers")?.clone();

    let entity_idx = headers
        .iter()
        .position(|h| h == cfg.entity_column)
        .with_context(|| format!("CSV missing '{}' column", cfg.entity_column))?;
    let counterparty_idx = headers
        .iter()
        .position(|h| h == cfg.counterparty_column)
        .with_context(|| format!("CSV missing '{}' column", cfg.counterparty_column))?;

    let mut rows = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        rows.push(RawRow::new(
            record.get(entity_idx).map(str::to_string),
            record.get(counterparty_idx).map(str::to_string),
        ));
    }

    Ok(rows)
}

// ---------------------------------------------------------------------------
// Spreadsheet loader
// ---------------------------------------------------------------------------

/// Read the first worksheet. Its first row holds the column names; empty
/// and error cells are missing values, numbers are rendered as text.
fn load_spreadsheet(path: &Path, cfg: &PipelineConfig) -> Result<Vec<RawRow>> {
    let mut workbook = open_workbook_auto(path).context("opening spreadsheet")?;
    let range = workbook
        .worksheet_range_at(0)
        .context("spreadsheet has no worksheet")?
        .context("reading first worksheet")?;

    let mut sheet_rows = range.rows();
    let Some(header) = sheet_rows.next() else {
        return Ok(Vec::new());
    };
    let column = |name: &str| {
        header
            .iter()
            .position(|cell| matches!(cell, Data::String(s) if s == name))
            .with_context(|| format!("Spreadsheet missing '{name}' column"))
    };
    let entity_idx = column(&cfg.entity_column)?;
    let counterparty_idx = column(&cfg.counterparty_column)?;

    Ok(sheet_rows
        .map(|row| {
            RawRow::new(
                row.get(entity_idx).and_then(sheet_cell),
                row.get(counterparty_idx).and_then(sheet_cell),
            )
        })
        .collect())
}

fn sheet_cell(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file containing a relationship table.
///
/// The two id columns may be strings or numbers; numbers are rendered as
/// text and treated as opaque identifiers.  Other columns are ignored.
fn load_parquet(path: &Path, cfg: &PipelineConfig) -> Result<Vec<RawRow>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;

    let schema = builder.schema().clone();
    schema
        .index_of(&cfg.entity_column)
        .map_err(|_| anyhow::anyhow!("Parquet file missing '{}' column", cfg.entity_column))?;
    schema
        .index_of(&cfg.counterparty_column)
        .map_err(|_| anyhow::anyhow!("Parquet file missing '{}' column", cfg.counterparty_column))?;

    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let batch_schema = batch.schema();
        let entity_col = batch.column(batch_schema.index_of(&cfg.entity_column)?);
        let counterparty_col = batch.column(batch_schema.index_of(&cfg.counterparty_column)?);

        for row in 0..batch.num_rows() {
            let entity = extract_cell(entity_col, row)
                .with_context(|| format!("Row {row}: failed to read '{}'", cfg.entity_column))?;
            let counterparty = extract_cell(counterparty_col, row).with_context(|| {
                format!("Row {row}: failed to read '{}'", cfg.counterparty_column)
            })?;
            rows.push(RawRow::new(entity, counterparty));
        }
    }

    Ok(rows)
}

/// Render one Arrow cell as an identifier; `None` for nulls.
fn extract_cell(col: &ArrayRef, row: usize) -> Result<Option<String>> {
    if col.is_null(row) {
        return Ok(None);
    }
    let value = match col.data_type() {
        DataType::Utf8 => col.as_string::<i32>().value(row).to_string(),
        DataType::LargeUtf8 => col.as_string::<i64>().value(row).to_string(),
        DataType::Int32 => col.as_primitive::<Int32Type>().value(row).to_string(),
        DataType::Int64 => col.as_primitive::<Int64Type>().value(row).to_string(),
        DataType::Float32 => col.as_primitive::<Float32Type>().value(row).to_string(),
        DataType::Float64 => col.as_primitive::<Float64Type>().value(row).to_string(),
        DataType::Boolean => col.as_boolean().value(row).to_string(),
        // dictionary-encoded strings, dates, etc.
        _ => array_value_to_string(col.as_ref(), row).context("formatting parquet value")?,
    };
    Ok(Some(value))
}
