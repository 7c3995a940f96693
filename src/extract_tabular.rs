//! Spreadsheet and delimited-text extraction.
//!
//! Reads every sheet of a workbook (or a CSV/TSV file presented as a
//! single sheet named after the file stem) and emits two kinds of entries
//! per non-empty sheet:
//!
//! - one entry per data row, titled from identifier-like columns, with the
//!   row rendered as `column: value` lines and carried as a single
//!   `table_row` chunk;
//! - one whole-sheet summary entry with row/column counts, the header
//!   list, and a sample of the leading rows.
//!
//! Fully empty rows and columns are pruned first, so row-entry counts
//! match the data that is actually there. A sheet that fails to parse is
//! skipped with a degradation report; the workbook failing to open at all
//! is unrecoverable and bubbles up.

use anyhow::{Context, Result};
use calamine::{open_workbook_auto, Data, Reader};
use serde_json::{Map, Value};
use std::path::Path;

use crate::assemble::{self, EntryDraft};
use crate::chunk;
use crate::config::Config;
use crate::models::{ContentChunk, FileDescriptor, KnowledgeBaseEntry};
use crate::report::{PipelineEvent, PipelineReporter};

/// Header keywords whose values are promoted into row titles.
static TITLE_KEYWORDS: &[&str] = &["name", "title", "id", "code"];

/// A pruned sheet: headers plus non-empty data rows, rectangular.
#[derive(Debug, Clone)]
pub struct SheetData {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SheetData {
    /// Build a sheet from raw cell rows (first row = headers).
    ///
    /// Drops fully-empty rows and fully-empty columns; returns `None`
    /// when no data survives. Blank header cells get positional names.
    pub fn from_rows(name: &str, raw: Vec<Vec<String>>) -> Option<SheetData> {
        if raw.is_empty() {
            return None;
        }

        let width = raw.iter().map(|r| r.len()).max().unwrap_or(0);
        if width == 0 {
            return None;
        }

        let cell = |row: &Vec<String>, j: usize| -> String {
            row.get(j).map(|s| s.trim().to_string()).unwrap_or_default()
        };

        let header_row = &raw[0];
        let data: Vec<&Vec<String>> = raw[1..]
            .iter()
            .filter(|row| (0..width).any(|j| !cell(row, j).is_empty()))
            .collect();
        if data.is_empty() {
            return None;
        }

        // Keep a column only if some data cell in it is non-empty
        let kept: Vec<usize> = (0..width)
            .filter(|&j| data.iter().any(|row| !cell(row, j).is_empty()))
            .collect();
        if kept.is_empty() {
            return None;
        }

        let headers: Vec<String> = kept
            .iter()
            .map(|&j| {
                let h = cell(header_row, j);
                if h.is_empty() {
                    format!("Column {}", j + 1)
                } else {
                    h
                }
            })
            .collect();

        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|row| kept.iter().map(|&j| cell(row, j)).collect())
            .collect();

        Some(SheetData {
            name: name.to_string(),
            headers,
            rows,
        })
    }
}

/// Extract a tabular file into row and sheet entries.
pub fn extract(
    desc: &FileDescriptor,
    config: &Config,
    reporter: &dyn PipelineReporter,
) -> Result<Vec<KnowledgeBaseEntry>> {
    let ext = desc
        .path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let sheets = match ext.as_str() {
        "csv" => read_delimited(&desc.path, b',')?.into_iter().collect(),
        "tsv" => read_delimited(&desc.path, b'\t')?.into_iter().collect(),
        _ => read_workbook(&desc.path, reporter)?,
    };

    let mut desc = desc.clone();
    desc.has_tables = !sheets.is_empty();

    let mut entries = Vec::new();
    for sheet in &sheets {
        entries.extend(sheet_entries(&desc, config, sheet));
    }
    Ok(entries)
}

/// Build the entries for one pruned sheet: a row entry per data row plus
/// the whole-sheet summary entry.
pub fn sheet_entries(
    desc: &FileDescriptor,
    config: &Config,
    sheet: &SheetData,
) -> Vec<KnowledgeBaseEntry> {
    let mut entries = Vec::new();
    for (row_index, row) in sheet.rows.iter().enumerate() {
        if let Some(entry) = row_entry(desc, config, sheet, row_index, row) {
            entries.push(entry);
        }
    }
    entries.push(summary_entry(desc, config, sheet));
    entries
}

fn row_entry(
    desc: &FileDescriptor,
    config: &Config,
    sheet: &SheetData,
    row_index: usize,
    row: &[String],
) -> Option<KnowledgeBaseEntry> {
    let mut title_parts = Vec::new();
    let mut content_parts = Vec::new();

    for (header, value) in sheet.headers.iter().zip(row) {
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        let header_lower = header.to_lowercase();
        if TITLE_KEYWORDS.iter().any(|k| header_lower.contains(k)) {
            title_parts.push(value.to_string());
        }
        content_parts.push(format!("{}: {}", header, value));
    }

    if content_parts.is_empty() {
        return None;
    }

    let title = if title_parts.is_empty() {
        format!("Row {} of {}", row_index + 1, sheet.name)
    } else {
        title_parts[..title_parts.len().min(3)].join(" - ")
    };
    let content = content_parts.join("\n");

    let mut chunk_metadata = Map::new();
    chunk_metadata.insert("sheet".to_string(), Value::from(sheet.name.clone()));
    chunk_metadata.insert("row".to_string(), Value::from(row_index));

    let mut chunks = vec![ContentChunk {
        id: format!("{}_{}", sheet.name, row_index),
        document_id: desc.checksum.clone(),
        content: content.clone(),
        content_type: "table_row".to_string(),
        chunk_index: 0,
        total_chunks: 0,
        metadata: chunk_metadata,
        embedding_text: content.clone(),
    }];
    chunk::finalize_totals(&mut chunks);

    let mut metadata = Map::new();
    metadata.insert("sheet".to_string(), Value::from(sheet.name.clone()));
    metadata.insert("row".to_string(), Value::from(row_index));

    Some(
        EntryDraft {
            disambiguator: format!("{}_{}", sheet.name, row_index),
            title: format!("[Excel] {}", title),
            summary: assemble::summarize(&content, 500),
            seed_tags: vec!["excel".to_string()],
            confidence: config.confidence.row,
            document_type: "excel".to_string(),
            metadata,
            chunks,
            content,
        }
        .assemble(desc),
    )
}

fn summary_entry(desc: &FileDescriptor, config: &Config, sheet: &SheetData) -> KnowledgeBaseEntry {
    let header_list = sheet
        .headers
        .iter()
        .take(10)
        .map(|h| h.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let summary_parts = [
        format!("Sheet: {}", sheet.name),
        format!("Rows: {}", sheet.rows.len()),
        format!("Columns: {}", sheet.headers.len()),
        format!("Headers: {}", header_list),
    ];

    let mut content = summary_parts.join("\n");
    content.push_str("\n\nSample rows:\n");
    content.push_str(&render_sample(sheet, config.tabular.sample_rows));

    let mut metadata = Map::new();
    metadata.insert("total_rows".to_string(), Value::from(sheet.rows.len()));
    metadata.insert("total_cols".to_string(), Value::from(sheet.headers.len()));

    EntryDraft {
        disambiguator: format!("{}_sheet", sheet.name),
        title: format!("[Excel Sheet] {} - {}", sheet.name, desc.name),
        summary: summary_parts.join(" | "),
        seed_tags: vec![
            sheet.name.clone(),
            "excel".to_string(),
            "table".to_string(),
        ],
        confidence: config.confidence.sheet,
        document_type: "excel_sheet".to_string(),
        metadata,
        chunks: Vec::new(),
        content,
    }
    .assemble(desc)
}

fn render_sample(sheet: &SheetData, sample_rows: usize) -> String {
    let mut lines = vec![sheet.headers.join(" | ")];
    for row in sheet.rows.iter().take(sample_rows) {
        lines.push(row.join(" | "));
    }
    lines.join("\n")
}

fn read_workbook(path: &Path, reporter: &dyn PipelineReporter) -> Result<Vec<SheetData>> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("Failed to open workbook: {}", path.display()))?;

    let mut sheets = Vec::new();
    for sheet_name in workbook.sheet_names().to_vec() {
        match workbook.worksheet_range(&sheet_name) {
            Ok(range) => {
                let raw: Vec<Vec<String>> = range
                    .rows()
                    .map(|row| row.iter().map(cell_to_string).collect())
                    .collect();
                if let Some(sheet) = SheetData::from_rows(&sheet_name, raw) {
                    sheets.push(sheet);
                }
            }
            Err(e) => {
                reporter.report(PipelineEvent::Degraded {
                    path: path.display().to_string(),
                    detail: format!("sheet '{}' unreadable: {}", sheet_name, e),
                });
            }
        }
    }
    Ok(sheets)
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.to_string(),
        _ => String::new(),
    }
}

fn read_delimited(path: &Path, delimiter: u8) -> Result<Option<SheetData>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_path(path)
        .with_context(|| format!("Failed to open delimited file: {}", path.display()))?;

    let mut raw = Vec::new();
    for result in reader.records() {
        let record =
            result.with_context(|| format!("Malformed record in {}", path.display()))?;
        raw.push(record.iter().map(|s| s.to_string()).collect());
    }

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "data".to_string());

    Ok(SheetData::from_rows(&stem, raw))
}
