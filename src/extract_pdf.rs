//! PDF extraction with a layered strategy.
//!
//! The primary path renders per-page text with `pdf_extract` and recovers
//! tables from whitespace-aligned line runs. When rendering fails (damaged
//! xref, exotic encodings) a structural `lopdf` pass still yields per-page
//! text, reported as a degradation and scored at reduced confidence; table
//! recovery is skipped on that path.
//!
//! Each non-empty page becomes one `text` chunk on the document entry,
//! prefixed with a `--- Page N ---` marker so page boundaries survive in
//! the joined content. Every detected table with at least two rows becomes
//! its own entry with no chunks.

use anyhow::{Context, Result};
use serde_json::{Map, Value};

use crate::assemble::{self, EntryDraft};
use crate::chunk;
use crate::config::Config;
use crate::models::{ContentChunk, FileDescriptor, KnowledgeBaseEntry};
use crate::report::{PipelineEvent, PipelineReporter};

/// Rows of cells recovered from aligned page text.
type Table = Vec<Vec<String>>;

/// Aligned runs shorter than this are prose, not tables.
const MIN_TABLE_ROWS: usize = 2;

/// Extract a PDF into one document entry plus one entry per detected table.
pub fn extract(
    desc: &FileDescriptor,
    config: &Config,
    reporter: &dyn PipelineReporter,
) -> Result<Vec<KnowledgeBaseEntry>> {
    let bytes = std::fs::read(&desc.path)
        .with_context(|| format!("Failed to read {}", desc.path.display()))?;

    match pdf_extract::extract_text_from_mem_by_pages(&bytes) {
        Ok(pages) => {
            let tables: Vec<Table> = pages.iter().flat_map(|p| detect_tables(p)).collect();
            Ok(build_entries(
                desc,
                config,
                &pages,
                &tables,
                config.confidence.pdf,
            ))
        }
        Err(err) => {
            reporter.report(PipelineEvent::Degraded {
                path: desc.path.display().to_string(),
                detail: format!("page rendering failed ({}), using structural reader", err),
            });
            let pages = read_pages_fallback(&bytes)?;
            Ok(build_entries(
                desc,
                config,
                &pages,
                &[],
                config.confidence.pdf_fallback,
            ))
        }
    }
}

/// Assemble the document entry (page chunks, page markers) and table entries.
fn build_entries(
    desc: &FileDescriptor,
    config: &Config,
    pages: &[String],
    tables: &[Table],
    confidence: f64,
) -> Vec<KnowledgeBaseEntry> {
    let mut desc = desc.clone();
    desc.page_count = Some(pages.len());
    desc.has_tables = !tables.is_empty();

    // Empty pages are skipped; chunk indexes stay contiguous while the
    // chunk metadata keeps the real 1-based page number.
    let blocks: Vec<(usize, String)> = pages
        .iter()
        .enumerate()
        .filter(|(_, text)| !text.trim().is_empty())
        .map(|(i, text)| (i + 1, format!("--- Page {} ---\n{}", i + 1, text.trim())))
        .collect();

    let content = blocks
        .iter()
        .map(|(_, block)| block.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    let mut chunks: Vec<ContentChunk> = blocks
        .iter()
        .enumerate()
        .map(|(index, (page, block))| {
            let mut metadata = Map::new();
            metadata.insert("page".to_string(), Value::from(*page));
            ContentChunk {
                id: format!("page_{}", index),
                document_id: desc.checksum.clone(),
                content: block.clone(),
                content_type: "text".to_string(),
                chunk_index: index,
                total_chunks: 0,
                metadata,
                embedding_text: block.clone(),
            }
        })
        .collect();
    chunk::finalize_totals(&mut chunks);

    let mut metadata = Map::new();
    metadata.insert("pages".to_string(), Value::from(pages.len()));
    metadata.insert("has_tables".to_string(), Value::from(!tables.is_empty()));

    let mut entries = vec![EntryDraft {
        disambiguator: assemble::DOCUMENT_DISAMBIGUATOR.to_string(),
        title: format!("[PDF] {}", desc.name),
        summary: assemble::summarize(&content, 1000),
        seed_tags: vec!["pdf".to_string(), "document".to_string()],
        confidence,
        document_type: "pdf".to_string(),
        metadata,
        chunks,
        content,
    }
    .assemble(&desc)];

    for (index, table) in tables.iter().enumerate() {
        if let Some(entry) = table_entry(&desc, config, table, index) {
            entries.push(entry);
        }
    }
    entries
}

fn table_entry(
    desc: &FileDescriptor,
    config: &Config,
    table: &Table,
    index: usize,
) -> Option<KnowledgeBaseEntry> {
    if table.len() < MIN_TABLE_ROWS {
        return None;
    }

    let mut content = String::from("Extracted table:\n");
    for row in table {
        let cells: Vec<&str> = row
            .iter()
            .map(|c| c.as_str())
            .filter(|c| !c.is_empty())
            .collect();
        content.push_str(&cells.join(" | "));
        content.push('\n');
    }

    let mut metadata = Map::new();
    metadata.insert("table_index".to_string(), Value::from(index));
    metadata.insert("rows".to_string(), Value::from(table.len()));

    Some(
        EntryDraft {
            disambiguator: format!("table_{}", index),
            title: format!("[PDF Table] Table {} of {}", index + 1, desc.name),
            summary: format!(
                "Table with {} rows and {} columns",
                table.len(),
                table[0].len()
            ),
            seed_tags: vec![
                "table".to_string(),
                "pdf".to_string(),
                "data".to_string(),
            ],
            confidence: config.confidence.pdf_table,
            document_type: "pdf_table".to_string(),
            metadata,
            chunks: Vec::new(),
            content,
        }
        .assemble(desc),
    )
}

/// Find runs of consecutive lines that split into two or more cells.
fn detect_tables(page_text: &str) -> Vec<Table> {
    let mut tables = Vec::new();
    let mut current: Table = Vec::new();
    for line in page_text.lines() {
        let cells = split_cells(line);
        if cells.len() >= 2 {
            current.push(cells);
        } else {
            if current.len() >= MIN_TABLE_ROWS {
                tables.push(std::mem::take(&mut current));
            }
            current.clear();
        }
    }
    if current.len() >= MIN_TABLE_ROWS {
        tables.push(current);
    }
    tables
}

/// Cells are separated by tabs or runs of two or more spaces.
fn split_cells(line: &str) -> Vec<String> {
    line.replace('\t', "  ")
        .split("  ")
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(String::from)
        .collect()
}

/// Per-page text via the PDF object tree. Pages that fail to decode
/// yield empty text rather than aborting the document.
fn read_pages_fallback(bytes: &[u8]) -> Result<Vec<String>> {
    let doc = lopdf::Document::load_mem(bytes).context("Failed to parse PDF structure")?;
    let mut pages = Vec::new();
    for (&number, _) in doc.get_pages().iter() {
        pages.push(doc.extract_text(&[number]).unwrap_or_default());
    }
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::SilentReporter;

    fn sample_descriptor() -> FileDescriptor {
        FileDescriptor {
            name: "handbook.pdf".to_string(),
            path: std::path::PathBuf::from("/data/handbook.pdf"),
            size_bytes: 10,
            category: crate::models::DocumentCategory::Pdf,
            mime_type: "application/pdf".to_string(),
            created_at: None,
            modified_at: None,
            checksum: "ef".repeat(32),
            author: None,
            title: None,
            language: None,
            page_count: None,
            word_count: None,
            encoding: None,
            has_tables: false,
            has_images: false,
            has_attachments: false,
        }
    }

    fn pages(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_three_page_document_shape() {
        let entries = build_entries(
            &sample_descriptor(),
            &Config::default(),
            &pages(&["Intro", "Middle part", "End"]),
            &[],
            0.9,
        );

        assert_eq!(entries.len(), 1);
        let doc = &entries[0];
        assert_eq!(doc.document_type, "pdf");
        assert_eq!(doc.confidence_score, 0.9);
        assert_eq!(doc.title, "[PDF] handbook.pdf");
        assert!(doc.content.contains("--- Page 2 ---\nMiddle part"));
        assert!(doc.tags.contains(&"pdf".to_string()));
        assert!(doc.tags.contains(&"document".to_string()));

        assert_eq!(doc.chunks.len(), 3);
        for (i, chunk) in doc.chunks.iter().enumerate() {
            assert_eq!(chunk.id, format!("page_{}", i));
            assert_eq!(chunk.chunk_index, i);
            assert_eq!(chunk.total_chunks, 3);
            assert_eq!(chunk.content_type, "text");
            assert_eq!(chunk.metadata["page"], serde_json::json!(i + 1));
        }
        assert_eq!(doc.metadata["pages"], serde_json::json!(3));
        assert_eq!(doc.metadata["has_tables"], serde_json::json!(false));
    }

    #[test]
    fn test_empty_pages_are_skipped() {
        let entries = build_entries(
            &sample_descriptor(),
            &Config::default(),
            &pages(&["One", "   ", "Three"]),
            &[],
            0.9,
        );

        let doc = &entries[0];
        assert_eq!(doc.chunks.len(), 2);
        assert_eq!(doc.chunks[0].id, "page_0");
        assert_eq!(doc.chunks[1].id, "page_1");
        assert_eq!(doc.chunks[0].metadata["page"], serde_json::json!(1));
        assert_eq!(doc.chunks[1].metadata["page"], serde_json::json!(3));
        // Page count still reflects the whole file
        assert_eq!(doc.metadata["pages"], serde_json::json!(3));
    }

    #[test]
    fn test_no_text_still_produces_entry() {
        let entries = build_entries(
            &sample_descriptor(),
            &Config::default(),
            &pages(&["", ""]),
            &[],
            0.9,
        );

        assert_eq!(entries.len(), 1);
        assert!(entries[0].content.is_empty());
        assert!(entries[0].chunks.is_empty());
        assert_eq!(entries[0].metadata["pages"], serde_json::json!(2));
    }

    #[test]
    fn test_fallback_confidence_keeps_page_chunks() {
        let entries = build_entries(
            &sample_descriptor(),
            &Config::default(),
            &pages(&["One", "Two", "Three"]),
            &[],
            0.7,
        );

        assert_eq!(entries[0].confidence_score, 0.7);
        assert_eq!(entries[0].chunks.len(), 3);
    }

    #[test]
    fn test_detect_tables_from_aligned_lines() {
        let text = "Some intro prose on this page.\n\
                    Name  Qty  Status\n\
                    bolt  40   ok\n\
                    nut   9    low\n\
                    A closing paragraph.";
        let tables = detect_tables(text);

        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].len(), 3);
        assert_eq!(tables[0][0], vec!["Name", "Qty", "Status"]);
        assert_eq!(tables[0][2], vec!["nut", "9", "low"]);
    }

    #[test]
    fn test_single_aligned_line_is_not_a_table() {
        let tables = detect_tables("prose\nName  Qty\nmore prose");
        assert!(tables.is_empty());
    }

    #[test]
    fn test_tab_separated_cells() {
        let tables = detect_tables("a\tb\nc\td");
        assert_eq!(tables, vec![vec![
            vec!["a".to_string(), "b".to_string()],
            vec!["c".to_string(), "d".to_string()],
        ]]);
    }

    #[test]
    fn test_table_entry_shape() {
        let table: Table = vec![
            vec!["Name".into(), "Qty".into()],
            vec!["bolt".into(), "40".into()],
            vec!["nut".into(), "".into()],
        ];
        let entries = build_entries(
            &sample_descriptor(),
            &Config::default(),
            &pages(&["Page text"]),
            &[table],
            0.9,
        );

        assert_eq!(entries.len(), 2);
        let table_entry = &entries[1];
        assert_eq!(table_entry.document_type, "pdf_table");
        assert_eq!(table_entry.confidence_score, 0.8);
        assert_eq!(table_entry.title, "[PDF Table] Table 1 of handbook.pdf");
        assert!(table_entry.content.starts_with("Extracted table:\n"));
        assert!(table_entry.content.contains("Name | Qty"));
        // Empty cells are dropped from the joined row
        assert!(table_entry.content.contains("\nnut\n"));
        assert_eq!(table_entry.summary, "Table with 3 rows and 2 columns");
        assert_eq!(table_entry.metadata["table_index"], serde_json::json!(0));
        assert_eq!(table_entry.metadata["rows"], serde_json::json!(3));
        assert!(table_entry.chunks.is_empty());
        assert_ne!(table_entry.uuid, entries[0].uuid);
        assert_eq!(entries[0].metadata["has_tables"], serde_json::json!(true));
    }

    #[test]
    fn test_table_below_min_rows_is_skipped() {
        let table: Table = vec![vec!["only".into(), "row".into()]];
        let entries = build_entries(
            &sample_descriptor(),
            &Config::default(),
            &pages(&["Page text"]),
            &[table],
            0.9,
        );
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_invalid_pdf_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"not a pdf").unwrap();

        let desc = crate::descriptor::build(&path, crate::models::DocumentCategory::Pdf).unwrap();
        assert!(extract(&desc, &Config::default(), &SilentReporter).is_err());
    }

    fn single_page_pdf() -> Vec<u8> {
        let stream = "BT /F1 12 Tf 100 700 Td (restart procedure) Tj ET\n";
        let mut out = Vec::new();
        out.extend_from_slice(b"%PDF-1.4\n");
        let o1 = out.len();
        out.extend_from_slice(b"1 0 obj << /Type /Catalog /Pages 2 0 R >> endobj\n");
        let o2 = out.len();
        out.extend_from_slice(b"2 0 obj << /Type /Pages /Kids [3 0 R] /Count 1 >> endobj\n");
        let o3 = out.len();
        out.extend_from_slice(b"3 0 obj << /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R /Resources << /Font << /F1 5 0 R >> >> >> endobj\n");
        let o4 = out.len();
        out.extend_from_slice(
            format!(
                "4 0 obj << /Length {} >> stream\n{}endstream endobj\n",
                stream.len(),
                stream
            )
            .as_bytes(),
        );
        let o5 = out.len();
        out.extend_from_slice(
            b"5 0 obj << /Type /Font /Subtype /Type1 /BaseFont /Helvetica >> endobj\n",
        );
        let xref_start = out.len();
        out.extend_from_slice(b"xref\n0 6\n");
        out.extend_from_slice(format!("{:010} 65535 f \n", 0).as_bytes());
        for offset in [o1, o2, o3, o4, o5] {
            out.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
        }
        out.extend_from_slice(b"trailer << /Size 6 /Root 1 0 R >>\nstartxref\n");
        out.extend_from_slice(format!("{}\n", xref_start).as_bytes());
        out.extend_from_slice(b"%%EOF\n");
        out
    }

    #[test]
    fn test_valid_pdf_extracts_page_aware_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runbook.pdf");
        std::fs::write(&path, single_page_pdf()).unwrap();

        let desc = crate::descriptor::build(&path, crate::models::DocumentCategory::Pdf).unwrap();
        let entries = extract(&desc, &Config::default(), &SilentReporter).unwrap();

        assert_eq!(entries.len(), 1);
        let doc = &entries[0];
        assert_eq!(doc.document_type, "pdf");
        assert_eq!(doc.title, "[PDF] runbook.pdf");
        assert_eq!(doc.metadata["pages"], serde_json::json!(1));
        assert_eq!(doc.metadata["has_tables"], serde_json::json!(false));
    }
}
