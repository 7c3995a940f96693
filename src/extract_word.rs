//! Word (.docx) extraction via streamed OOXML parsing.
//!
//! Reads `word/document.xml` out of the ZIP container and walks it with
//! `quick-xml`, separating body paragraphs from table cells. Tables are
//! rendered as pipe-joined rows under a `--- Tables ---` divider. The
//! combined content is then cut into section chunks at heading-looking
//! lines (three or more leading uppercase letters, digits, or `#`).

use std::io::Read;

use anyhow::{bail, Context, Result};
use serde_json::{Map, Value};

use crate::assemble::{self, EntryDraft};
use crate::chunk;
use crate::config::Config;
use crate::models::{ContentChunk, FileDescriptor, KnowledgeBaseEntry};
use crate::report::PipelineReporter;

/// Maximum decompressed bytes read from the document part (zip-bomb guard).
const MAX_XML_ENTRY_BYTES: u64 = 50 * 1024 * 1024;

/// Paragraphs and tables pulled out of `word/document.xml`.
#[derive(Debug, Default)]
struct DocumentBody {
    paragraphs: Vec<String>,
    tables: Vec<Vec<Vec<String>>>,
    has_images: bool,
}

/// Extract a Word document into a single sectioned entry.
pub fn extract(
    desc: &FileDescriptor,
    config: &Config,
    _reporter: &dyn PipelineReporter,
) -> Result<Vec<KnowledgeBaseEntry>> {
    let bytes = std::fs::read(&desc.path)
        .with_context(|| format!("Failed to read {}", desc.path.display()))?;
    let body = read_document_body(&bytes)?;

    let mut desc = desc.clone();
    desc.has_tables = !body.tables.is_empty();
    desc.has_images = body.has_images;

    let content = render_content(&body);
    let mut chunks = section_chunks(&desc.checksum, &content);
    chunk::finalize_totals(&mut chunks);

    let mut metadata = Map::new();
    metadata.insert(
        "paragraphs".to_string(),
        Value::from(body.paragraphs.len()),
    );
    metadata.insert("tables".to_string(), Value::from(body.tables.len()));
    metadata.insert("has_images".to_string(), Value::from(body.has_images));

    Ok(vec![EntryDraft {
        disambiguator: assemble::DOCUMENT_DISAMBIGUATOR.to_string(),
        title: format!("[Word] {}", desc.name),
        summary: assemble::summarize(&content, 1000),
        seed_tags: vec!["word".to_string(), "document".to_string()],
        confidence: config.confidence.word,
        document_type: "word".to_string(),
        metadata,
        chunks,
        content,
    }
    .assemble(&desc)])
}

/// Paragraphs joined by blank lines, then tables as pipe rows. Rows with
/// no text at all are dropped; empty cells inside a kept row are kept so
/// column positions line up.
fn render_content(body: &DocumentBody) -> String {
    let mut content = body.paragraphs.join("\n\n");

    let table_blocks: Vec<String> = body
        .tables
        .iter()
        .filter_map(|table| {
            let rows: Vec<String> = table
                .iter()
                .filter(|row| row.iter().any(|cell| !cell.is_empty()))
                .map(|row| row.join(" | "))
                .collect();
            if rows.is_empty() {
                None
            } else {
                Some(rows.join("\n"))
            }
        })
        .collect();

    if !table_blocks.is_empty() {
        content.push_str("\n\n--- Tables ---\n\n");
        content.push_str(&table_blocks.join("\n\n"));
    }
    content
}

/// Cut content into chunks at heading-looking lines.
fn section_chunks(document_id: &str, content: &str) -> Vec<ContentChunk> {
    split_sections(content)
        .into_iter()
        .filter(|section| !section.trim().is_empty())
        .enumerate()
        .map(|(index, section)| {
            let mut metadata = Map::new();
            metadata.insert("section".to_string(), Value::from(index));
            ContentChunk {
                id: format!("section_{}", index),
                document_id: document_id.to_string(),
                content: section.clone(),
                content_type: "text".to_string(),
                chunk_index: index,
                total_chunks: 0,
                metadata,
                embedding_text: section,
            }
        })
        .collect()
}

fn split_sections(content: &str) -> Vec<String> {
    let mut sections = Vec::new();
    let mut current = String::new();
    for (i, line) in content.split('\n').enumerate() {
        if i > 0 && looks_like_heading(line) {
            sections.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push('\n');
        }
        current.push_str(line);
    }
    sections.push(current);
    sections
}

/// A heading starts with at least three uppercase letters, digits, or `#`.
fn looks_like_heading(line: &str) -> bool {
    let lead: Vec<char> = line.chars().take(3).collect();
    lead.len() == 3
        && lead
            .iter()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || *c == '#')
}

fn read_document_body(bytes: &[u8]) -> Result<DocumentBody> {
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes))
        .context("Failed to open docx container")?;
    let has_images = archive
        .file_names()
        .any(|name| name.starts_with("word/media/"));

    let mut xml = Vec::new();
    {
        let entry = archive
            .by_name("word/document.xml")
            .context("word/document.xml not found")?;
        entry
            .take(MAX_XML_ENTRY_BYTES)
            .read_to_end(&mut xml)
            .context("Failed to read word/document.xml")?;
        if xml.len() as u64 >= MAX_XML_ENTRY_BYTES {
            bail!("word/document.xml exceeds size limit");
        }
    }

    let mut body = parse_document_xml(&xml)?;
    body.has_images = has_images;
    Ok(body)
}

/// Walk the document XML once. Text inside a table lands in the current
/// cell; text outside lands in the current paragraph. Only top-level
/// tables get structure; nested table text flattens into its cell.
fn parse_document_xml(xml: &[u8]) -> Result<DocumentBody> {
    let mut reader = quick_xml::Reader::from_reader(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    let mut body = DocumentBody::default();
    let mut table_depth = 0usize;
    let mut current_table: Vec<Vec<String>> = Vec::new();
    let mut current_row: Vec<String> = Vec::new();
    let mut current_cell = String::new();
    let mut current_para = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(quick_xml::events::Event::Start(e)) => match e.local_name().as_ref() {
                b"tbl" => {
                    table_depth += 1;
                    if table_depth == 1 {
                        current_table = Vec::new();
                    }
                }
                b"tr" if table_depth == 1 => current_row = Vec::new(),
                b"tc" if table_depth == 1 => current_cell = String::new(),
                b"p" if table_depth == 0 => current_para = String::new(),
                b"t" => in_text = true,
                _ => {}
            },
            Ok(quick_xml::events::Event::Text(te)) if in_text => {
                let text = te.unescape().unwrap_or_default();
                if table_depth > 0 {
                    current_cell.push_str(text.as_ref());
                } else {
                    current_para.push_str(text.as_ref());
                }
            }
            Ok(quick_xml::events::Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"tbl" => {
                    if table_depth == 1 {
                        body.tables.push(std::mem::take(&mut current_table));
                    }
                    table_depth = table_depth.saturating_sub(1);
                }
                b"tr" if table_depth == 1 => {
                    current_table.push(std::mem::take(&mut current_row));
                }
                b"tc" if table_depth == 1 => {
                    current_row.push(current_cell.trim().to_string());
                }
                b"p" => {
                    if table_depth > 0 {
                        // Paragraph breaks inside a cell become newlines
                        if !current_cell.is_empty() {
                            current_cell.push('\n');
                        }
                    } else if !current_para.trim().is_empty() {
                        body.paragraphs.push(current_para.trim().to_string());
                    }
                }
                _ => {}
            },
            Ok(quick_xml::events::Event::Eof) => break,
            Err(e) => bail!("Malformed document XML: {}", e),
            _ => {}
        }
        buf.clear();
    }
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::SilentReporter;
    use crate::{classify, descriptor};
    use std::io::Write;

    const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

    fn docx_with_body(body_xml: &str) -> Vec<u8> {
        let mut buf = Vec::new();
        {
            let mut zip = zip::ZipWriter::new(std::io::Cursor::new(&mut buf));
            zip.start_file(
                "word/document.xml",
                zip::write::SimpleFileOptions::default(),
            )
            .unwrap();
            let xml = format!(
                "<?xml version=\"1.0\"?><w:document xmlns:w=\"{}\"><w:body>{}</w:body></w:document>",
                W_NS, body_xml
            );
            zip.write_all(xml.as_bytes()).unwrap();
            zip.finish().unwrap();
        }
        buf
    }

    fn para(text: &str) -> String {
        format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", text)
    }

    fn extract_fixture(body_xml: &str) -> Vec<KnowledgeBaseEntry> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.docx");
        std::fs::write(&path, docx_with_body(body_xml)).unwrap();
        let desc = descriptor::build(&path, classify::classify(&path)).unwrap();
        extract(&desc, &Config::default(), &SilentReporter).unwrap()
    }

    #[test]
    fn test_paragraphs_and_metadata() {
        let body = format!("{}{}", para("First paragraph."), para("Second one."));
        let entries = extract_fixture(&body);

        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.document_type, "word");
        assert_eq!(entry.confidence_score, 0.9);
        assert_eq!(entry.title, "[Word] doc.docx");
        assert_eq!(entry.content, "First paragraph.\n\nSecond one.");
        assert_eq!(entry.metadata["paragraphs"], serde_json::json!(2));
        assert_eq!(entry.metadata["tables"], serde_json::json!(0));
        assert_eq!(entry.metadata["has_images"], serde_json::json!(false));
        assert!(entry.tags.contains(&"word".to_string()));
        assert!(entry.tags.contains(&"document".to_string()));
    }

    #[test]
    fn test_table_rendered_as_pipe_rows() {
        let table = "<w:tbl>\
            <w:tr><w:tc><w:p><w:r><w:t>Name</w:t></w:r></w:p></w:tc>\
                  <w:tc><w:p><w:r><w:t>Qty</w:t></w:r></w:p></w:tc></w:tr>\
            <w:tr><w:tc><w:p><w:r><w:t>bolt</w:t></w:r></w:p></w:tc>\
                  <w:tc><w:p><w:r><w:t>40</w:t></w:r></w:p></w:tc></w:tr>\
            </w:tbl>";
        let body = format!("{}{}", para("Stock list follows."), table);
        let entries = extract_fixture(&body);

        let entry = &entries[0];
        assert!(entry.content.contains("--- Tables ---"));
        assert!(entry.content.contains("Name | Qty"));
        assert!(entry.content.contains("bolt | 40"));
        assert_eq!(entry.metadata["tables"], serde_json::json!(1));
        // Cell text does not leak into body paragraphs
        assert_eq!(entry.metadata["paragraphs"], serde_json::json!(1));
    }

    #[test]
    fn test_empty_table_rows_dropped_but_cells_kept() {
        let table = "<w:tbl>\
            <w:tr><w:tc><w:p><w:r><w:t>a</w:t></w:r></w:p></w:tc>\
                  <w:tc><w:p></w:p></w:tc></w:tr>\
            <w:tr><w:tc><w:p></w:p></w:tc>\
                  <w:tc><w:p></w:p></w:tc></w:tr>\
            </w:tbl>";
        let entries = extract_fixture(table);

        // Second row is entirely empty and vanishes; the empty cell of the
        // first row keeps its column slot.
        assert!(entries[0].content.contains("a | "));
        assert!(!entries[0].content.contains("\n | \n"));
    }

    #[test]
    fn test_sections_split_on_headings() {
        let body = format!(
            "{}{}{}{}",
            para("INTRODUCTION"),
            para("Some opening words."),
            para("NEXT STEPS"),
            para("Closing words.")
        );
        let entries = extract_fixture(&body);

        let chunks = &entries[0].chunks;
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].id, "section_0");
        assert!(chunks[0].content.starts_with("INTRODUCTION"));
        assert!(chunks[1].content.starts_with("NEXT STEPS"));
        assert_eq!(chunks[1].chunk_index, 1);
        assert_eq!(chunks[1].total_chunks, 2);
    }

    #[test]
    fn test_heading_detection() {
        assert!(looks_like_heading("INTRODUCTION"));
        assert!(looks_like_heading("### Notes"));
        assert!(looks_like_heading("123 Step"));
        assert!(!looks_like_heading("1.2 Title"));
        assert!(!looks_like_heading("Introduction"));
        assert!(!looks_like_heading("AB"));
    }

    #[test]
    fn test_content_without_headings_is_one_chunk() {
        let entries = extract_fixture(&para("just a line of lowercase text"));
        assert_eq!(entries[0].chunks.len(), 1);
        assert_eq!(entries[0].chunks[0].total_chunks, 1);
    }

    #[test]
    fn test_media_entries_set_has_images() {
        let mut buf = Vec::new();
        {
            let mut zip = zip::ZipWriter::new(std::io::Cursor::new(&mut buf));
            zip.start_file(
                "word/document.xml",
                zip::write::SimpleFileOptions::default(),
            )
            .unwrap();
            let xml = format!(
                "<?xml version=\"1.0\"?><w:document xmlns:w=\"{}\"><w:body>{}</w:body></w:document>",
                W_NS,
                para("With a picture.")
            );
            zip.write_all(xml.as_bytes()).unwrap();
            zip.start_file(
                "word/media/image1.png",
                zip::write::SimpleFileOptions::default(),
            )
            .unwrap();
            zip.write_all(&[0u8; 8]).unwrap();
            zip.finish().unwrap();
        }
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pic.docx");
        std::fs::write(&path, buf).unwrap();

        let desc = descriptor::build(&path, classify::classify(&path)).unwrap();
        let entries = extract(&desc, &Config::default(), &SilentReporter).unwrap();
        assert_eq!(entries[0].metadata["has_images"], serde_json::json!(true));
    }

    #[test]
    fn test_invalid_zip_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.docx");
        std::fs::write(&path, b"not a zip").unwrap();

        let desc = descriptor::build(&path, classify::classify(&path)).unwrap();
        assert!(extract(&desc, &Config::default(), &SilentReporter).is_err());
    }
}
