//! Knowledge-base entry assembly.
//!
//! Extractors describe what they found as an [`EntryDraft`]; the assembler
//! turns a draft into the canonical [`KnowledgeBaseEntry`]: it derives the
//! deterministic entry id from the document checksum, runs the tagger over
//! the content, and wires in the file-level fields (source name, category,
//! creator tag). Identical input bytes always produce identical entry ids,
//! so re-ingesting an unchanged file upserts rather than duplicates.

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::models::{ContentChunk, FileDescriptor, KnowledgeBaseEntry};
use crate::tags;

/// Creator tag stamped on every entry this pipeline produces.
pub const CREATED_BY: &str = "auto_import";

/// Disambiguator used for whole-document entries.
pub const DOCUMENT_DISAMBIGUATOR: &str = "document";

/// Deterministic entry id: UUIDv5 over `<checksum>/<disambiguator>`.
///
/// The disambiguator separates the several entries one file can produce
/// (a sheet name, `table_3`, `page_2`, `ocr`, or
/// [`DOCUMENT_DISAMBIGUATOR`] for the whole-document entry).
pub fn entry_uuid(checksum: &str, disambiguator: &str) -> String {
    let name = format!("{}/{}", checksum, disambiguator);
    Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes()).to_string()
}

/// Truncate content to a character budget for the summary field.
///
/// Operates on characters, not bytes, so multi-byte text never splits
/// inside a code point.
pub fn summarize(content: &str, max_chars: usize) -> String {
    if content.chars().count() <= max_chars {
        return content.to_string();
    }
    content.chars().take(max_chars).collect()
}

/// What an extractor hands the assembler for one entry.
pub struct EntryDraft {
    pub disambiguator: String,
    pub title: String,
    pub content: String,
    pub summary: String,
    /// Fixed tags for this entry kind; the tagger adds vocabulary hits.
    pub seed_tags: Vec<String>,
    pub confidence: f64,
    pub document_type: String,
    pub metadata: Map<String, Value>,
    pub chunks: Vec<ContentChunk>,
}

impl EntryDraft {
    /// Finalize the draft into a canonical entry.
    pub fn assemble(self, desc: &FileDescriptor) -> KnowledgeBaseEntry {
        let seeds: Vec<&str> = self.seed_tags.iter().map(|s| s.as_str()).collect();
        let tags = tags::extract_tags(&self.content, &seeds);

        KnowledgeBaseEntry {
            uuid: entry_uuid(&desc.checksum, &self.disambiguator),
            title: self.title,
            content: self.content,
            summary: self.summary,
            category: desc.category,
            tags,
            confidence_score: self.confidence,
            source: desc.name.clone(),
            document_type: self.document_type,
            metadata: self.metadata,
            chunks: self.chunks,
            created_by: CREATED_BY.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DocumentCategory;
    use std::path::PathBuf;

    fn sample_descriptor() -> FileDescriptor {
        FileDescriptor {
            name: "report.txt".to_string(),
            path: PathBuf::from("/data/report.txt"),
            size_bytes: 42,
            category: DocumentCategory::Text,
            mime_type: "text/plain".to_string(),
            created_at: None,
            modified_at: None,
            checksum: "ab".repeat(32),
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

    #[test]
    fn test_entry_uuid_is_deterministic() {
        let a = entry_uuid("abc123", "Sheet1_0");
        let b = entry_uuid("abc123", "Sheet1_0");
        assert_eq!(a, b);
    }

    #[test]
    fn test_entry_uuid_varies_with_inputs() {
        let base = entry_uuid("abc123", "Sheet1_0");
        assert_ne!(base, entry_uuid("abc123", "Sheet1_1"));
        assert_ne!(base, entry_uuid("def456", "Sheet1_0"));
    }

    #[test]
    fn test_summarize_short_content_unchanged() {
        assert_eq!(summarize("short", 500), "short");
    }

    #[test]
    fn test_summarize_truncates_on_char_boundary() {
        let content = "déjà vu ".repeat(100);
        let summary = summarize(&content, 500);
        assert_eq!(summary.chars().count(), 500);
        assert!(content.starts_with(&summary));
    }

    #[test]
    fn test_assemble_wires_file_fields() {
        let desc = sample_descriptor();
        let entry = EntryDraft {
            disambiguator: DOCUMENT_DISAMBIGUATOR.to_string(),
            title: "Report".to_string(),
            content: "plain cics content".to_string(),
            summary: "plain".to_string(),
            seed_tags: vec!["text".to_string()],
            confidence: 0.95,
            document_type: "text".to_string(),
            metadata: Map::new(),
            chunks: Vec::new(),
        }
        .assemble(&desc);

        assert_eq!(entry.uuid, entry_uuid(&desc.checksum, "document"));
        assert_eq!(entry.source, "report.txt");
        assert_eq!(entry.category, DocumentCategory::Text);
        assert_eq!(entry.created_by, CREATED_BY);
        assert!(entry.tags.contains(&"text".to_string()));
        assert!(entry.tags.contains(&"cics".to_string()));
    }
}
