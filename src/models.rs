//! Core data models used throughout docmill.
//!
//! These types represent the files, chunks, and knowledge-base entries that
//! flow through the ingestion pipeline. All of them serialize to the JSON
//! shapes consumed by downstream persistence.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::PathBuf;

/// Closed set of document categories assigned by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentCategory {
    Tabular,
    Pdf,
    WordProcessor,
    Presentation,
    Image,
    Text,
    Email,
    Html,
    Code,
    Archive,
    Unknown,
}

impl DocumentCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentCategory::Tabular => "tabular",
            DocumentCategory::Pdf => "pdf",
            DocumentCategory::WordProcessor => "word_processor",
            DocumentCategory::Presentation => "presentation",
            DocumentCategory::Image => "image",
            DocumentCategory::Text => "text",
            DocumentCategory::Email => "email",
            DocumentCategory::Html => "html",
            DocumentCategory::Code => "code",
            DocumentCategory::Archive => "archive",
            DocumentCategory::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for DocumentCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-file metadata computed once before extraction.
///
/// Immutable after construction except for `encoding`, which the text
/// extractor back-fills with the charset that actually decoded the bytes.
#[derive(Debug, Clone, Serialize)]
pub struct FileDescriptor {
    pub name: String,
    pub path: PathBuf,
    pub size_bytes: u64,
    pub category: DocumentCategory,
    pub mime_type: String,
    pub created_at: Option<DateTime<Utc>>,
    pub modified_at: Option<DateTime<Utc>>,
    /// SHA-256 of the full byte stream, hex encoded. Stable document id.
    pub checksum: String,
    pub author: Option<String>,
    pub title: Option<String>,
    pub language: Option<String>,
    pub page_count: Option<usize>,
    pub word_count: Option<usize>,
    pub encoding: Option<String>,
    pub has_tables: bool,
    pub has_images: bool,
    pub has_attachments: bool,
}

/// A bounded unit of extracted content.
///
/// Created by the chunker, or directly by an extractor for naturally
/// segmented content (a spreadsheet row, a PDF page). `total_chunks` is
/// back-filled once per document after the full set is known; no other
/// field changes after construction.
#[derive(Debug, Clone, Serialize)]
pub struct ContentChunk {
    pub id: String,
    /// Checksum of the owning document.
    pub document_id: String,
    pub content: String,
    pub content_type: String,
    pub chunk_index: usize,
    pub total_chunks: usize,
    pub metadata: Map<String, Value>,
    /// Text handed to an external embedding step. Normally equals `content`.
    pub embedding_text: String,
}

/// The canonical normalized output record.
///
/// One physical file may yield several entries (one per spreadsheet row,
/// one per extracted PDF table, and so on); entries are never required to
/// be 1:1 with files.
#[derive(Debug, Clone, Serialize)]
pub struct KnowledgeBaseEntry {
    /// Deterministic id derived from the document checksum plus a
    /// disambiguator; identical input always yields the identical uuid.
    pub uuid: String,
    pub title: String,
    pub content: String,
    pub summary: String,
    pub category: DocumentCategory,
    pub tags: Vec<String>,
    pub confidence_score: f64,
    pub source: String,
    pub document_type: String,
    pub metadata: Map<String, Value>,
    pub chunks: Vec<ContentChunk>,
    pub created_by: String,
}
