//! Plain-text extraction.
//!
//! The widest extractor in the pipeline, and also its safety net: every
//! category without a dedicated extractor (and every extractor that fails
//! unrecoverably) routes here. Decoding walks the configured charset
//! ladder and keeps the first error-free decode; when nothing matches, the
//! bytes are decoded permissively with invalid sequences replaced.
//!
//! Decoded content is classified into a sub-type (`json`, `html`, `xml`,
//! `yaml`, `markdown`, `code`, `log`, `text`) by ordered first-match-wins
//! heuristics, and chunked when it exceeds the configured trigger size.

use anyhow::{Context, Result};
use serde_json::{Map, Value};

use crate::assemble::{self, EntryDraft};
use crate::chunk;
use crate::config::Config;
use crate::models::{FileDescriptor, KnowledgeBaseEntry};
use crate::report::PipelineReporter;

/// Sub-type assigned to decoded text content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSubType {
    Json,
    Html,
    Xml,
    Yaml,
    Markdown,
    Code,
    Log,
    Plain,
}

impl TextSubType {
    /// Display label used in entry titles.
    pub fn label(&self) -> &'static str {
        match self {
            TextSubType::Json => "JSON",
            TextSubType::Html => "HTML",
            TextSubType::Xml => "XML",
            TextSubType::Yaml => "YAML",
            TextSubType::Markdown => "Markdown",
            TextSubType::Code => "Code",
            TextSubType::Log => "Log",
            TextSubType::Plain => "Text",
        }
    }

    /// Lowercase form used as tag and document type.
    pub fn tag(&self) -> &'static str {
        match self {
            TextSubType::Json => "json",
            TextSubType::Html => "html",
            TextSubType::Xml => "xml",
            TextSubType::Yaml => "yaml",
            TextSubType::Markdown => "markdown",
            TextSubType::Code => "code",
            TextSubType::Log => "log",
            TextSubType::Plain => "text",
        }
    }
}

/// Extract a text file into a single document entry.
///
/// Back-fills `encoding` and `word_count` on its working copy of the
/// descriptor; those land in the entry metadata.
pub fn extract(
    desc: &FileDescriptor,
    config: &Config,
    _reporter: &dyn PipelineReporter,
) -> Result<Vec<KnowledgeBaseEntry>> {
    let raw = std::fs::read(&desc.path)
        .with_context(|| format!("Failed to read text file: {}", desc.path.display()))?;

    let (content, encoding) = decode_bytes(&raw, &config.text.encodings);

    let mut desc = desc.clone();
    desc.encoding = encoding;
    desc.word_count = Some(content.split_whitespace().count());

    let sub_type = detect_sub_type(&content);

    let chunks = if content.chars().count() > config.chunking.trigger_chars {
        chunk::chunk_content(&desc.checksum, &content, config.chunking.target_chars)
    } else {
        Vec::new()
    };

    let mut metadata = Map::new();
    metadata.insert(
        "lines".to_string(),
        Value::from(content.matches('\n').count() + 1),
    );
    metadata.insert(
        "characters".to_string(),
        Value::from(content.chars().count()),
    );
    metadata.insert(
        "words".to_string(),
        Value::from(desc.word_count.unwrap_or(0)),
    );
    metadata.insert(
        "encoding".to_string(),
        desc.encoding.clone().map(Value::from).unwrap_or(Value::Null),
    );
    metadata.insert(
        "content_type".to_string(),
        Value::from(sub_type.label()),
    );

    let entry = EntryDraft {
        disambiguator: assemble::DOCUMENT_DISAMBIGUATOR.to_string(),
        title: format!("[{}] {}", sub_type.label(), desc.name),
        summary: assemble::summarize(&content, 1000),
        seed_tags: vec![sub_type.tag().to_string()],
        confidence: config.confidence.text,
        document_type: sub_type.tag().to_string(),
        metadata,
        chunks,
        content,
    }
    .assemble(&desc);

    Ok(vec![entry])
}

/// Decode bytes under an ordered charset ladder.
///
/// Returns the decoded text and the label that decoded it cleanly, or
/// `None` when every candidate had errors and the permissive UTF-8
/// replacement decode was used instead.
pub fn decode_bytes(raw: &[u8], labels: &[String]) -> (String, Option<String>) {
    for label in labels {
        if let Some(encoding) = encoding_rs::Encoding::for_label(label.as_bytes()) {
            let (text, _, had_errors) = encoding.decode(raw);
            if !had_errors {
                return (text.into_owned(), Some(label.clone()));
            }
        }
    }
    (String::from_utf8_lossy(raw).into_owned(), None)
}

/// Ordered content heuristics; the first matching rule wins.
pub fn detect_sub_type(content: &str) -> TextSubType {
    let stripped = content.trim_start();

    if stripped.starts_with('{') || stripped.starts_with('[') {
        if serde_json::from_str::<Value>(content).is_ok() {
            return TextSubType::Json;
        }
    }

    if stripped.starts_with('<') {
        if content.to_lowercase().contains("<html") {
            return TextSubType::Html;
        }
        return TextSubType::Xml;
    }

    let head: String = content.chars().take(100).collect();
    if content.starts_with("---") || head.contains(": ") {
        return TextSubType::Yaml;
    }

    let markdown_markers = ["# ", "## ", "```", "](", "![]("];
    if markdown_markers.iter().any(|m| content.contains(m)) {
        return TextSubType::Markdown;
    }

    let code_markers = ["import ", "function ", "class ", "def ", "SELECT ", "CREATE TABLE"];
    if code_markers.iter().any(|m| content.contains(m)) {
        return TextSubType::Code;
    }

    let head: String = content.chars().take(1000).collect::<String>().to_lowercase();
    let log_markers = ["error", "warning", "info", "debug", "trace"];
    if log_markers.iter().any(|m| head.contains(m)) {
        return TextSubType::Log;
    }

    TextSubType::Plain
}
