//! Image extraction: one descriptor entry per image, plus an OCR entry
//! when a recognizer is configured and actually finds text.
//!
//! Only the image header is decoded (dimensions and format); pixels are
//! never loaded. A failing recognizer degrades to the descriptor entry
//! alone rather than losing the file.

use anyhow::{Context, Result};
use serde_json::{Map, Value};

use crate::assemble::{self, EntryDraft};
use crate::config::Config;
use crate::models::{FileDescriptor, KnowledgeBaseEntry};
use crate::ocr::TextRecognizer;
use crate::report::{PipelineEvent, PipelineReporter};

/// Extract an image into its descriptor entry and optional OCR entry.
pub fn extract(
    desc: &FileDescriptor,
    config: &Config,
    recognizer: &dyn TextRecognizer,
    reporter: &dyn PipelineReporter,
) -> Result<Vec<KnowledgeBaseEntry>> {
    let reader = image::ImageReader::open(&desc.path)
        .with_context(|| format!("Failed to open {}", desc.path.display()))?
        .with_guessed_format()
        .with_context(|| format!("Failed to probe {}", desc.path.display()))?;
    let format_label = match reader.format() {
        Some(format) => format!("{:?}", format).to_ascii_uppercase(),
        None => "UNKNOWN".to_string(),
    };
    let (width, height) = reader
        .into_dimensions()
        .with_context(|| format!("Unreadable image header: {}", desc.path.display()))?;

    let ocr_text = if recognizer.is_enabled() {
        match recognizer.recognize(&desc.path) {
            Ok(text) => Some(text),
            Err(err) => {
                reporter.report(PipelineEvent::Degraded {
                    path: desc.path.display().to_string(),
                    detail: format!("{} recognizer failed: {}", recognizer.name(), err),
                });
                None
            }
        }
    } else {
        None
    };
    let has_text = ocr_text
        .as_deref()
        .map(|t| !t.trim().is_empty())
        .unwrap_or(false);

    let mut metadata = Map::new();
    metadata.insert("width".to_string(), Value::from(width));
    metadata.insert("height".to_string(), Value::from(height));
    metadata.insert("format".to_string(), Value::from(format_label.clone()));
    metadata.insert("has_text".to_string(), Value::from(has_text));

    let mut entries = Vec::new();
    if let Some(text) = ocr_text {
        if !text.trim().is_empty() {
            entries.push(
                EntryDraft {
                    disambiguator: "ocr".to_string(),
                    title: format!("[OCR] {}", desc.name),
                    summary: assemble::summarize(&text, 500),
                    seed_tags: vec!["image".to_string(), "ocr".to_string()],
                    confidence: config.confidence.ocr,
                    document_type: "image_ocr".to_string(),
                    metadata: metadata.clone(),
                    chunks: Vec::new(),
                    content: format!("Text extracted from image:\n\n{}", text),
                }
                .assemble(desc),
            );
        }
    }

    entries.push(
        EntryDraft {
            disambiguator: assemble::DOCUMENT_DISAMBIGUATOR.to_string(),
            title: format!("[Image] {}", desc.name),
            summary: format!("{} image file ({}x{})", format_label, width, height),
            seed_tags: vec!["image".to_string(), format_label.to_ascii_lowercase()],
            confidence: config.confidence.image,
            document_type: "image".to_string(),
            metadata,
            chunks: Vec::new(),
            content: format!(
                "Image: {}\nDimensions: {}x{}\nFormat: {}",
                desc.name, width, height, format_label
            ),
        }
        .assemble(desc),
    );
    Ok(entries)
}
