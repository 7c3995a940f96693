//! Content chunking for oversized documents.
//!
//! Extracted text is cut into [`ContentChunk`]s at paragraph boundaries
//! (`\n\n`), packing consecutive paragraphs until the configured character
//! limit would be crossed. A paragraph that alone exceeds the limit is
//! kept whole in its own chunk, never split mid-paragraph.
//!
//! `total_chunks` is back-filled once per document after the full set is
//! known. Extractors that emit naturally segmented chunks (rows, pages,
//! sections) reuse [`finalize_totals`] for the same back-fill.

use serde_json::{Map, Value};

use crate::models::ContentChunk;

/// Cut content into paragraph-packed chunks of at most `target_chars`
/// characters each. Indices are contiguous from 0 and `total_chunks` is
/// already filled in on return.
pub fn chunk_content(document_id: &str, content: &str, target_chars: usize) -> Vec<ContentChunk> {
    let mut pieces: Vec<String> = Vec::new();
    let mut pending = String::new();

    let paragraphs = content
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty());
    for paragraph in paragraphs {
        // Counting the joining "\n\n" keeps the packed piece under the limit
        if !pending.is_empty() && pending.len() + 2 + paragraph.len() > target_chars {
            pieces.push(std::mem::take(&mut pending));
        }
        if paragraph.len() > target_chars {
            // A paragraph above the limit stays whole in its own chunk
            pieces.push(paragraph.to_string());
            continue;
        }
        if !pending.is_empty() {
            pending.push_str("\n\n");
        }
        pending.push_str(paragraph);
    }
    if !pending.is_empty() {
        pieces.push(pending);
    }
    // Whitespace-only input still produces one (empty) chunk
    if pieces.is_empty() {
        pieces.push(content.trim().to_string());
    }

    let mut chunks: Vec<ContentChunk> = pieces
        .iter()
        .enumerate()
        .map(|(index, piece)| build_chunk(document_id, index, piece))
        .collect();
    finalize_totals(&mut chunks);
    chunks
}

/// Back-fill `total_chunks` on a completed chunk set. The only mutation a
/// chunk sees after construction.
pub fn finalize_totals(chunks: &mut [ContentChunk]) {
    let total = chunks.len();
    for chunk in chunks.iter_mut() {
        chunk.total_chunks = total;
    }
}

fn build_chunk(document_id: &str, index: usize, content: &str) -> ContentChunk {
    let mut metadata = Map::new();
    metadata.insert("size".to_string(), Value::from(content.len()));

    ContentChunk {
        id: format!("chunk_{}", index),
        document_id: document_id.to_string(),
        content: content.to_string(),
        content_type: "text".to_string(),
        chunk_index: index,
        total_chunks: 0,
        metadata,
        embedding_text: content.to_string(),
    }
}
