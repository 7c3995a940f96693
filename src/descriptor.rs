//! Shared file-descriptor builder.
//!
//! Every extractor starts from the same per-file metadata: stat fields,
//! timestamps, a MIME guess, and a SHA-256 checksum streamed over the file
//! in fixed-size blocks. The checksum doubles as the stable document
//! identifier, so it must be byte-exact and repeatable.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::models::{DocumentCategory, FileDescriptor};

const CHECKSUM_BLOCK_SIZE: usize = 8192;

/// Build the descriptor for a file: stat, timestamps, MIME guess, checksum.
///
/// Optional fields (`author`, `page_count`, `encoding`, ...) start empty;
/// extractors that learn them fill them in.
pub fn build(path: &Path, category: DocumentCategory) -> Result<FileDescriptor> {
    let metadata = std::fs::metadata(path)
        .with_context(|| format!("Failed to stat file: {}", path.display()))?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let absolute = path
        .canonicalize()
        .unwrap_or_else(|_| path.to_path_buf());

    let mime_type = mime_guess::from_path(path)
        .first_or_octet_stream()
        .to_string();

    let created_at = metadata.created().ok().map(DateTime::<Utc>::from);
    let modified_at = metadata.modified().ok().map(DateTime::<Utc>::from);

    let checksum = compute_checksum(path)?;

    Ok(FileDescriptor {
        name,
        path: absolute,
        size_bytes: metadata.len(),
        category,
        mime_type,
        created_at,
        modified_at,
        checksum,
        author: None,
        title: None,
        language: None,
        page_count: None,
        word_count: None,
        encoding: None,
        has_tables: false,
        has_images: false,
        has_attachments: false,
    })
}

/// SHA-256 over the full byte stream, hex encoded.
///
/// Streams in fixed-size blocks so large files never load whole.
pub fn compute_checksum(path: &Path) -> Result<String> {
    let mut file = File::open(path)
        .with_context(|| format!("Failed to open file for checksum: {}", path.display()))?;

    let mut hasher = Sha256::new();
    let mut buf = [0u8; CHECKSUM_BLOCK_SIZE];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}
