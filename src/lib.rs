//! # Docmill
//!
//! A multi-format document ingestion pipeline for searchable knowledge bases.
//!
//! Docmill classifies input files by extension, applies a format-specific
//! extraction strategy with graceful degradation (table-aware PDF reading
//! falls back to a structural pass, unknown formats fall back to plain text),
//! chunks large content, tags it against a domain vocabulary, and assembles
//! deterministic knowledge-base entries for export as JSON or SQL.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌───────────────┐   ┌───────────────┐   ┌──────────┐
//! │ Classify │──▶│  Extractors    │──▶│ Chunk + Tag    │──▶│ Assemble  │
//! │ by ext   │   │ xlsx/pdf/docx │   │               │   │ (UUIDv5) │
//! └──────────┘   │ image/text    │   └───────────────┘   └────┬─────┘
//!                └───────┬───────┘                            │
//!                        │ fallback                     ┌─────┴─────┐
//!                        ▼                              ▼           ▼
//!                 ┌────────────┐                  ┌─────────┐ ┌─────────┐
//!                 │ Plain text │                  │  JSON   │ │   SQL   │
//!                 └────────────┘                  └─────────┘ └─────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! docmill process report.xlsx             # one file -> kb_output/kb_entries.json
//! docmill process ./docs -r --sql         # directory tree, JSON + SQL artifacts
//! docmill inspect handbook.pdf            # show descriptor and entries
//! docmill formats                         # list supported extensions
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`classify`] | Extension-based category detection |
//! | [`descriptor`] | File metadata and checksums |
//! | [`extract_tabular`] | Excel and CSV extraction |
//! | [`extract_pdf`] | PDF extraction with structural fallback |
//! | [`extract_word`] | Word document extraction |
//! | [`extract_image`] | Image descriptors and OCR |
//! | [`extract_text`] | Plain-text extraction, the universal fallback |
//! | [`chunk`] | Content chunking |
//! | [`tags`] | Domain-vocabulary tagging |
//! | [`assemble`] | Entry assembly and deterministic UUIDs |
//! | [`pipeline`] | File and directory orchestration |
//! | [`export`] | JSON and SQL artifact emission |

pub mod assemble;
pub mod chunk;
pub mod classify;
pub mod config;
pub mod descriptor;
pub mod export;
pub mod extract_image;
pub mod extract_pdf;
pub mod extract_tabular;
pub mod extract_text;
pub mod extract_word;
pub mod models;
pub mod ocr;
pub mod pipeline;
pub mod report;
pub mod stats;
pub mod tags;
