//! Artifact emitters for processed entries.
//!
//! `kb_entries.json` carries the full entry list with nested chunks for
//! JSON consumers. `insert_kb.sql` is a PostgreSQL upsert script for a
//! `knowledge_base` table keyed by `uuid`; re-running it refreshes
//! content without duplicating rows.

use anyhow::{Context, Result};
use std::path::Path;

use crate::models::KnowledgeBaseEntry;

/// JSON artifact filename inside the output directory.
pub const JSON_FILENAME: &str = "kb_entries.json";
/// SQL artifact filename inside the output directory.
pub const SQL_FILENAME: &str = "insert_kb.sql";

/// Write the entry list as pretty-printed JSON.
pub fn write_json(entries: &[KnowledgeBaseEntry], path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(entries)?;
    write_artifact(path, &json)
}

/// Write the PostgreSQL upsert script.
pub fn write_sql(entries: &[KnowledgeBaseEntry], path: &Path) -> Result<()> {
    let sql = render_sql(entries)?;
    write_artifact(path, &sql)
}

fn write_artifact(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

/// Render the full SQL script: header, transaction, one upsert per entry.
pub fn render_sql(entries: &[KnowledgeBaseEntry]) -> Result<String> {
    let mut lines = vec![
        "-- Knowledge base insert script".to_string(),
        format!("-- Generated at: {}", chrono::Utc::now().to_rfc3339()),
        format!("-- Total entries: {}", entries.len()),
        String::new(),
        "BEGIN;".to_string(),
        String::new(),
    ];

    for entry in entries {
        lines.push(render_insert(entry)?);
    }

    lines.push(String::new());
    lines.push("COMMIT;".to_string());
    lines.push(String::new());
    Ok(lines.join("\n"))
}

fn render_insert(entry: &KnowledgeBaseEntry) -> Result<String> {
    let tags = format!("{{{}}}", entry.tags.join(","));
    let metadata = serde_json::to_string(&entry.metadata)?;

    Ok(format!(
        "INSERT INTO knowledge_base (\n    \
             uuid, title, content, summary, category, tags,\n    \
             confidence_score, source, metadata, created_by, created_at\n\
         ) VALUES (\n    \
             '{}', '{}', '{}', '{}',\n    \
             '{}', '{}', {},\n    \
             '{}', '{}'::jsonb, '{}', CURRENT_TIMESTAMP\n\
         ) ON CONFLICT (uuid) DO UPDATE SET\n    \
             content = EXCLUDED.content,\n    \
             updated_at = CURRENT_TIMESTAMP;\n",
        entry.uuid,
        escape(&entry.title),
        escape(&entry.content),
        escape(&entry.summary),
        entry.category,
        tags,
        entry.confidence_score,
        escape(&entry.source),
        escape(&metadata),
        entry.created_by,
    ))
}

/// Single quotes double for SQL string literals.
fn escape(text: &str) -> String {
    text.replace('\'', "''")
}
