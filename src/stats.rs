//! Run summary printed after processing.
//!
//! Gives a quick read on what a run produced: file counts, entry and
//! chunk totals, and per-category / per-document-type breakdowns.

use std::collections::HashMap;

use crate::models::KnowledgeBaseEntry;
use crate::pipeline::RunOutcome;

/// Print the post-run summary to stdout.
pub fn print_summary(outcome: &RunOutcome) {
    let total_chunks: usize = outcome.entries.iter().map(|e| e.chunks.len()).sum();

    println!("Document Processing Summary");
    println!("===========================");
    println!();
    println!("  Files processed: {}", outcome.files_processed);
    if outcome.files_failed > 0 {
        println!("  Files failed:    {}", outcome.files_failed);
    }
    println!("  Entries:         {}", outcome.entries.len());
    println!("  Chunks:          {}", total_chunks);

    let by_category = count_by(&outcome.entries, |e| e.category.to_string());
    if !by_category.is_empty() {
        println!();
        println!("  By category:");
        for (name, count) in &by_category {
            println!("    {:<16} {:>6}", name, count);
        }
    }

    let by_type = count_by(&outcome.entries, |e| e.document_type.clone());
    if !by_type.is_empty() {
        println!();
        println!("  By document type:");
        for (name, count) in &by_type {
            println!("    {:<16} {:>6}", name, count);
        }
    }
    println!();
}

/// Count entries by a key, most frequent first; ties break by name so
/// output is stable across runs.
fn count_by<F>(entries: &[KnowledgeBaseEntry], key: F) -> Vec<(String, usize)>
where
    F: Fn(&KnowledgeBaseEntry) -> String,
{
    let mut counts: HashMap<String, usize> = HashMap::new();
    for entry in entries {
        *counts.entry(key(entry)).or_insert(0) += 1;
    }
    let mut sorted: Vec<(String, usize)> = counts.into_iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    sorted
}
