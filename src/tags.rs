//! Keyword-based content tagger.
//!
//! Pure function from content to a deduplicated, sorted set of lowercase
//! tags. Matching is case-insensitive substring search against a static
//! domain vocabulary (mainframe systems plus common document kinds).
//! Callers seed the set with format-specific tags; the detected sub-type
//! is always part of the seed.

use std::collections::BTreeSet;

/// Domain vocabulary scanned in every document.
///
/// Mainframe terms dominate because the knowledge bases this pipeline
/// feeds are built from legacy-system documentation.
static DOMAIN_VOCABULARY: &[&str] = &[
    "mainframe",
    "cobol",
    "jcl",
    "cics",
    "db2",
    "ims",
    "vsam",
    "rexx",
    "racf",
    "tso",
    "ispf",
    "sdsf",
    "sort",
    "idcams",
    "batch",
    "online",
    "manual",
    "guide",
    "tutorial",
    "specification",
    "documentation",
];

/// Derive tags for a piece of content.
///
/// `seed_tags` carries the caller's fixed tags (the detected sub-type,
/// format markers like `excel` or `pdf`, a sheet name). Seeds are
/// lowercased and deduplicated along with every vocabulary hit. Output is
/// sorted so identical input always yields the identical tag list.
pub fn extract_tags(content: &str, seed_tags: &[&str]) -> Vec<String> {
    let mut tags: BTreeSet<String> = BTreeSet::new();

    for seed in seed_tags {
        let seed = seed.trim();
        if !seed.is_empty() {
            tags.insert(seed.to_lowercase());
        }
    }

    let haystack = content.to_lowercase();
    for word in DOMAIN_VOCABULARY {
        if haystack.contains(word) {
            tags.insert((*word).to_string());
        }
    }

    tags.into_iter().collect()
}
