//! Extension-based document classification.
//!
//! Maps a file path to exactly one [`DocumentCategory`] by longest match on
//! the lowercased file extension against a static table. Unmapped
//! extensions (and extension-less names) classify as `Unknown`. No content
//! sniffing; classification is pure and never fails.

use std::path::Path;

use crate::models::DocumentCategory;

/// Extension suffixes (leading dot included) and their categories.
///
/// Multi-part suffixes like `.tar.gz` coexist with their tails; the
/// classifier picks the longest suffix that matches, so `backup.tar.gz`
/// is an archive via `.tar.gz`, not `.gz`.
static EXTENSION_TABLE: &[(&str, DocumentCategory)] = &[
    (".xlsx", DocumentCategory::Tabular),
    (".xls", DocumentCategory::Tabular),
    (".xlsm", DocumentCategory::Tabular),
    (".csv", DocumentCategory::Tabular),
    (".tsv", DocumentCategory::Tabular),
    (".ods", DocumentCategory::Tabular),
    (".pdf", DocumentCategory::Pdf),
    (".docx", DocumentCategory::WordProcessor),
    (".doc", DocumentCategory::WordProcessor),
    (".odt", DocumentCategory::WordProcessor),
    (".rtf", DocumentCategory::WordProcessor),
    (".pptx", DocumentCategory::Presentation),
    (".ppt", DocumentCategory::Presentation),
    (".odp", DocumentCategory::Presentation),
    (".png", DocumentCategory::Image),
    (".jpg", DocumentCategory::Image),
    (".jpeg", DocumentCategory::Image),
    (".gif", DocumentCategory::Image),
    (".bmp", DocumentCategory::Image),
    (".tiff", DocumentCategory::Image),
    (".tif", DocumentCategory::Image),
    (".webp", DocumentCategory::Image),
    (".txt", DocumentCategory::Text),
    (".md", DocumentCategory::Text),
    (".markdown", DocumentCategory::Text),
    (".json", DocumentCategory::Text),
    (".yaml", DocumentCategory::Text),
    (".yml", DocumentCategory::Text),
    (".xml", DocumentCategory::Text),
    (".log", DocumentCategory::Text),
    (".cfg", DocumentCategory::Text),
    (".conf", DocumentCategory::Text),
    (".ini", DocumentCategory::Text),
    (".toml", DocumentCategory::Text),
    (".rst", DocumentCategory::Text),
    (".eml", DocumentCategory::Email),
    (".msg", DocumentCategory::Email),
    (".html", DocumentCategory::Html),
    (".htm", DocumentCategory::Html),
    (".py", DocumentCategory::Code),
    (".js", DocumentCategory::Code),
    (".ts", DocumentCategory::Code),
    (".java", DocumentCategory::Code),
    (".c", DocumentCategory::Code),
    (".cpp", DocumentCategory::Code),
    (".h", DocumentCategory::Code),
    (".rs", DocumentCategory::Code),
    (".go", DocumentCategory::Code),
    (".rb", DocumentCategory::Code),
    (".php", DocumentCategory::Code),
    (".sh", DocumentCategory::Code),
    (".sql", DocumentCategory::Code),
    (".cbl", DocumentCategory::Code),
    (".cob", DocumentCategory::Code),
    (".jcl", DocumentCategory::Code),
    (".cpy", DocumentCategory::Code),
    (".zip", DocumentCategory::Archive),
    (".tar", DocumentCategory::Archive),
    (".gz", DocumentCategory::Archive),
    (".tar.gz", DocumentCategory::Archive),
    (".rar", DocumentCategory::Archive),
    (".7z", DocumentCategory::Archive),
];

/// Classify a file path into a document category.
pub fn classify(path: &Path) -> DocumentCategory {
    let name = match path.file_name().and_then(|n| n.to_str()) {
        Some(n) => n.to_ascii_lowercase(),
        None => return DocumentCategory::Unknown,
    };

    let mut best: Option<(&str, DocumentCategory)> = None;
    for &(suffix, category) in EXTENSION_TABLE {
        // A bare dotfile like `.gz` has no stem and stays unclassified.
        if name.len() > suffix.len() && name.ends_with(suffix) {
            match best {
                Some((prev, _)) if prev.len() >= suffix.len() => {}
                _ => best = Some((suffix, category)),
            }
        }
    }

    best.map(|(_, category)| category)
        .unwrap_or(DocumentCategory::Unknown)
}

/// The full extension table, for listing supported formats.
pub fn supported_extensions() -> &'static [(&'static str, DocumentCategory)] {
    EXTENSION_TABLE
}
