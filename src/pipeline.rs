//! Pipeline orchestration: walk, classify, extract, collect.
//!
//! Files are processed one at a time; no state is shared across files.
//! A dedicated extractor that fails sends the file through the plain-text
//! extractor before giving up, so the worst case for any single file is a
//! failure report and an empty entry list, never an aborted run.

use anyhow::{bail, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::Config;
use crate::models::{DocumentCategory, KnowledgeBaseEntry};
use crate::ocr::{self, TextRecognizer};
use crate::report::{PipelineEvent, PipelineReporter};
use crate::{
    classify, descriptor, extract_image, extract_pdf, extract_tabular, extract_text, extract_word,
};

/// Aggregate result of one pipeline invocation.
#[derive(Debug, Default)]
pub struct RunOutcome {
    pub entries: Vec<KnowledgeBaseEntry>,
    pub files_processed: u64,
    pub files_failed: u64,
}

/// Process a file or directory into knowledge-base entries.
pub fn run(
    config: &Config,
    input: &Path,
    recursive: bool,
    limit: Option<usize>,
    reporter: &dyn PipelineReporter,
) -> Result<RunOutcome> {
    if !input.exists() {
        bail!("Input path does not exist: {}", input.display());
    }
    let recognizer = ocr::create_recognizer(&config.ocr)?;

    let mut files = if input.is_dir() {
        collect_files(config, input, recursive, reporter)?
    } else {
        vec![input.to_path_buf()]
    };
    if let Some(lim) = limit {
        files.truncate(lim);
    }

    let total = files.len() as u64;
    let mut outcome = RunOutcome::default();
    for (i, path) in files.iter().enumerate() {
        reporter.report(PipelineEvent::Processing {
            path: path.display().to_string(),
            n: i as u64 + 1,
            total,
        });
        match process_file(path, config, recognizer.as_ref(), reporter) {
            Ok(entries) => {
                outcome.files_processed += 1;
                outcome.entries.extend(entries);
            }
            Err(err) => {
                outcome.files_failed += 1;
                reporter.report(PipelineEvent::Failed {
                    path: path.display().to_string(),
                    error: format!("{:#}", err),
                });
            }
        }
    }
    Ok(outcome)
}

/// Classify and extract a single file.
///
/// Categories without a dedicated extractor go straight to the plain-text
/// extractor; dedicated extractors that fail are retried as plain text
/// with a degradation report.
pub fn process_file(
    path: &Path,
    config: &Config,
    recognizer: &dyn TextRecognizer,
    reporter: &dyn PipelineReporter,
) -> Result<Vec<KnowledgeBaseEntry>> {
    let category = classify::classify(path);
    let desc = descriptor::build(path, category)?;

    let primary = match desc.category {
        DocumentCategory::Tabular => extract_tabular::extract(&desc, config, reporter),
        DocumentCategory::Pdf => extract_pdf::extract(&desc, config, reporter),
        DocumentCategory::WordProcessor => extract_word::extract(&desc, config, reporter),
        DocumentCategory::Image => extract_image::extract(&desc, config, recognizer, reporter),
        _ => return extract_text::extract(&desc, config, reporter),
    };

    match primary {
        Ok(entries) => Ok(entries),
        Err(err) => {
            reporter.report(PipelineEvent::Degraded {
                path: desc.path.display().to_string(),
                detail: format!(
                    "{} extraction failed ({:#}), retrying as plain text",
                    desc.category, err
                ),
            });
            extract_text::extract(&desc, config, reporter)
        }
    }
}

/// Enumerate candidate files under a directory, sorted for deterministic
/// ordering. Include/exclude globs match paths relative to the root.
fn collect_files(
    config: &Config,
    root: &Path,
    recursive: bool,
    reporter: &dyn PipelineReporter,
) -> Result<Vec<PathBuf>> {
    let include_set = build_globset(&config.walk.include_globs)?;

    let mut default_excludes = vec![
        "**/.git/**".to_string(),
        "**/target/**".to_string(),
        "**/node_modules/**".to_string(),
    ];
    default_excludes.extend(config.walk.exclude_globs.clone());
    let exclude_set = build_globset(&default_excludes)?;

    let mut walker = WalkDir::new(root).follow_links(config.walk.follow_symlinks);
    if !recursive {
        walker = walker.max_depth(1);
    }

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                reporter.report(PipelineEvent::Failed {
                    path: err
                        .path()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| root.display().to_string()),
                    error: err.to_string(),
                });
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        let rel_str = relative.to_string_lossy().to_string();

        if exclude_set.is_match(&rel_str) {
            continue;
        }
        if !include_set.is_match(&rel_str) {
            continue;
        }

        files.push(path.to_path_buf());
    }

    files.sort();
    Ok(files)
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::SilentReporter;
    use std::fs;

    #[test]
    fn test_text_file_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, "mainframe batch runbook\n\nrestart the job").unwrap();

        let config = Config::default();
        let recognizer = ocr::create_recognizer(&config.ocr).unwrap();
        let entries =
            process_file(&path, &config, recognizer.as_ref(), &SilentReporter).unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].document_type, "text");
        assert!(entries[0].tags.contains(&"mainframe".to_string()));
        assert!(entries[0].tags.contains(&"batch".to_string()));
    }

    #[test]
    fn test_corrupt_pdf_falls_back_to_plain_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        fs::write(&path, "not a pdf at all").unwrap();

        let config = Config::default();
        let recognizer = ocr::create_recognizer(&config.ocr).unwrap();
        let entries =
            process_file(&path, &config, recognizer.as_ref(), &SilentReporter).unwrap();

        // Both PDF strategies fail on this, so the text extractor takes over
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].document_type, "text");
        assert_eq!(entries[0].confidence_score, 0.95);
    }

    #[test]
    fn test_unknown_extension_routes_to_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.zzz");
        fs::write(&path, "plain words").unwrap();

        let config = Config::default();
        let recognizer = ocr::create_recognizer(&config.ocr).unwrap();
        let entries =
            process_file(&path, &config, recognizer.as_ref(), &SilentReporter).unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_directory_flat_skips_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "top").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("b.txt"), "nested").unwrap();

        let config = Config::default();
        let flat = run(&config, dir.path(), false, None, &SilentReporter).unwrap();
        assert_eq!(flat.files_processed, 1);

        let deep = run(&config, dir.path(), true, None, &SilentReporter).unwrap();
        assert_eq!(deep.files_processed, 2);
    }

    #[test]
    fn test_limit_truncates_sorted_file_list() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "first").unwrap();
        fs::write(dir.path().join("b.txt"), "second").unwrap();
        fs::write(dir.path().join("c.txt"), "third").unwrap();

        let config = Config::default();
        let outcome = run(&config, dir.path(), false, Some(1), &SilentReporter).unwrap();
        assert_eq!(outcome.files_processed, 1);
        assert!(outcome.entries[0].content.contains("first"));
    }

    #[test]
    fn test_exclude_globs_and_git_dir_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("keep.txt"), "keep").unwrap();
        fs::write(dir.path().join("drop.log"), "drop").unwrap();
        fs::create_dir_all(dir.path().join(".git")).unwrap();
        fs::write(dir.path().join(".git").join("HEAD"), "ref: x").unwrap();

        let mut config = Config::default();
        config.walk.exclude_globs = vec!["**/*.log".to_string()];

        let outcome = run(&config, dir.path(), true, None, &SilentReporter).unwrap();
        assert_eq!(outcome.files_processed, 1);
        assert!(outcome.entries[0].source.contains("keep.txt"));
    }

    #[test]
    fn test_missing_input_is_an_error() {
        let config = Config::default();
        let result = run(
            &config,
            Path::new("/no/such/path"),
            false,
            None,
            &SilentReporter,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_entries_are_idempotent_across_runs() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "stable content").unwrap();

        let config = Config::default();
        let first = run(&config, dir.path(), false, None, &SilentReporter).unwrap();
        let second = run(&config, dir.path(), false, None, &SilentReporter).unwrap();

        let first_ids: Vec<_> = first.entries.iter().map(|e| e.uuid.clone()).collect();
        let second_ids: Vec<_> = second.entries.iter().map(|e| e.uuid.clone()).collect();
        assert_eq!(first_ids, second_ids);
    }
}
