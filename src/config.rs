use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default config location probed when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "config/docmill.toml";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub confidence: ConfidenceConfig,
    #[serde(default)]
    pub text: TextConfig,
    #[serde(default)]
    pub tabular: TabularConfig,
    #[serde(default)]
    pub ocr: OcrConfig,
    #[serde(default)]
    pub walk: WalkConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChunkingConfig {
    /// Content longer than this many characters gets chunked.
    #[serde(default = "default_trigger_chars")]
    pub trigger_chars: usize,
    /// Character budget per chunk.
    #[serde(default = "default_target_chars")]
    pub target_chars: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            trigger_chars: default_trigger_chars(),
            target_chars: default_target_chars(),
        }
    }
}

fn default_trigger_chars() -> usize {
    10_000
}
fn default_target_chars() -> usize {
    5_000
}

/// Per-format confidence scores stamped on entries.
///
/// These are policy constants, not measurements; lossier extraction paths
/// carry lower values so consumers can rank or filter on them.
#[derive(Debug, Deserialize, Clone)]
pub struct ConfidenceConfig {
    #[serde(default = "default_row_confidence")]
    pub row: f64,
    #[serde(default = "default_sheet_confidence")]
    pub sheet: f64,
    #[serde(default = "default_pdf_confidence")]
    pub pdf: f64,
    #[serde(default = "default_pdf_fallback_confidence")]
    pub pdf_fallback: f64,
    #[serde(default = "default_pdf_table_confidence")]
    pub pdf_table: f64,
    #[serde(default = "default_word_confidence")]
    pub word: f64,
    #[serde(default = "default_ocr_confidence")]
    pub ocr: f64,
    #[serde(default = "default_image_confidence")]
    pub image: f64,
    #[serde(default = "default_text_confidence")]
    pub text: f64,
}

impl Default for ConfidenceConfig {
    fn default() -> Self {
        Self {
            row: default_row_confidence(),
            sheet: default_sheet_confidence(),
            pdf: default_pdf_confidence(),
            pdf_fallback: default_pdf_fallback_confidence(),
            pdf_table: default_pdf_table_confidence(),
            word: default_word_confidence(),
            ocr: default_ocr_confidence(),
            image: default_image_confidence(),
            text: default_text_confidence(),
        }
    }
}

fn default_row_confidence() -> f64 {
    0.8
}
fn default_sheet_confidence() -> f64 {
    0.9
}
fn default_pdf_confidence() -> f64 {
    0.9
}
fn default_pdf_fallback_confidence() -> f64 {
    0.7
}
fn default_pdf_table_confidence() -> f64 {
    0.8
}
fn default_word_confidence() -> f64 {
    0.9
}
fn default_ocr_confidence() -> f64 {
    0.7
}
fn default_image_confidence() -> f64 {
    1.0
}
fn default_text_confidence() -> f64 {
    0.95
}

#[derive(Debug, Deserialize, Clone)]
pub struct TextConfig {
    /// Charset labels tried in order when decoding text files.
    #[serde(default = "default_encodings")]
    pub encodings: Vec<String>,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            encodings: default_encodings(),
        }
    }
}

fn default_encodings() -> Vec<String> {
    vec![
        "utf-8".to_string(),
        "latin1".to_string(),
        "cp1252".to_string(),
        "iso-8859-1".to_string(),
    ]
}

#[derive(Debug, Deserialize, Clone)]
pub struct TabularConfig {
    /// Leading data rows included in each sheet-summary entry.
    #[serde(default = "default_sample_rows")]
    pub sample_rows: usize,
}

impl Default for TabularConfig {
    fn default() -> Self {
        Self {
            sample_rows: default_sample_rows(),
        }
    }
}

fn default_sample_rows() -> usize {
    10
}

#[derive(Debug, Deserialize, Clone)]
pub struct OcrConfig {
    #[serde(default = "default_ocr_provider")]
    pub provider: String,
    #[serde(default = "default_ocr_command")]
    pub command: String,
    #[serde(default = "default_ocr_args")]
    pub args: Vec<String>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            provider: default_ocr_provider(),
            command: default_ocr_command(),
            args: default_ocr_args(),
        }
    }
}

fn default_ocr_provider() -> String {
    "disabled".to_string()
}
fn default_ocr_command() -> String {
    "tesseract".to_string()
}
fn default_ocr_args() -> Vec<String> {
    vec!["stdout".to_string()]
}

impl OcrConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct WalkConfig {
    #[serde(default = "default_include_globs")]
    pub include_globs: Vec<String>,
    #[serde(default)]
    pub exclude_globs: Vec<String>,
    #[serde(default)]
    pub follow_symlinks: bool,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            include_globs: default_include_globs(),
            exclude_globs: Vec::new(),
            follow_symlinks: false,
        }
    }
}

fn default_include_globs() -> Vec<String> {
    vec!["**/*".to_string()]
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("kb_output")
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

/// Load the default config file if present, otherwise built-in defaults.
///
/// Only an explicit `--config` makes a missing file an error.
pub fn load_default() -> Result<Config> {
    let path = Path::new(DEFAULT_CONFIG_PATH);
    if path.exists() {
        load_config(path)
    } else {
        Ok(Config::default())
    }
}

fn validate(config: &Config) -> Result<()> {
    // Validate chunking
    if config.chunking.trigger_chars == 0 {
        anyhow::bail!("chunking.trigger_chars must be > 0");
    }
    if config.chunking.target_chars == 0 {
        anyhow::bail!("chunking.target_chars must be > 0");
    }

    // Validate confidences
    let scores = [
        ("confidence.row", config.confidence.row),
        ("confidence.sheet", config.confidence.sheet),
        ("confidence.pdf", config.confidence.pdf),
        ("confidence.pdf_fallback", config.confidence.pdf_fallback),
        ("confidence.pdf_table", config.confidence.pdf_table),
        ("confidence.word", config.confidence.word),
        ("confidence.ocr", config.confidence.ocr),
        ("confidence.image", config.confidence.image),
        ("confidence.text", config.confidence.text),
    ];
    for (name, score) in scores {
        if !(0.0..=1.0).contains(&score) {
            anyhow::bail!("{} must be in [0.0, 1.0]", name);
        }
    }

    // Validate text decoding
    if config.text.encodings.is_empty() {
        anyhow::bail!("text.encodings must list at least one charset");
    }
    for label in &config.text.encodings {
        if encoding_rs::Encoding::for_label(label.as_bytes()).is_none() {
            anyhow::bail!("Unknown charset label in text.encodings: '{}'", label);
        }
    }

    // Validate OCR
    match config.ocr.provider.as_str() {
        "disabled" | "command" => {}
        other => anyhow::bail!(
            "Unknown OCR provider: '{}'. Must be disabled or command.",
            other
        ),
    }
    if config.ocr.is_enabled() && config.ocr.command.trim().is_empty() {
        anyhow::bail!("ocr.command must be set when provider is 'command'");
    }

    Ok(())
}
