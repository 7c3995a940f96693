//! Text recognition provider abstraction.
//!
//! Defines the [`TextRecognizer`] trait and concrete implementations:
//! - **[`DisabledRecognizer`]** — returns errors; used when OCR is not
//!   configured. Image files still produce descriptor entries, just no
//!   recognized-text entries.
//! - **[`CommandRecognizer`]** — shells out to an external OCR binary
//!   (`tesseract` by default) and captures its stdout.
//!
//! The pipeline never links an OCR engine directly; recognition quality
//! is surfaced to consumers through entry confidence scores instead of
//! being validated here.
//!
//! # Provider Selection
//!
//! Use [`create_recognizer`] to instantiate the appropriate provider from
//! configuration:
//!
//! ```rust
//! # use docmill::config::OcrConfig;
//! # use docmill::ocr::create_recognizer;
//! let config = OcrConfig::default(); // provider = "disabled"
//! let recognizer = create_recognizer(&config).unwrap();
//! assert!(!recognizer.is_enabled());
//! ```

use anyhow::{bail, Context, Result};
use std::path::Path;
use std::process::Command;

use crate::config::OcrConfig;

/// Trait for text recognition backends.
pub trait TextRecognizer {
    /// Provider name for reporting (e.g. `"tesseract"`).
    fn name(&self) -> &str;
    /// Whether this provider can actually recognize text.
    fn is_enabled(&self) -> bool;
    /// Run recognition over an image file, returning the recognized text.
    fn recognize(&self, path: &Path) -> Result<String>;
}

// ============ Disabled Recognizer ============

/// A no-op recognizer used when `ocr.provider = "disabled"`.
pub struct DisabledRecognizer;

impl TextRecognizer for DisabledRecognizer {
    fn name(&self) -> &str {
        "disabled"
    }
    fn is_enabled(&self) -> bool {
        false
    }
    fn recognize(&self, _path: &Path) -> Result<String> {
        bail!("Text recognition is disabled")
    }
}

// ============ Command Recognizer ============

/// Recognizer that invokes an external OCR binary.
///
/// The file path is passed as the first argument, followed by the
/// configured extra arguments. With the defaults this runs
/// `tesseract <image> stdout`, the stock tesseract CLI invocation.
pub struct CommandRecognizer {
    command: String,
    args: Vec<String>,
}

impl CommandRecognizer {
    pub fn new(config: &OcrConfig) -> Self {
        Self {
            command: config.command.clone(),
            args: config.args.clone(),
        }
    }
}

impl TextRecognizer for CommandRecognizer {
    fn name(&self) -> &str {
        &self.command
    }

    fn is_enabled(&self) -> bool {
        true
    }

    fn recognize(&self, path: &Path) -> Result<String> {
        let output = Command::new(&self.command)
            .arg(path)
            .args(&self.args)
            .output()
            .with_context(|| {
                format!(
                    "Failed to execute '{}'. Is it installed?",
                    self.command
                )
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("{} failed: {}", self.command, stderr.trim());
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

/// Create the appropriate [`TextRecognizer`] based on configuration.
///
/// | Config value | Provider |
/// |--------------|----------|
/// | `"disabled"` | [`DisabledRecognizer`] |
/// | `"command"`  | [`CommandRecognizer`] |
pub fn create_recognizer(config: &OcrConfig) -> Result<Box<dyn TextRecognizer>> {
    match config.provider.as_str() {
        "disabled" => Ok(Box::new(DisabledRecognizer)),
        "command" => Ok(Box::new(CommandRecognizer::new(config))),
        other => bail!("Unknown OCR provider: {}", other),
    }
}
