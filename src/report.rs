//! Run-time event reporting for the pipeline.
//!
//! A run keeps going when a file misbehaves: a corrupt sheet or a PDF that
//! needs its structural fallback degrades that file's output instead of
//! aborting everything. Those decisions are surfaced as events while the
//! run is in flight. All reporting goes to stderr; stdout carries only the
//! artifacts and the summary.
//!
//! Reporters hold no state and live for a single invocation. Nothing here
//! is global.

use std::io::Write;

/// One observable pipeline decision.
#[derive(Clone, Debug)]
pub enum PipelineEvent {
    /// A file is next up: n of total.
    Processing { path: String, n: u64, total: u64 },
    /// A degraded strategy produced this file's output.
    Degraded { path: String, detail: String },
    /// The file yielded no entries at all.
    Failed { path: String, error: String },
}

/// Sink for pipeline events.
pub trait PipelineReporter {
    fn report(&self, event: PipelineEvent);
}

/// Plain stderr lines, one per event.
pub struct StderrReporter;

impl PipelineReporter for StderrReporter {
    fn report(&self, event: PipelineEvent) {
        let line = match event {
            PipelineEvent::Processing { path, n, total } => format!(
                "process {}  {} / {}\n",
                path,
                group_thousands(n),
                group_thousands(total)
            ),
            PipelineEvent::Degraded { path, detail } => {
                format!("degraded {}  {}\n", path, detail)
            }
            PipelineEvent::Failed { path, error } => {
                format!("failed {}  {}\n", path, error)
            }
        };
        let mut err = std::io::stderr().lock();
        let _ = err.write_all(line.as_bytes());
        let _ = err.flush();
    }
}

/// One JSON object per event, line-delimited, on stderr.
pub struct JsonReporter;

impl PipelineReporter for JsonReporter {
    fn report(&self, event: PipelineEvent) {
        let obj = match event {
            PipelineEvent::Processing { path, n, total } => {
                serde_json::json!({ "event": "processing", "path": path, "n": n, "total": total })
            }
            PipelineEvent::Degraded { path, detail } => {
                serde_json::json!({ "event": "degraded", "path": path, "detail": detail })
            }
            PipelineEvent::Failed { path, error } => {
                serde_json::json!({ "event": "failed", "path": path, "error": error })
            }
        };
        if let Ok(line) = serde_json::to_string(&obj) {
            let mut err = std::io::stderr().lock();
            let _ = writeln!(err, "{}", line);
            let _ = err.flush();
        }
    }
}

/// Swallows every event.
pub struct SilentReporter;

impl PipelineReporter for SilentReporter {
    fn report(&self, _event: PipelineEvent) {}
}

/// Insert `,` thousands separators into a count.
fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, d) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(d);
    }
    out
}

/// How `process` reports while it runs.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReportMode {
    Off,
    Human,
    Json,
}

impl ReportMode {
    /// Human reporting on an interactive stderr, off when piped.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            ReportMode::Human
        } else {
            ReportMode::Off
        }
    }

    pub fn reporter(&self) -> Box<dyn PipelineReporter> {
        match self {
            ReportMode::Off => Box::new(SilentReporter),
            ReportMode::Human => Box::new(StderrReporter),
            ReportMode::Json => Box::new(JsonReporter),
        }
    }
}
