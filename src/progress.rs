//! Fetch progress reporting.
//!
//! Reports which resource is being downloaded and how many records it
//! held, so a slow remote source is visible. Progress is emitted on
//! **stderr** so stdout stays clean for collection dumps.

use std::io::Write;

/// A single progress event during `fetch`.
#[derive(Clone, Debug)]
pub enum FetchProgressEvent {
    /// Request for resource `n` of `total` is in flight.
    Fetching {
        resource: String,
        n: u64,
        total: u64,
    },
    /// Resource saved with `records` top-level items.
    Saved { resource: String, records: u64 },
    Failed { resource: String, reason: String },
}

/// Reports fetch progress. Implementations write to stderr (human or JSON).
pub trait FetchProgressReporter {
    fn report(&self, event: FetchProgressEvent);
}

/// Human-friendly progress on stderr: "fetch posts  (1 / 6)".
pub struct StderrProgress;

impl FetchProgressReporter for StderrProgress {
    fn report(&self, event: FetchProgressEvent) {
        let line = match &event {
            FetchProgressEvent::Fetching { resource, n, total } => {
                format!("fetch {}  ({} / {})\n", resource, n, total)
            }
            FetchProgressEvent::Saved { resource, records } => {
                format!("fetch {}  saved {} records\n", resource, with_thousands(*records))
            }
            FetchProgressEvent::Failed { resource, reason } => {
                format!("fetch {}  failed: {}\n", resource, reason)
            }
        };
        let mut err = std::io::stderr().lock();
        let _ = err.write_all(line.as_bytes());
        let _ = err.flush();
    }
}

/// Machine-readable progress: one JSON object per line on stderr.
pub struct JsonProgress;

impl FetchProgressReporter for JsonProgress {
    fn report(&self, event: FetchProgressEvent) {
        let obj = match &event {
            FetchProgressEvent::Fetching { resource, n, total } => serde_json::json!({
                "event": "progress",
                "resource": resource,
                "phase": "fetching",
                "n": n,
                "total": total
            }),
            FetchProgressEvent::Saved { resource, records } => serde_json::json!({
                "event": "progress",
                "resource": resource,
                "phase": "saved",
                "records": records
            }),
            FetchProgressEvent::Failed { resource, reason } => serde_json::json!({
                "event": "progress",
                "resource": resource,
                "phase": "failed",
                "reason": reason
            }),
        };
        if let Ok(line) = serde_json::to_string(&obj) {
            let mut err = std::io::stderr().lock();
            let _ = writeln!(err, "{}", line);
            let _ = err.flush();
        }
    }
}

/// No-op reporter when progress is disabled.
pub struct NoProgress;

impl FetchProgressReporter for NoProgress {
    fn report(&self, _event: FetchProgressEvent) {}
}

/// `1234567` -> `1,234,567`.
fn with_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Progress mode for the CLI: off, human (stderr), or JSON (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq, clap::ValueEnum)]
pub enum ProgressMode {
    Off,
    Human,
    Json,
}

impl ProgressMode {
    /// Default: human progress when stderr is a TTY, otherwise off.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            ProgressMode::Human
        } else {
            ProgressMode::Off
        }
    }

    pub fn reporter(&self) -> Box<dyn FetchProgressReporter> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(StderrProgress),
            ProgressMode::Json => Box::new(JsonProgress),
        }
    }
}
