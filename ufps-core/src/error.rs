// ============================================================================
// ufps-core/src/error.rs
// ============================================================================
//
// ERROR HANDLING: Error types for the ufps-core library
//
// Every pipeline stage has its own variant so callers can tell which stage
// failed. Stage variants carry the diagnostic text of the wrapped tool
// (ffmpeg, ffprobe or the interpolation entry point) instead of dropping it.

use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Errors produced by the ufps-core library.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to start {0}: {1}")]
    CommandStart(String, std::io::Error),

    #[error("Failed waiting for {0}: {1}")]
    CommandWait(String, std::io::Error),

    /// Metadata tool unavailable, non-zero exit, unparseable output or no video stream.
    #[error("Probe failed for {path}: {message}")]
    Probe { path: PathBuf, message: String },

    /// Frame decomposition failed.
    #[error("Frame extraction failed: {0}")]
    Extraction(String),

    /// Every interpolation strategy failed.
    #[error("Interpolation failed: {0}")]
    Interpolation(String),

    /// Final assembly failed.
    #[error("Encoding failed: {0}")]
    Encoding(String),

    #[error("Required dependency not found: {0}")]
    DependencyNotFound(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Path error: {0}")]
    PathError(String),

    #[error("Frame sequence error: {0}")]
    FrameSequence(String),

    #[error("No video files found")]
    NoFilesFound,

    #[error("{0}")]
    OperationFailed(String),
}

impl CoreError {
    /// Name of the pipeline stage this error belongs to, if any.
    #[must_use]
    pub fn stage(&self) -> Option<&'static str> {
        match self {
            CoreError::Probe { .. } => Some("probe"),
            CoreError::Extraction(_) => Some("extraction"),
            CoreError::Interpolation(_) => Some("interpolation"),
            CoreError::Encoding(_) => Some("encoding"),
            _ => None,
        }
    }
}

/// Result type for ufps-core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Builds the message for a tool that exited unsuccessfully, keeping its stderr.
pub(crate) fn tool_failure_message(tool: &str, status: ExitStatus, stderr: &str) -> String {
    let stderr = stderr.trim();
    if stderr.is_empty() {
        format!("{tool} exited with {status}")
    } else {
        format!("{tool} exited with {status}:\n{stderr}")
    }
}

/// Keeps the last `max_lines` lines of a diagnostic stream.
pub(crate) fn diagnostic_tail(text: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = text.trim().lines().collect();
    let start = lines.len().saturating_sub(max_lines);
    lines[start..].join("\n")
}
