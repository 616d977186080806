// ============================================================================
// ufps-cli/src/error.rs
// ============================================================================
//
// CLI ERROR HANDLING: Error types and utilities for the CLI
//
// The CLI reuses the core error type. This module adds a context extension
// trait and the hints shown under an error message.

use std::fmt;
use ufps_core::{CoreError, CoreResult};

/// Result type for CLI operations.
pub type CliResult<T> = CoreResult<T>;

/// Extension trait for adding context to errors in the CLI.
pub trait CliErrorContext<T> {
    /// Add context to an error.
    fn cli_context<C>(self, context: C) -> CliResult<T>
    where
        C: fmt::Display;

    /// Add context using a closure (for lazy evaluation).
    fn cli_with_context<C, F>(self, f: F) -> CliResult<T>
    where
        C: fmt::Display,
        F: FnOnce() -> C;
}

impl<T, E> CliErrorContext<T> for Result<T, E>
where
    E: Into<CoreError>,
{
    fn cli_context<C>(self, context: C) -> CliResult<T>
    where
        C: fmt::Display,
    {
        self.map_err(|e| {
            let core_error: CoreError = e.into();
            CoreError::OperationFailed(format!("{context}: {core_error}"))
        })
    }

    fn cli_with_context<C, F>(self, f: F) -> CliResult<T>
    where
        C: fmt::Display,
        F: FnOnce() -> C,
    {
        self.map_err(|e| {
            let core_error: CoreError = e.into();
            CoreError::OperationFailed(format!("{}: {core_error}", f()))
        })
    }
}

impl<T> CliErrorContext<T> for Option<T> {
    fn cli_context<C>(self, context: C) -> CliResult<T>
    where
        C: fmt::Display,
    {
        self.ok_or_else(|| CoreError::OperationFailed(context.to_string()))
    }

    fn cli_with_context<C, F>(self, f: F) -> CliResult<T>
    where
        C: fmt::Display,
        F: FnOnce() -> C,
    {
        self.ok_or_else(|| CoreError::OperationFailed(f().to_string()))
    }
}

/// A hint for the user, by error kind.
pub fn suggestion_for(error: &CoreError) -> Option<&'static str> {
    match error {
        CoreError::Probe { .. } => Some("Check that the file is a playable video and that ffprobe is installed."),
        CoreError::Extraction(_) | CoreError::Encoding(_) => {
            Some("Run with --verbose to see the full ffmpeg output.")
        }
        CoreError::Interpolation(_) => Some(
            "Check the RIFE installation (--rife-dir, --models-dir) and that --python can import its requirements.",
        ),
        CoreError::DependencyNotFound(_) => Some("Install ffmpeg, or point --ffmpeg/--ffprobe at the binaries."),
        CoreError::Config(_) => Some("Install RIFE under ~/.ufps or pass --rife-dir and --models-dir."),
        _ => None,
    }
}
