//! Temporary working directory management.
//!
//! Each pipeline run gets its own directory named from a timestamp, the
//! sanitized input file stem and a random suffix, so concurrent runs never
//! share storage. The directory is a [`TempDir`] and is removed when dropped.

use crate::config::CoreConfig;
use crate::error::CoreResult;
use std::path::Path;
use tempfile::{Builder as TempFileBuilder, TempDir};

/// Longest stem fragment kept in a working directory name.
const MAX_STEM_CHARS: usize = 20;

/// Replaces anything but ASCII alphanumerics, `.`, `_` and `-` with `_`,
/// keeping at most the first twenty characters.
#[must_use]
pub fn sanitize_stem(stem: &str) -> String {
    stem.chars()
        .take(MAX_STEM_CHARS)
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Directory name prefix for a run on `input`: `ufps_<stem>_<timestamp>_`.
#[must_use]
pub fn run_dir_prefix(input: &Path) -> String {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    format!("ufps_{}_{timestamp}_", sanitize_stem(&stem))
}

/// Creates the working directory for a run on `input`. Auto-cleaned when dropped.
pub fn create_run_dir(config: &CoreConfig, input: &Path) -> CoreResult<TempDir> {
    let prefix = run_dir_prefix(input);
    let dir = match config.temp_dir.as_ref() {
        Some(base) => {
            std::fs::create_dir_all(base)?;
            TempFileBuilder::new().prefix(&prefix).tempdir_in(base)?
        }
        None => TempFileBuilder::new().prefix(&prefix).tempdir()?,
    };
    Ok(dir)
}
