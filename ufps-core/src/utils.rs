//! Utility functions for formatting and output naming.
//!
//! General-purpose helpers used by the library and the CLI: human readable
//! durations and sizes, the default output file name and the output size
//! estimate shown before a run.

use std::path::{Path, PathBuf};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Formats seconds compactly: "12.3s", "4m 5s" or "1h 2m".
#[must_use]
pub fn format_duration(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "?".to_string();
    }
    if seconds < 60.0 {
        return format!("{seconds:.1}s");
    }

    let total = seconds as u64;
    if total < 3600 {
        format!("{}m {}s", total / 60, total % 60)
    } else {
        format!("{}h {}m", total / 3600, (total % 3600) / 60)
    }
}

/// Formats bytes with appropriate binary units (B, KiB, MiB, GiB).
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    const MIB: f64 = KIB * 1024.0;
    const GIB: f64 = MIB * 1024.0;

    let bytes_f64 = bytes as f64;
    if bytes_f64 >= GIB {
        format!("{:.2} GiB", bytes_f64 / GIB)
    } else if bytes_f64 >= MIB {
        format!("{:.2} MiB", bytes_f64 / MIB)
    } else if bytes_f64 >= KIB {
        format!("{:.2} KiB", bytes_f64 / KIB)
    } else {
        format!("{bytes} B")
    }
}

/// "123.4 MB"
#[must_use]
pub fn format_megabytes(mb: f64) -> String {
    format!("{mb:.1} MB")
}

#[must_use]
pub fn bytes_to_megabytes(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_MB
}

/// `<dir>/<stem>_<fps>fps<.ext>` next to the input.
#[must_use]
pub fn default_output_path(input: &Path, actual_fps: f64) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let extension = input
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    input.with_file_name(format!("{stem}_{}fps{extension}", actual_fps as u64))
}

/// Rough output size in MB: more frames, scaled down for lighter quality settings.
#[must_use]
pub fn estimate_output_size_mb(source_mb: f64, multiplier: u32, crf: u8) -> f64 {
    let factor = if crf > 20 { 0.8 } else { 1.2 };
    source_mb * f64::from(multiplier) * factor
}
