//! File discovery module for finding video files to upsample.
//!
//! Searches the top level of a directory for files with a known video
//! extension (case-insensitive). Subdirectories are not searched.

use crate::error::{CoreError, CoreResult};

use std::path::{Path, PathBuf};

/// Extensions recognised as video files.
pub const VIDEO_EXTENSIONS: [&str; 8] = ["mp4", "avi", "mov", "mkv", "webm", "flv", "wmv", "m4v"];

/// Whether `path` has a recognised video extension.
#[must_use]
pub fn has_video_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| VIDEO_EXTENSIONS.iter().any(|v| ext.eq_ignore_ascii_case(v)))
}

/// Finds video files in `input_dir`, sorted by lower-cased file name.
///
/// # Returns
///
/// * `Ok(Vec<PathBuf>)` - The discovered video files
/// * `Err(CoreError::Io)` - If the directory cannot be read
/// * `Err(CoreError::NoFilesFound)` - If no video files are found
///
/// # Examples
///
/// ```rust,no_run
/// use ufps_core::find_video_files;
/// use std::path::Path;
///
/// match find_video_files(Path::new("/path/to/videos")) {
///     Ok(files) => {
///         for file in files {
///             println!("  {}", file.display());
///         }
///     }
///     Err(e) => println!("Error finding video files: {}", e),
/// }
/// ```
pub fn find_video_files(input_dir: &Path) -> CoreResult<Vec<PathBuf>> {
    let read_dir = std::fs::read_dir(input_dir)?;
    let mut files: Vec<PathBuf> = read_dir
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            (path.is_file() && has_video_extension(&path)).then_some(path)
        })
        .collect();

    if files.is_empty() {
        return Err(CoreError::NoFilesFound);
    }

    files.sort_by_cached_key(|path| {
        path.file_name()
            .map(|name| name.to_string_lossy().to_lowercase())
            .unwrap_or_default()
    });
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn finds_videos_sorted_case_insensitively() {
        let dir = tempdir().unwrap();
        for name in ["b.MOV", "A.mp4", "c.mkv", "notes.txt", "d.webm"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        fs::create_dir(dir.path().join("nested.mp4")).unwrap();

        let files = find_video_files(dir.path()).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["A.mp4", "b.MOV", "c.mkv", "d.webm"]);
    }

    #[test]
    fn empty_directory_has_no_files() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("readme.md"), b"").unwrap();
        assert!(matches!(find_video_files(dir.path()), Err(CoreError::NoFilesFound)));
    }

    #[test]
    fn extension_check() {
        assert!(has_video_extension(Path::new("clip.M4V")));
        assert!(has_video_extension(Path::new("/a/b/clip.flv")));
        assert!(!has_video_extension(Path::new("clip.png")));
        assert!(!has_video_extension(Path::new("mp4")));
    }
}
