//! Frame sequence handle.
//!
//! Stages exchange frames through directories of numbered still images. A
//! [`FrameSequence`] ties such a directory to its naming convention
//! (`frame_00000001.png`, 1-based, eight digits) and its frame count, and
//! checks at each stage boundary that the numbering is contiguous.

use crate::error::{CoreError, CoreResult};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

pub const FRAME_PREFIX: &str = "frame_";
pub const FRAME_EXTENSION: &str = "png";
pub const FRAME_DIGITS: usize = 8;

/// printf-style pattern understood by ffmpeg's image2 muxer/demuxer.
pub const FRAME_PATTERN: &str = "frame_%08d.png";

/// File name of the frame at 1-based `index`.
#[must_use]
pub fn frame_file_name(index: u64) -> String {
    format!("{FRAME_PREFIX}{index:0width$}.{FRAME_EXTENSION}", width = FRAME_DIGITS)
}

/// Parses a canonical frame file name back to its index.
fn frame_index(name: &str) -> Option<u64> {
    let digits = name
        .strip_prefix(FRAME_PREFIX)?
        .strip_suffix(&format!(".{FRAME_EXTENSION}"))?;
    if digits.len() != FRAME_DIGITS || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Ordering key for foreign frame names: the last run of digits in the stem
/// as a number, then the name. `img2.png` sorts before `img10.png`.
fn natural_key(name: &str) -> (Option<u64>, &str) {
    let stem = name.rsplit_once('.').map_or(name, |(stem, _)| stem);
    let through_digits = stem.trim_end_matches(|c: char| !c.is_ascii_digit());
    let start = through_digits
        .trim_end_matches(|c: char| c.is_ascii_digit())
        .len();
    let digits = &through_digits[start..];
    (digits.parse().ok(), name)
}

/// Image files in `dir`, sorted by file name.
fn list_frame_files(dir: &Path) -> CoreResult<Vec<String>> {
    let mut names: Vec<String> = fs::read_dir(dir)?
        .filter_map(|entry| {
            let entry = entry.ok()?;
            let path = entry.path();
            if !path.is_file() {
                return None;
            }
            path.extension()
                .and_then(|ext| ext.to_str())
                .filter(|ext| ext.eq_ignore_ascii_case(FRAME_EXTENSION))?;
            entry.file_name().to_str().map(str::to_string)
        })
        .collect();
    names.sort();
    Ok(names)
}

/// A directory holding frames `1..=count` under the canonical naming scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameSequence {
    dir: PathBuf,
    count: u64,
}

impl FrameSequence {
    /// Opens `dir` and verifies it holds a gap-free canonical sequence.
    ///
    /// An empty directory yields an empty sequence.
    pub fn open(dir: &Path) -> CoreResult<Self> {
        let names = list_frame_files(dir)?;
        for (position, name) in names.iter().enumerate() {
            let expected = position as u64 + 1;
            match frame_index(name) {
                Some(index) if index == expected => {}
                Some(index) => {
                    return Err(CoreError::FrameSequence(format!(
                        "gap in {}: expected frame {expected}, found frame {index}",
                        dir.display()
                    )));
                }
                None => {
                    return Err(CoreError::FrameSequence(format!(
                        "unexpected file name '{name}' in {}",
                        dir.display()
                    )));
                }
            }
        }

        Ok(Self {
            dir: dir.to_path_buf(),
            count: names.len() as u64,
        })
    }

    /// Opens `dir`, first renumbering its images into the canonical scheme if
    /// they use some other names. Frames keep their numeric order, so both
    /// `0000001.png` and unpadded `img1.png` style names come out in sequence.
    pub fn adopt(dir: &Path) -> CoreResult<Self> {
        let mut names = list_frame_files(dir)?;
        let canonical = names
            .iter()
            .enumerate()
            .all(|(position, name)| frame_index(name) == Some(position as u64 + 1));
        if canonical {
            return Self::open(dir);
        }

        debug!("Renumbering {} frames in {}", names.len(), dir.display());
        names.sort_by(|a, b| natural_key(a).cmp(&natural_key(b)));

        // Two passes so a target name never collides with a file not yet moved.
        let staged: Vec<PathBuf> = names
            .iter()
            .enumerate()
            .map(|(position, name)| -> CoreResult<PathBuf> {
                let staged = dir.join(format!(".renumber_{position:0width$}", width = FRAME_DIGITS));
                fs::rename(dir.join(name), &staged)?;
                Ok(staged)
            })
            .collect::<CoreResult<_>>()?;

        for (position, staged_path) in staged.iter().enumerate() {
            fs::rename(staged_path, dir.join(frame_file_name(position as u64 + 1)))?;
        }

        Self::open(dir)
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn count(&self) -> u64 {
        self.count
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Path of the frame at 1-based `index`.
    #[must_use]
    pub fn frame_path(&self, index: u64) -> PathBuf {
        self.dir.join(frame_file_name(index))
    }

    /// The ffmpeg input/output pattern for this directory.
    #[must_use]
    pub fn pattern(&self) -> PathBuf {
        self.dir.join(FRAME_PATTERN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), name.as_bytes()).unwrap();
    }

    #[test]
    fn names_sort_numerically() {
        assert_eq!(frame_file_name(1), "frame_00000001.png");
        assert_eq!(frame_file_name(12345678), "frame_12345678.png");
        assert!(frame_file_name(9) < frame_file_name(10));
        assert_eq!(frame_index("frame_00000042.png"), Some(42));
        assert_eq!(frame_index("frame_42.png"), None);
        assert_eq!(frame_index("img_00000042.png"), None);
    }

    #[test]
    fn open_counts_contiguous_frames_and_ignores_other_files() {
        let dir = tempdir().unwrap();
        for i in 1..=3 {
            touch(dir.path(), &frame_file_name(i));
        }
        touch(dir.path(), "audio.aac");

        let seq = FrameSequence::open(dir.path()).unwrap();
        assert_eq!(seq.count(), 3);
        assert_eq!(seq.frame_path(2), dir.path().join("frame_00000002.png"));
        assert_eq!(seq.pattern(), dir.path().join("frame_%08d.png"));
    }

    #[test]
    fn open_rejects_gaps() {
        let dir = tempdir().unwrap();
        touch(dir.path(), &frame_file_name(1));
        touch(dir.path(), &frame_file_name(3));
        let err = FrameSequence::open(dir.path()).unwrap_err();
        assert!(matches!(err, CoreError::FrameSequence(_)));
    }

    #[test]
    fn open_empty_directory() {
        let dir = tempdir().unwrap();
        let seq = FrameSequence::open(dir.path()).unwrap();
        assert!(seq.is_empty());
    }

    #[test]
    fn adopt_renumbers_foreign_names_in_order() {
        let dir = tempdir().unwrap();
        for name in ["0000002.png", "0000000.png", "0000001.png"] {
            touch(dir.path(), name);
        }

        let seq = FrameSequence::adopt(dir.path()).unwrap();
        assert_eq!(seq.count(), 3);
        assert_eq!(fs::read(seq.frame_path(1)).unwrap(), b"0000000.png");
        assert_eq!(fs::read(seq.frame_path(3)).unwrap(), b"0000002.png");
    }

    #[test]
    fn adopt_orders_unpadded_names_numerically() {
        let dir = tempdir().unwrap();
        for i in 0..12 {
            touch(dir.path(), &format!("img{i}.png"));
        }

        let seq = FrameSequence::adopt(dir.path()).unwrap();
        assert_eq!(seq.count(), 12);
        for i in 0..12 {
            let expected = format!("img{i}.png");
            assert_eq!(fs::read(seq.frame_path(i + 1)).unwrap(), expected.as_bytes());
        }
    }

    #[test]
    fn natural_key_uses_trailing_number() {
        assert!(natural_key("img2.png") < natural_key("img10.png"));
        assert!(natural_key("0000009.png") < natural_key("0000010.png"));
        assert_eq!(natural_key("frame_v2_0010.png").0, Some(10));
        assert_eq!(natural_key("cover.png").0, None);
    }

    #[test]
    fn adopt_closes_gaps_in_canonical_names() {
        let dir = tempdir().unwrap();
        touch(dir.path(), &frame_file_name(2));
        touch(dir.path(), &frame_file_name(5));

        let seq = FrameSequence::adopt(dir.path()).unwrap();
        assert_eq!(seq.count(), 2);
        assert_eq!(fs::read(seq.frame_path(1)).unwrap(), frame_file_name(2).as_bytes());
        assert_eq!(fs::read(seq.frame_path(2)).unwrap(), frame_file_name(5).as_bytes());
    }
}
