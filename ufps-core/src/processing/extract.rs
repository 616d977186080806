//! Frame and audio extraction.

use crate::error::{CoreError, CoreResult};
use crate::external::FrameTranscoder;
use crate::frames::{FRAME_PATTERN, FrameSequence};

use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Decomposes a source video into numbered frames and copies out its audio.
pub struct FrameExtractor<'a> {
    transcoder: &'a dyn FrameTranscoder,
}

impl<'a> FrameExtractor<'a> {
    pub fn new(transcoder: &'a dyn FrameTranscoder) -> Self {
        Self { transcoder }
    }

    /// Writes every frame of `video` into `out_dir` as `frame_00000001.png`, ...
    ///
    /// `quality` is the transcoder's image quality scale, lower is better.
    /// A decode that yields no frames is an extraction failure.
    pub fn extract_frames(&self, video: &Path, out_dir: &Path, quality: u8) -> CoreResult<FrameSequence> {
        fs::create_dir_all(out_dir).map_err(|e| {
            CoreError::Extraction(format!("cannot create {}: {e}", out_dir.display()))
        })?;
        self.transcoder
            .decode_frames(video, &out_dir.join(FRAME_PATTERN), quality)?;

        let frames = FrameSequence::open(out_dir)
            .map_err(|e| CoreError::Extraction(format!("unusable frame output: {e}")))?;
        if frames.is_empty() {
            return Err(CoreError::Extraction(format!(
                "no frames were decoded from {}",
                video.display()
            )));
        }

        info!("Extracted {} frames", frames.count());
        Ok(frames)
    }

    /// Copies the audio stream of `video` to `out_path` without re-encoding.
    ///
    /// Returns `None` instead of failing when nothing usable was produced;
    /// the output is then silent.
    pub fn extract_audio(&self, video: &Path, out_path: &Path) -> Option<PathBuf> {
        if let Err(e) = self.transcoder.copy_audio(video, out_path) {
            warn!("Audio extraction failed, continuing without audio: {e}");
            return None;
        }

        match fs::metadata(out_path) {
            Ok(meta) if meta.is_file() && meta.len() > 0 => {
                debug!("Extracted audio to {}", out_path.display());
                Some(out_path.to_path_buf())
            }
            _ => {
                warn!("No audio track produced for {}", video.display());
                None
            }
        }
    }
}
