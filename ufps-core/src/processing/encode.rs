//! Final assembly of the interpolated frames.

use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};
use crate::external::{EncodeJob, FrameTranscoder};
use crate::frames::FrameSequence;

use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Reassembles a frame sequence, plus optional audio, into a video file.
pub struct FrameEncoder<'a> {
    transcoder: &'a dyn FrameTranscoder,
    config: &'a CoreConfig,
}

impl<'a> FrameEncoder<'a> {
    pub fn new(transcoder: &'a dyn FrameTranscoder, config: &'a CoreConfig) -> Self {
        Self { transcoder, config }
    }

    /// Encodes `frames` at `fps` into `out_path` with constant quality `crf`.
    ///
    /// Audio is muxed by stream copy when `audio` names an existing file.
    pub fn encode(
        &self,
        frames: &FrameSequence,
        out_path: &Path,
        fps: f64,
        audio: Option<&Path>,
        crf: u8,
    ) -> CoreResult<PathBuf> {
        if frames.is_empty() {
            return Err(CoreError::Encoding(format!(
                "no frames to encode in {}",
                frames.dir().display()
            )));
        }

        if let Some(parent) = out_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                CoreError::Encoding(format!("cannot create {}: {e}", parent.display()))
            })?;
        }

        let audio = audio.filter(|path| {
            let exists = path.is_file();
            if !exists {
                warn!("Audio file {} missing, encoding without audio", path.display());
            }
            exists
        });

        let pattern = frames.pattern();
        let job = EncodeJob {
            frame_pattern: &pattern,
            output_path: out_path,
            fps,
            audio_path: audio,
            crf,
            video_codec: &self.config.video_codec,
            preset: &self.config.encoder_preset,
            pixel_format: &self.config.pixel_format,
        };
        self.transcoder.encode_frames(&job)?;

        if !out_path.is_file() {
            return Err(CoreError::Encoding(format!(
                "encoder reported success but {} was not written",
                out_path.display()
            )));
        }

        info!(
            "Encoded {} frames at {fps:.3} fps into {}",
            frames.count(),
            out_path.display()
        );
        Ok(out_path.to_path_buf())
    }
}
