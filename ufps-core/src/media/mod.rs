//! Media information and probing.
//!
//! This module provides the normalized description of a source video and the
//! [`MetadataProvider`] seam used to obtain it. The production provider runs
//! ffprobe; tests substitute their own.

pub mod probe;

use crate::error::CoreResult;
use serde::Serialize;
use std::path::Path;

pub use probe::{FfprobeProvider, parse_frame_rate};

/// Frame rate used when the probe cannot determine a usable rational rate.
pub const FALLBACK_FPS: f64 = 30.0;

/// Snapshot of a source video's properties, derived once by probing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoDescriptor {
    /// Frames per second, always > 0.
    pub fps: f64,
    pub width: u32,
    pub height: u32,
    pub duration_secs: f64,
    /// Video codec name as reported by the probe.
    pub codec: String,
    /// Container format name, empty if unknown.
    pub container: String,
    pub bitrate_kbps: u64,
    /// Codec of the first audio stream, `None` when the video is silent.
    pub audio_codec: Option<String>,
    pub file_size_mb: f64,
    /// Stream-reported frame count, or `fps × duration` when absent.
    pub frame_count: u64,
}

impl VideoDescriptor {
    #[must_use]
    pub fn has_audio(&self) -> bool {
        self.audio_codec.is_some()
    }

    /// "1920×1080"
    #[must_use]
    pub fn resolution(&self) -> String {
        format!("{}×{}", self.width, self.height)
    }
}

/// Source of video metadata.
pub trait MetadataProvider {
    /// Probes `path` and returns its normalized description.
    fn probe(&self, path: &Path) -> CoreResult<VideoDescriptor>;
}
