// ============================================================================
// ufps-core/src/config.rs
// ============================================================================
//
// CONFIGURATION: Core Configuration Structures and Constants
//
// CoreConfig is the explicit configuration value handed to every component.
// Components never look up environment variables themselves; consumers (like
// ufps-cli) resolve flags, environment and defaults and build the config.

use crate::error::{CoreError, CoreResult};
use std::path::{Path, PathBuf};
use std::time::Duration;

// ============================================================================
// DEFAULT CONSTANTS
// ============================================================================

/// Default constant-quality value for the final encode (lower is better).
pub const DEFAULT_CRF: u8 = 18;

/// Highest constant-quality value libx264 accepts for 8-bit output.
pub const MAX_CRF: u8 = 51;

/// Default ffmpeg `-qscale:v` for frame extraction (1 is best).
pub const DEFAULT_FRAME_QUALITY: u8 = 1;

/// Range accepted by ffmpeg's `-qscale:v`.
pub const FRAME_QUALITY_RANGE: std::ops::RangeInclusive<u8> = 1..=31;

pub const DEFAULT_VIDEO_CODEC: &str = "libx264";
pub const DEFAULT_ENCODER_PRESET: &str = "slow";
pub const DEFAULT_PIXEL_FORMAT: &str = "yuv420p";

/// Interpolation entry points tried in order.
pub const DEFAULT_ENTRY_POINTS: [&str; 3] = ["inference_video.py", "inference_img.py", "inference.py"];

/// Directory under the home directory holding the interpolation tool and models.
pub const DEFAULT_INSTALL_DIR: &str = ".ufps";

// ============================================================================
// QUALITY PRESETS
// ============================================================================

/// Named constant-quality presets offered to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QualityPreset {
    Maximum,
    #[default]
    High,
    Balanced,
    Compressed,
}

impl QualityPreset {
    #[must_use]
    pub fn crf(self) -> u8 {
        match self {
            QualityPreset::Maximum => 15,
            QualityPreset::High => DEFAULT_CRF,
            QualityPreset::Balanced => 23,
            QualityPreset::Compressed => 28,
        }
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            QualityPreset::Maximum => "Largest file",
            QualityPreset::High => "Recommended",
            QualityPreset::Balanced => "Good quality, smaller file",
            QualityPreset::Compressed => "Smallest file",
        }
    }
}

// ============================================================================
// CORE CONFIGURATION
// ============================================================================

/// Configuration for probing, interpolation and encoding.
#[derive(Debug, Clone)]
pub struct CoreConfig {
    // ---- Codec Tools ----
    pub ffmpeg_path: PathBuf,
    pub ffprobe_path: PathBuf,

    // ---- Interpolation Tool ----
    /// Interpreter used to run the entry points.
    pub python_path: PathBuf,

    /// Root of the interpolation tool; entry points are resolved and run here.
    pub rife_dir: PathBuf,

    /// Directory holding the model weights.
    pub models_dir: PathBuf,

    /// Candidate entry point scripts, tried in order.
    pub entry_points: Vec<String>,

    /// Kill an interpolation attempt after this long.
    pub interpolation_timeout: Option<Duration>,

    // ---- Working Storage ----
    /// Base directory for per-run working directories (system temp if `None`).
    pub temp_dir: Option<PathBuf>,

    // ---- Encoder Settings ----
    /// `-qscale:v` used when decomposing the source into frames.
    pub frame_quality: u8,

    pub video_codec: String,
    pub encoder_preset: String,
    pub pixel_format: String,
}

impl CoreConfig {
    /// Creates a config for the given tool root and model directory, with
    /// codec tools resolved through PATH.
    pub fn new(rife_dir: impl Into<PathBuf>, models_dir: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg_path: PathBuf::from("ffmpeg"),
            ffprobe_path: PathBuf::from("ffprobe"),
            python_path: PathBuf::from("python3"),
            rife_dir: rife_dir.into(),
            models_dir: models_dir.into(),
            entry_points: DEFAULT_ENTRY_POINTS.iter().map(|s| (*s).to_string()).collect(),
            interpolation_timeout: None,
            temp_dir: None,
            frame_quality: DEFAULT_FRAME_QUALITY,
            video_codec: DEFAULT_VIDEO_CODEC.to_string(),
            encoder_preset: DEFAULT_ENCODER_PRESET.to_string(),
            pixel_format: DEFAULT_PIXEL_FORMAT.to_string(),
        }
    }

    /// Config rooted at the default install location (`<home>/.ufps`).
    pub fn with_install_root(home: &Path) -> Self {
        let root = home.join(DEFAULT_INSTALL_DIR);
        Self::new(root.join("RIFE"), root.join("models"))
    }

    /// Checks that the interpolation tool is installed and settings are in range.
    pub fn validate(&self) -> CoreResult<()> {
        if !self.rife_dir.is_dir() {
            return Err(CoreError::Config(format!(
                "interpolation tool not found at {}",
                self.rife_dir.display()
            )));
        }
        if !self.models_dir.is_dir() {
            return Err(CoreError::Config(format!(
                "models not found at {}",
                self.models_dir.display()
            )));
        }
        if self.entry_points.is_empty() {
            return Err(CoreError::Config(
                "no interpolation entry points configured".to_string(),
            ));
        }
        if !FRAME_QUALITY_RANGE.contains(&self.frame_quality) {
            return Err(CoreError::Config(format!(
                "frame quality {} outside {}..={}",
                self.frame_quality,
                FRAME_QUALITY_RANGE.start(),
                FRAME_QUALITY_RANGE.end()
            )));
        }
        Ok(())
    }
}

/// Checks a constant-quality value against the encoder's range.
pub fn validate_crf(crf: u8) -> CoreResult<()> {
    if crf > MAX_CRF {
        return Err(CoreError::Config(format!(
            "quality value {crf} outside 0..={MAX_CRF}"
        )));
    }
    Ok(())
}
