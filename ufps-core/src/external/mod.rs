// ============================================================================
// ufps-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Interactions with External CLI Tools
//
// This module encapsulates the processes ufps drives: ffmpeg for decoding and
// encoding frames, and the interpolation tool's entry point scripts. Each is
// reached through a trait so the pipeline can run against fakes in tests.
//
// KEY COMPONENTS:
// - FrameTranscoder: decode to frames, copy audio, encode frames (ffmpeg)
// - FrameSynthesizer: run one interpolation entry point invocation
// - Dependency checking and codec tool discovery

use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};
use crate::media::FfprobeProvider;

use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

pub mod ffmpeg;
pub mod rife;

pub use ffmpeg::FfmpegTranscoder;
pub use rife::RifeSynthesizer;

// ============================================================================
// CAPABILITY TRAITS
// ============================================================================

/// Parameters for assembling a frame sequence into a video.
#[derive(Debug, Clone)]
pub struct EncodeJob<'a> {
    /// printf-style frame pattern, e.g. `<dir>/frame_%08d.png`.
    pub frame_pattern: &'a Path,
    pub output_path: &'a Path,
    pub fps: f64,
    /// Audio stream to mux in by stream copy.
    pub audio_path: Option<&'a Path>,
    pub crf: u8,
    pub video_codec: &'a str,
    pub preset: &'a str,
    pub pixel_format: &'a str,
}

/// The transcoding tool.
pub trait FrameTranscoder {
    /// Decodes every frame of `video` into `frame_pattern` at the given `-qscale:v`.
    fn decode_frames(&self, video: &Path, frame_pattern: &Path, quality: u8) -> CoreResult<()>;

    /// Copies the first audio stream of `video` into `output_path` without re-encoding.
    fn copy_audio(&self, video: &Path, output_path: &Path) -> CoreResult<()>;

    /// Assembles frames (and optional audio) into a video file.
    fn encode_frames(&self, job: &EncodeJob<'_>) -> CoreResult<()>;
}

/// One invocation of an interpolation entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisRequest<'a> {
    pub entry_point: &'a str,
    pub input_dir: &'a Path,
    pub output_dir: &'a Path,
    /// Doubling exponent, `2^exponent` = multiplier.
    pub exponent: u32,
    pub model_dir: Option<&'a Path>,
}

/// What an invocation reported back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SynthesisOutcome {
    pub success: bool,
    /// Exit description and captured diagnostics of the process.
    pub diagnostic: String,
}

/// The interpolation tool.
pub trait FrameSynthesizer {
    /// Whether the tool ships this entry point.
    fn has_entry_point(&self, entry_point: &str) -> bool;

    /// Runs one invocation and waits for it. Failing to run at all is an `Err`;
    /// a process that ran and exited unsuccessfully is an unsuccessful outcome.
    fn invoke(&self, request: &SynthesisRequest<'_>) -> CoreResult<SynthesisOutcome>;
}

// ============================================================================
// PRODUCTION TOOL SET
// ============================================================================

/// The real tools, built from a [`CoreConfig`].
#[derive(Debug, Clone)]
pub struct ExternalTools {
    pub probe: FfprobeProvider,
    pub transcoder: FfmpegTranscoder,
    pub synthesizer: RifeSynthesizer,
}

impl ExternalTools {
    pub fn from_config(config: &CoreConfig) -> Self {
        Self {
            probe: FfprobeProvider::new(&config.ffprobe_path),
            transcoder: FfmpegTranscoder::new(&config.ffmpeg_path),
            synthesizer: RifeSynthesizer::new(&config.python_path, &config.rife_dir)
                .with_timeout(config.interpolation_timeout),
        }
    }

    /// Checks that every binary the pipeline runs can be started.
    pub fn check(config: &CoreConfig) -> CoreResult<()> {
        check_dependency(&config.ffmpeg_path)?;
        check_dependency(&config.ffprobe_path)?;
        check_python(&config.python_path)
    }
}

/// Python only understands `--version`.
fn check_python(python: &Path) -> CoreResult<()> {
    match Command::new(python)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
    {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(CoreError::DependencyNotFound(python.display().to_string()))
        }
        Err(e) => Err(CoreError::CommandStart(python.display().to_string(), e)),
    }
}

// ============================================================================
// DEPENDENCY CHECKING
// ============================================================================

/// Checks that an external command exists and starts, by running `<cmd> -version`.
pub fn check_dependency(cmd: &Path) -> CoreResult<()> {
    let result = Command::new(cmd)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match result {
        Ok(_) => {
            log::debug!("Found dependency: {}", cmd.display());
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::warn!("Dependency '{}' not found.", cmd.display());
            Err(CoreError::DependencyNotFound(cmd.display().to_string()))
        }
        Err(e) => {
            log::error!("Failed to start dependency check '{}': {}", cmd.display(), e);
            Err(CoreError::CommandStart(cmd.display().to_string(), e))
        }
    }
}

// ============================================================================
// CODEC TOOL DISCOVERY
// ============================================================================

/// Install locations checked on macOS when the tools are not on PATH.
fn macos_candidates(home: Option<&Path>) -> Vec<PathBuf> {
    let mut candidates = vec![
        PathBuf::from("/usr/local/bin/ffmpeg"),
        PathBuf::from("/opt/homebrew/bin/ffmpeg"),
        PathBuf::from("/opt/local/bin/ffmpeg"),
    ];
    if let Some(home) = home {
        candidates.push(home.join(".ufps").join("ffmpeg").join("ffmpeg"));
    }
    candidates
}

/// Returns the first candidate ffmpeg with an ffprobe beside it.
fn first_pair_with_probe(candidates: &[PathBuf]) -> Option<(PathBuf, PathBuf)> {
    candidates.iter().find_map(|ffmpeg| {
        let ffprobe = ffmpeg.with_file_name("ffprobe");
        (ffmpeg.is_file() && ffprobe.is_file()).then(|| (ffmpeg.clone(), ffprobe))
    })
}

/// Locates ffmpeg and ffprobe: PATH first, then the common macOS install
/// locations (which require ffprobe to sit next to ffmpeg).
pub fn locate_codec_tools(home: Option<&Path>) -> Option<(PathBuf, PathBuf)> {
    if let (Ok(ffmpeg), Ok(ffprobe)) = (which::which("ffmpeg"), which::which("ffprobe")) {
        return Some((ffmpeg, ffprobe));
    }

    if std::env::consts::OS == "macos" {
        return first_pair_with_probe(&macos_candidates(home));
    }

    None
}
