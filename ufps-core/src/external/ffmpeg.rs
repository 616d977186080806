// ============================================================================
// ufps-core/src/external/ffmpeg.rs
// ============================================================================
//
// FFMPEG INTEGRATION: Frame decoding, audio copy and frame encoding
//
// FfmpegTranscoder implements FrameTranscoder on top of ffmpeg-sidecar. The
// argument lists are built by plain functions so they can be checked without
// running ffmpeg; the runner drains the sidecar event stream, keeps the log
// lines as diagnostics and checks the exit status.

use super::{EncodeJob, FrameTranscoder};
use crate::error::{CoreError, CoreResult, diagnostic_tail, tool_failure_message};

use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::FfmpegEvent;
use log::{debug, trace};
use std::path::{Path, PathBuf};

/// Lines of ffmpeg output kept in error messages.
const DIAGNOSTIC_LINES: usize = 20;

// ============================================================================
// ARGUMENT BUILDERS
// ============================================================================

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// `-i <video> -qscale:v <q> -qmin 1 <pattern> -y`
#[must_use]
pub fn decode_args(video: &Path, frame_pattern: &Path, quality: u8) -> Vec<String> {
    vec![
        "-i".to_string(),
        path_arg(video),
        "-qscale:v".to_string(),
        quality.to_string(),
        "-qmin".to_string(),
        "1".to_string(),
        path_arg(frame_pattern),
        "-y".to_string(),
    ]
}

/// `-i <video> -vn -acodec copy <out> -y`
#[must_use]
pub fn copy_audio_args(video: &Path, output_path: &Path) -> Vec<String> {
    vec![
        "-i".to_string(),
        path_arg(video),
        "-vn".to_string(),
        "-acodec".to_string(),
        "copy".to_string(),
        path_arg(output_path),
        "-y".to_string(),
    ]
}

/// Frames in at the target rate, optional audio copied through.
#[must_use]
pub fn encode_args(job: &EncodeJob<'_>) -> Vec<String> {
    let mut args = vec![
        "-framerate".to_string(),
        format!("{}", job.fps),
        "-i".to_string(),
        path_arg(job.frame_pattern),
    ];
    if let Some(audio) = job.audio_path {
        args.push("-i".to_string());
        args.push(path_arg(audio));
    }
    args.extend([
        "-c:v".to_string(),
        job.video_codec.to_string(),
        "-crf".to_string(),
        job.crf.to_string(),
        "-preset".to_string(),
        job.preset.to_string(),
        "-pix_fmt".to_string(),
        job.pixel_format.to_string(),
    ]);
    if job.audio_path.is_some() {
        args.push("-c:a".to_string());
        args.push("copy".to_string());
    }
    args.push(path_arg(job.output_path));
    args.push("-y".to_string());
    args
}

/// File extension for a stream-copied audio track of the given codec.
///
/// Unknown codecs go into Matroska audio, which accepts nearly anything.
#[must_use]
pub fn audio_container_extension(codec: &str) -> &'static str {
    match codec {
        "aac" => "aac",
        "mp3" => "mp3",
        "opus" | "vorbis" => "ogg",
        "flac" => "flac",
        "ac3" => "ac3",
        "eac3" => "eac3",
        "pcm_s16le" | "pcm_s24le" => "wav",
        _ => "mka",
    }
}

// ============================================================================
// TRANSCODER
// ============================================================================

/// [`FrameTranscoder`] backed by the ffmpeg binary.
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    ffmpeg_path: PathBuf,
}

impl FfmpegTranscoder {
    pub fn new(ffmpeg_path: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
        }
    }

    /// Runs ffmpeg to completion. The error string carries the exit status and
    /// the tail of ffmpeg's log output.
    fn run(&self, args: &[String]) -> Result<(), String> {
        debug!("Running ffmpeg: {} {}", self.ffmpeg_path.display(), args.join(" "));

        let mut cmd = FfmpegCommand::new_with_path(&self.ffmpeg_path);
        cmd.args(args);

        let mut child = cmd
            .spawn()
            .map_err(|e| format!("could not start {}: {e}", self.ffmpeg_path.display()))?;

        let mut stderr_buffer = String::new();
        let events = child
            .iter()
            .map_err(|e| format!("could not read ffmpeg output: {e}"))?;
        for event in events {
            match event {
                FfmpegEvent::Log(_, line) | FfmpegEvent::Error(line) => {
                    trace!("ffmpeg: {line}");
                    stderr_buffer.push_str(&line);
                    stderr_buffer.push('\n');
                }
                _ => {}
            }
        }

        let status = child
            .wait()
            .map_err(|e| format!("failed waiting for ffmpeg: {e}"))?;
        if status.success() {
            Ok(())
        } else {
            Err(tool_failure_message(
                "ffmpeg",
                status,
                &diagnostic_tail(&stderr_buffer, DIAGNOSTIC_LINES),
            ))
        }
    }
}

impl FrameTranscoder for FfmpegTranscoder {
    fn decode_frames(&self, video: &Path, frame_pattern: &Path, quality: u8) -> CoreResult<()> {
        self.run(&decode_args(video, frame_pattern, quality))
            .map_err(CoreError::Extraction)
    }

    fn copy_audio(&self, video: &Path, output_path: &Path) -> CoreResult<()> {
        self.run(&copy_audio_args(video, output_path))
            .map_err(CoreError::OperationFailed)
    }

    fn encode_frames(&self, job: &EncodeJob<'_>) -> CoreResult<()> {
        self.run(&encode_args(job)).map_err(CoreError::Encoding)
    }
}
