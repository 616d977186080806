//! ffprobe integration for media analysis.
//!
//! Runs ffprobe through the `ffprobe` crate and normalizes the first video
//! stream, the first audio stream and the container metadata into a
//! [`VideoDescriptor`].

use super::{FALLBACK_FPS, MetadataProvider, VideoDescriptor};
use crate::error::{CoreError, CoreResult, diagnostic_tail, tool_failure_message};
use crate::utils::bytes_to_megabytes;

use ffprobe::{Config as FfprobeConfig, FfProbe, FfProbeError};
use log::{debug, error};
use std::path::{Path, PathBuf};

/// Lines of ffprobe stderr kept in error messages.
const DIAGNOSTIC_LINES: usize = 20;

/// Parses an ffprobe frame rate, either rational ("30000/1001") or a bare number.
///
/// Falls back to [`FALLBACK_FPS`] for a zero denominator or anything that does
/// not yield a positive finite rate.
#[must_use]
pub fn parse_frame_rate(raw: &str) -> f64 {
    let raw = raw.trim();
    let parsed = match raw.split_once('/') {
        Some((num, den)) => match (num.trim().parse::<f64>(), den.trim().parse::<f64>()) {
            (Ok(_), Ok(den)) if den == 0.0 => None,
            (Ok(num), Ok(den)) => Some(num / den),
            _ => None,
        },
        None => raw.parse::<f64>().ok(),
    };

    match parsed {
        Some(fps) if fps.is_finite() && fps > 0.0 => fps,
        _ => FALLBACK_FPS,
    }
}

fn non_negative(value: Option<i64>) -> u32 {
    value
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or(0)
}

impl VideoDescriptor {
    /// Builds a descriptor from ffprobe's format and stream metadata.
    ///
    /// `file_size_bytes` comes from the filesystem, not from the probe.
    pub fn from_ffprobe(path: &Path, metadata: &FfProbe, file_size_bytes: u64) -> CoreResult<Self> {
        let video = metadata
            .streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some("video"))
            .ok_or_else(|| CoreError::Probe {
                path: path.to_path_buf(),
                message: "no video stream found".to_string(),
            })?;
        let audio = metadata
            .streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some("audio"));

        let fps = parse_frame_rate(&video.r_frame_rate);

        let duration_secs = metadata
            .format
            .duration
            .as_deref()
            .and_then(|d| d.trim().parse::<f64>().ok())
            .filter(|d| d.is_finite() && *d >= 0.0)
            .unwrap_or(0.0);

        let bitrate_kbps = metadata
            .format
            .bit_rate
            .as_deref()
            .and_then(|b| b.trim().parse::<u64>().ok())
            .map_or(0, |b| b / 1000);

        let frame_count = video
            .nb_frames
            .as_deref()
            .and_then(|n| n.trim().parse::<u64>().ok())
            .unwrap_or((fps * duration_secs) as u64);

        Ok(VideoDescriptor {
            fps,
            width: non_negative(video.width),
            height: non_negative(video.height),
            duration_secs,
            codec: video
                .codec_name
                .clone()
                .unwrap_or_else(|| "unknown".to_string()),
            container: metadata.format.format_name.clone(),
            bitrate_kbps,
            audio_codec: audio.map(|a| {
                a.codec_name
                    .clone()
                    .unwrap_or_else(|| "unknown".to_string())
            }),
            file_size_mb: bytes_to_megabytes(file_size_bytes),
            frame_count,
        })
    }
}

/// Maps an ffprobe crate error to a probe error, keeping ffprobe's stderr.
fn map_ffprobe_error(path: &Path, ffprobe_bin: &Path, err: FfProbeError) -> CoreError {
    let message = match err {
        FfProbeError::Io(io_err) => format!("could not run {}: {io_err}", ffprobe_bin.display()),
        FfProbeError::Status(output) => {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tool_failure_message(
                "ffprobe",
                output.status,
                &diagnostic_tail(&stderr, DIAGNOSTIC_LINES),
            )
        }
        FfProbeError::Deserialize(err) => format!("unparseable ffprobe output: {err}"),
        other => format!("ffprobe failed: {other}"),
    };
    CoreError::Probe {
        path: path.to_path_buf(),
        message,
    }
}

/// [`MetadataProvider`] backed by the ffprobe binary.
#[derive(Debug, Clone)]
pub struct FfprobeProvider {
    ffprobe_path: PathBuf,
}

impl FfprobeProvider {
    pub fn new(ffprobe_path: impl Into<PathBuf>) -> Self {
        Self {
            ffprobe_path: ffprobe_path.into(),
        }
    }
}

impl MetadataProvider for FfprobeProvider {
    fn probe(&self, path: &Path) -> CoreResult<VideoDescriptor> {
        debug!(
            "Running ffprobe (via crate) with {} on: {}",
            self.ffprobe_path.display(),
            path.display()
        );

        let config = FfprobeConfig::builder()
            .ffprobe_bin(&self.ffprobe_path)
            .build();
        let metadata = ffprobe::ffprobe_config(config, path).map_err(|err| {
            error!("ffprobe failed for {}: {err:?}", path.display());
            map_ffprobe_error(path, &self.ffprobe_path, err)
        })?;

        let file_size = std::fs::metadata(path)
            .map_err(|e| CoreError::Probe {
                path: path.to_path_buf(),
                message: format!("cannot read file size: {e}"),
            })?
            .len();

        let descriptor = VideoDescriptor::from_ffprobe(path, &metadata, file_size)?;
        debug!(
            "Probed {}: {:.3} fps, {}, {:.1}s, {} frames",
            path.display(),
            descriptor.fps,
            descriptor.resolution(),
            descriptor.duration_secs,
            descriptor.frame_count
        );
        Ok(descriptor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ffprobe::{Format, Stream};

    fn stream(codec_type: &str, codec_name: Option<&str>) -> Stream {
        let mut stream = Stream::default();
        stream.codec_type = Some(codec_type.to_string());
        stream.codec_name = codec_name.map(str::to_string);
        stream
    }

    fn sample() -> FfProbe {
        let mut video = stream("video", Some("h264"));
        video.width = Some(1920);
        video.height = Some(1080);
        video.r_frame_rate = "30000/1001".to_string();
        video.nb_frames = Some("1798".to_string());

        let mut format = Format::default();
        format.format_name = "mov,mp4,m4a,3gp,3g2,mj2".to_string();
        format.duration = Some("60.060000".to_string());
        format.bit_rate = Some("8123456".to_string());

        FfProbe {
            streams: vec![video, stream("audio", Some("aac")), stream("audio", Some("opus"))],
            format,
        }
    }

    #[test]
    fn parses_rational_and_bare_rates() {
        assert!((parse_frame_rate("30000/1001") - 29.97).abs() < 0.001);
        assert_eq!(parse_frame_rate("25/1"), 25.0);
        assert_eq!(parse_frame_rate("24"), 24.0);
        assert_eq!(parse_frame_rate("23.976"), 23.976);
    }

    #[test]
    fn unusable_rates_fall_back_to_thirty() {
        assert_eq!(parse_frame_rate("0/0"), FALLBACK_FPS);
        assert_eq!(parse_frame_rate("25/0"), FALLBACK_FPS);
        assert_eq!(parse_frame_rate("0/1"), FALLBACK_FPS);
        assert_eq!(parse_frame_rate("abc"), FALLBACK_FPS);
        assert_eq!(parse_frame_rate(""), FALLBACK_FPS);
    }

    #[test]
    fn builds_descriptor_from_metadata() {
        let d = VideoDescriptor::from_ffprobe(Path::new("in.mp4"), &sample(), 3 * 1024 * 1024)
            .expect("descriptor");
        assert!((d.fps - 29.97).abs() < 0.001);
        assert_eq!((d.width, d.height), (1920, 1080));
        assert_eq!(d.codec, "h264");
        assert_eq!(d.container, "mov,mp4,m4a,3gp,3g2,mj2");
        assert_eq!(d.bitrate_kbps, 8123);
        assert_eq!(d.audio_codec.as_deref(), Some("aac"));
        assert!(d.has_audio());
        assert_eq!(d.frame_count, 1798);
        assert!((d.duration_secs - 60.06).abs() < 1e-9);
        assert!((d.file_size_mb - 3.0).abs() < 1e-9);
    }

    #[test]
    fn estimates_frame_count_and_defaults_missing_fields() {
        let mut video = stream("video", None);
        video.r_frame_rate = "24/1".to_string();
        let mut format = Format::default();
        format.duration = Some("10.5".to_string());
        let metadata = FfProbe {
            streams: vec![video],
            format,
        };

        let d = VideoDescriptor::from_ffprobe(Path::new("x.mkv"), &metadata, 0).expect("descriptor");
        assert_eq!(d.frame_count, 252);
        assert_eq!(d.codec, "unknown");
        assert_eq!(d.bitrate_kbps, 0);
        assert!(!d.has_audio());

        let mut unknown_rate = stream("video", None);
        unknown_rate.r_frame_rate = "0/0".to_string();
        let metadata = FfProbe {
            streams: vec![unknown_rate],
            format: Format::default(),
        };
        let d = VideoDescriptor::from_ffprobe(Path::new("x.mkv"), &metadata, 0).expect("descriptor");
        assert_eq!(d.duration_secs, 0.0);
        assert_eq!(d.fps, FALLBACK_FPS);
        assert_eq!(d.frame_count, 0);
    }

    #[test]
    fn missing_video_stream_is_a_probe_error() {
        let metadata = FfProbe {
            streams: vec![stream("audio", Some("mp3"))],
            format: Format::default(),
        };
        let err = VideoDescriptor::from_ffprobe(Path::new("song.mp3"), &metadata, 0).unwrap_err();
        assert!(matches!(err, CoreError::Probe { .. }));
        assert!(err.to_string().contains("no video stream"));
    }

    #[test]
    fn deserialize_errors_map_to_probe() {
        let json_err = serde_json::from_str::<u32>("not json").unwrap_err();
        let err = map_ffprobe_error(
            Path::new("x.mp4"),
            Path::new("ffprobe"),
            FfProbeError::Deserialize(json_err),
        );
        assert_eq!(err.stage(), Some("probe"));
        assert!(err.to_string().contains("unparseable ffprobe output"));
    }

    #[cfg(unix)]
    #[test]
    fn status_errors_keep_stderr() {
        use std::os::unix::process::ExitStatusExt;

        let output = std::process::Output {
            status: std::process::ExitStatus::from_raw(1 << 8),
            stdout: Vec::new(),
            stderr: b"x.mp4: moov atom not found\n".to_vec(),
        };
        let err = map_ffprobe_error(Path::new("x.mp4"), Path::new("ffprobe"), FfProbeError::Status(output));
        assert!(matches!(err, CoreError::Probe { .. }));
        assert!(err.to_string().contains("moov atom not found"));
    }

    #[test]
    fn missing_binary_is_a_probe_error() {
        let provider = FfprobeProvider::new("/nonexistent/ffprobe-binary");
        let err = provider.probe(Path::new("whatever.mp4")).unwrap_err();
        assert!(matches!(err, CoreError::Probe { .. }));
        assert!(err.to_string().contains("could not run"));
    }
}
