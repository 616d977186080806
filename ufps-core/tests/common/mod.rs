// ufps-core/tests/common/mod.rs
//
// Fake capabilities shared by the integration tests. They produce
// deterministic frame directories and record what they were asked to do.

#![allow(dead_code)]

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use ufps_core::config::CoreConfig;
use ufps_core::error::{CoreError, CoreResult};
use ufps_core::external::{
    EncodeJob, FrameSynthesizer, FrameTranscoder, SynthesisOutcome, SynthesisRequest,
};
use ufps_core::frames::frame_file_name;
use ufps_core::media::{MetadataProvider, VideoDescriptor};

// ---- Probe ----

pub struct FakeProbe {
    pub descriptor: Option<VideoDescriptor>,
}

impl FakeProbe {
    pub fn video(fps: f64, frames: u64, audio: Option<&str>) -> Self {
        Self {
            descriptor: Some(VideoDescriptor {
                fps,
                width: 1280,
                height: 720,
                duration_secs: frames as f64 / fps,
                codec: "h264".to_string(),
                container: "mov,mp4,m4a,3gp,3g2,mj2".to_string(),
                bitrate_kbps: 4000,
                audio_codec: audio.map(str::to_string),
                file_size_mb: 12.5,
                frame_count: frames,
            }),
        }
    }

    pub fn broken() -> Self {
        Self { descriptor: None }
    }
}

impl MetadataProvider for FakeProbe {
    fn probe(&self, path: &Path) -> CoreResult<VideoDescriptor> {
        self.descriptor.clone().ok_or_else(|| CoreError::Probe {
            path: path.to_path_buf(),
            message: "ffprobe exited with exit status: 1:\nmoov atom not found".to_string(),
        })
    }
}

// ---- Transcoder ----

#[derive(Debug, Clone)]
pub struct EncodeCall {
    pub frames_dir: PathBuf,
    pub frame_count: usize,
    pub output: PathBuf,
    pub fps: f64,
    pub audio: Option<PathBuf>,
    pub crf: u8,
}

#[derive(Default)]
pub struct FakeTranscoder {
    pub frames: u64,
    pub fail_decode: bool,
    pub fail_audio: bool,
    pub fail_encode: bool,
    pub decode_dirs: RefCell<Vec<PathBuf>>,
    pub audio_calls: RefCell<Vec<PathBuf>>,
    pub encode_calls: RefCell<Vec<EncodeCall>>,
}

impl FakeTranscoder {
    pub fn with_frames(frames: u64) -> Self {
        Self {
            frames,
            ..Self::default()
        }
    }
}

fn pattern_dir(pattern: &Path) -> PathBuf {
    pattern.parent().map(Path::to_path_buf).unwrap_or_default()
}

impl FrameTranscoder for FakeTranscoder {
    fn decode_frames(&self, _video: &Path, frame_pattern: &Path, _quality: u8) -> CoreResult<()> {
        let dir = pattern_dir(frame_pattern);
        self.decode_dirs.borrow_mut().push(dir.clone());
        if self.fail_decode {
            return Err(CoreError::Extraction(
                "ffmpeg exited with exit status: 1:\nInvalid data found when processing input".to_string(),
            ));
        }
        for i in 1..=self.frames {
            fs::write(dir.join(frame_file_name(i)), b"frame")?;
        }
        Ok(())
    }

    fn copy_audio(&self, _video: &Path, output_path: &Path) -> CoreResult<()> {
        self.audio_calls.borrow_mut().push(output_path.to_path_buf());
        if self.fail_audio {
            return Err(CoreError::OperationFailed("ffmpeg exited with exit status: 1".to_string()));
        }
        fs::write(output_path, b"audio")?;
        Ok(())
    }

    fn encode_frames(&self, job: &EncodeJob<'_>) -> CoreResult<()> {
        let frames_dir = pattern_dir(job.frame_pattern);
        self.encode_calls.borrow_mut().push(EncodeCall {
            frame_count: fs::read_dir(&frames_dir)?.count(),
            frames_dir,
            output: job.output_path.to_path_buf(),
            fps: job.fps,
            audio: job.audio_path.map(Path::to_path_buf),
            crf: job.crf,
        });
        if self.fail_encode {
            return Err(CoreError::Encoding(
                "ffmpeg exited with exit status: 1:\nUnknown encoder 'libx264'".to_string(),
            ));
        }
        fs::write(job.output_path, b"encoded video")?;
        Ok(())
    }
}

// ---- Synthesizer ----

/// Entry points that exist, and the (entry point, with model dir) pairs that
/// succeed. Successful attempts write `2^exponent` frames per input frame.
pub struct FakeSynth {
    pub present: Vec<String>,
    pub succeeds: Vec<(String, bool)>,
    pub calls: RefCell<Vec<(String, bool)>>,
}

impl FakeSynth {
    pub fn new(present: &[&str], succeeds: &[(&str, bool)]) -> Self {
        Self {
            present: present.iter().map(|s| s.to_string()).collect(),
            succeeds: succeeds.iter().map(|(s, m)| (s.to_string(), *m)).collect(),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Every default entry point exists; the first one works.
    pub fn working() -> Self {
        Self::new(
            &["inference_video.py", "inference_img.py", "inference.py"],
            &[("inference_video.py", true)],
        )
    }

    pub fn broken() -> Self {
        Self::new(&["inference_video.py", "inference_img.py", "inference.py"], &[])
    }
}

impl FrameSynthesizer for FakeSynth {
    fn has_entry_point(&self, entry_point: &str) -> bool {
        self.present.iter().any(|p| p == entry_point)
    }

    fn invoke(&self, request: &SynthesisRequest<'_>) -> CoreResult<SynthesisOutcome> {
        let key = (request.entry_point.to_string(), request.model_dir.is_some());
        self.calls.borrow_mut().push(key.clone());

        if !self.succeeds.contains(&key) {
            return Ok(SynthesisOutcome {
                success: false,
                diagnostic: format!("{}: unrecognized arguments", request.entry_point),
            });
        }

        let inputs = fs::read_dir(request.input_dir)?.count();
        for i in 0..inputs * (1usize << request.exponent) {
            fs::write(request.output_dir.join(format!("{i:07}.png")), b"interpolated")?;
        }
        Ok(SynthesisOutcome {
            success: true,
            diagnostic: String::new(),
        })
    }
}

// ---- Environment ----

/// Scratch space: a source video, a temp base for working directories and a config.
pub struct TestEnv {
    pub root: TempDir,
    pub input: PathBuf,
    pub config: CoreConfig,
}

impl TestEnv {
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("tempdir");
        let input = root.path().join("holiday clip.mp4");
        fs::write(&input, b"source video").expect("write input");

        let mut config = CoreConfig::new(root.path().join("RIFE"), root.path().join("models"));
        config.temp_dir = Some(root.path().join("work"));
        fs::create_dir_all(root.path().join("work")).expect("work dir");

        Self {
            root,
            input,
            config,
        }
    }

    pub fn output(&self) -> PathBuf {
        self.root.path().join("out").join("holiday clip_60fps.mp4")
    }

    /// Working directories left under the temp base.
    pub fn leftover_run_dirs(&self) -> usize {
        fs::read_dir(self.root.path().join("work"))
            .map(|entries| entries.count())
            .unwrap_or(0)
    }
}
