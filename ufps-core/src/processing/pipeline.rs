// ============================================================================
// ufps-core/src/processing/pipeline.rs
// ============================================================================
//
// PROCESSING PIPELINE: Probe, extract, interpolate, audio, encode
//
// ProcessingPipeline drives one upsampling run end to end. Stages run strictly
// in sequence and the first stage error aborts the run and is returned as is.
//
// Every run works inside its own PipelineRun, which owns a uniquely named
// temporary directory. The directory is removed when the run is dropped, so
// cleanup happens on success, on error and on panic alike.
//
// Progress is reported at fixed checkpoints through a caller supplied
// callback: 0 extraction, 25 interpolation, 50 audio, 75 encoding, 100 done.

use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};
use crate::external::ffmpeg::audio_container_extension;
use crate::external::{FrameSynthesizer, FrameTranscoder};
use crate::fps_options::Multiplier;
use crate::media::{MetadataProvider, VideoDescriptor};
use crate::processing::{FrameEncoder, FrameExtractor, FrameInterpolator};
use crate::temp_files::create_run_dir;

use log::{debug, error, info};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tempfile::TempDir;

// ============================================================================
// REQUEST / RESULT / PROGRESS
// ============================================================================

/// Parameters of one upsampling run.
#[derive(Debug, Clone)]
pub struct UpscaleRequest {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Frame rate the output is encoded at.
    pub target_fps: f64,
    pub multiplier: Multiplier,
    /// Constant-quality value for the final encode.
    pub crf: u8,
}

/// What a successful run produced.
#[derive(Debug, Clone)]
pub struct UpscaleResult {
    pub output_path: PathBuf,
    pub source: VideoDescriptor,
    pub source_frames: u64,
    pub output_frames: u64,
    pub has_audio: bool,
    pub output_size: u64,
    pub elapsed: Duration,
}

/// States a run moves through. Any state may move to `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Created,
    FramesExtracted,
    Interpolated,
    AudioExtracted,
    Encoded,
    Complete,
    Failed,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Created => "created",
            PipelineStage::FramesExtracted => "frames extracted",
            PipelineStage::Interpolated => "interpolated",
            PipelineStage::AudioExtracted => "audio extracted",
            PipelineStage::Encoded => "encoded",
            PipelineStage::Complete => "complete",
            PipelineStage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// A progress checkpoint. Observation only.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressEvent {
    pub percent: u8,
    pub label: String,
}

impl ProgressEvent {
    fn new(percent: u8, label: impl Into<String>) -> Self {
        Self {
            percent,
            label: label.into(),
        }
    }
}

// ============================================================================
// PIPELINE RUN
// ============================================================================

/// Working context of one run: the temporary directory and what lives in it.
#[derive(Debug)]
pub struct PipelineRun {
    dir: TempDir,
    stage: PipelineStage,
    frames_dir: PathBuf,
    interpolated_dir: PathBuf,
    audio_path: Option<PathBuf>,
}

impl PipelineRun {
    /// Creates the working directory for a run on `input`.
    pub fn create(config: &CoreConfig, input: &Path) -> CoreResult<Self> {
        let dir = create_run_dir(config, input)?;
        debug!("Created working directory {}", dir.path().display());
        Ok(Self {
            frames_dir: dir.path().join("frames"),
            interpolated_dir: dir.path().join("interpolated"),
            dir,
            stage: PipelineStage::Created,
            audio_path: None,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    #[must_use]
    pub fn stage(&self) -> PipelineStage {
        self.stage
    }

    #[must_use]
    pub fn frames_dir(&self) -> &Path {
        &self.frames_dir
    }

    #[must_use]
    pub fn interpolated_dir(&self) -> &Path {
        &self.interpolated_dir
    }

    #[must_use]
    pub fn audio_path(&self) -> Option<&Path> {
        self.audio_path.as_deref()
    }

    fn advance(&mut self, stage: PipelineStage) {
        debug!("Pipeline stage: {} -> {}", self.stage, stage);
        self.stage = stage;
    }

    /// Removes the working directory, reporting removal errors.
    pub fn close(self) -> CoreResult<()> {
        let path = self.dir.path().to_path_buf();
        self.dir.close()?;
        debug!("Removed working directory {}", path.display());
        Ok(())
    }
}

// ============================================================================
// PIPELINE
// ============================================================================

/// Runs the upsampling stages against the given capabilities.
pub struct ProcessingPipeline<'a> {
    config: &'a CoreConfig,
    probe: &'a dyn MetadataProvider,
    transcoder: &'a dyn FrameTranscoder,
    synthesizer: &'a dyn FrameSynthesizer,
}

impl<'a> ProcessingPipeline<'a> {
    pub fn new(
        config: &'a CoreConfig,
        probe: &'a dyn MetadataProvider,
        transcoder: &'a dyn FrameTranscoder,
        synthesizer: &'a dyn FrameSynthesizer,
    ) -> Self {
        Self {
            config,
            probe,
            transcoder,
            synthesizer,
        }
    }

    /// Runs the whole pipeline for `request`, reporting checkpoints to `on_progress`.
    ///
    /// A probe failure returns before any working directory is created. Any
    /// later stage failure aborts the run; the working directory is removed in
    /// both cases and the stage's error is returned unchanged.
    pub fn run<F>(&self, request: &UpscaleRequest, mut on_progress: F) -> CoreResult<UpscaleResult>
    where
        F: FnMut(&ProgressEvent),
    {
        let started = Instant::now();

        if paths_match(&request.input, &request.output) {
            return Err(CoreError::PathError(format!(
                "output {} would overwrite the input",
                request.output.display()
            )));
        }

        let source = self.probe.probe(&request.input)?;
        info!(
            "Upsampling {} ({:.3} fps, {}) to {} fps with {} interpolation",
            request.input.display(),
            source.fps,
            source.resolution(),
            request.target_fps,
            request.multiplier
        );

        let mut run = PipelineRun::create(self.config, &request.input)?;
        match self.run_stages(&mut run, request, &source, &mut on_progress) {
            Ok((source_frames, output_frames)) => {
                run.advance(PipelineStage::Complete);
                let has_audio = run.audio_path().is_some();
                run.close()?;
                on_progress(&ProgressEvent::new(100, "Complete!"));

                let output_size = std::fs::metadata(&request.output).map_or(0, |m| m.len());
                Ok(UpscaleResult {
                    output_path: request.output.clone(),
                    source,
                    source_frames,
                    output_frames,
                    has_audio,
                    output_size,
                    elapsed: started.elapsed(),
                })
            }
            Err(e) => {
                error!(
                    "Pipeline failed after stage '{}': {}",
                    run.stage(),
                    e
                );
                run.advance(PipelineStage::Failed);
                // Dropping the run removes the working directory.
                drop(run);
                Err(e)
            }
        }
    }

    fn run_stages<F>(
        &self,
        run: &mut PipelineRun,
        request: &UpscaleRequest,
        source: &VideoDescriptor,
        on_progress: &mut F,
    ) -> CoreResult<(u64, u64)>
    where
        F: FnMut(&ProgressEvent),
    {
        let extractor = FrameExtractor::new(self.transcoder);

        on_progress(&ProgressEvent::new(0, "Extracting frames..."));
        let frames = extractor.extract_frames(&request.input, run.frames_dir(), self.config.frame_quality)?;
        run.advance(PipelineStage::FramesExtracted);

        on_progress(&ProgressEvent::new(
            25,
            format!("Running {} interpolation...", request.multiplier),
        ));
        let interpolator =
            FrameInterpolator::new(self.synthesizer, &self.config.entry_points, &self.config.models_dir);
        let interpolated = interpolator.interpolate(&frames, run.interpolated_dir(), request.multiplier)?;
        run.advance(PipelineStage::Interpolated);

        on_progress(&ProgressEvent::new(50, "Processing audio..."));
        if let Some(codec) = source.audio_codec.as_deref() {
            let audio_out = run
                .path()
                .join(format!("audio.{}", audio_container_extension(codec)));
            run.audio_path = extractor.extract_audio(&request.input, &audio_out);
            if run.audio_path.is_some() {
                run.advance(PipelineStage::AudioExtracted);
            }
        } else {
            info!("Source has no audio track, output will be silent");
        }

        on_progress(&ProgressEvent::new(75, "Encoding final video..."));
        let encoder = FrameEncoder::new(self.transcoder, self.config);
        encoder.encode(
            &interpolated,
            &request.output,
            request.target_fps,
            run.audio_path(),
            request.crf,
        )?;
        run.advance(PipelineStage::Encoded);

        Ok((frames.count(), interpolated.count()))
    }
}

fn paths_match(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
