//! Core library for upsampling video frame rates with AI frame interpolation.
//!
//! This crate works out which target frame rates a video can reach, probes
//! videos with ffprobe, decomposes them into frames with ffmpeg, runs an
//! external interpolation tool over the frames and re-encodes the result with
//! the original audio.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use ufps_core::{CoreConfig, ExternalTools, ProcessingPipeline, UpscaleRequest};
//! use ufps_core::media::MetadataProvider;
//! use std::path::{Path, PathBuf};
//!
//! let config = CoreConfig::with_install_root(Path::new("/home/me"));
//! config.validate().unwrap();
//!
//! let tools = ExternalTools::from_config(&config);
//! let video = PathBuf::from("clip.mp4");
//! let source = tools.probe.probe(&video).unwrap();
//!
//! let options = ufps_core::fps_options::solve(source.fps);
//! let option = ufps_core::fps_options::recommended_option(&options).unwrap();
//!
//! let pipeline = ProcessingPipeline::new(&config, &tools.probe, &tools.transcoder, &tools.synthesizer);
//! let request = UpscaleRequest {
//!     input: video.clone(),
//!     output: ufps_core::default_output_path(&video, option.actual_fps),
//!     target_fps: option.actual_fps,
//!     multiplier: option.multiplier,
//!     crf: 18,
//! };
//! let result = pipeline
//!     .run(&request, |event| println!("{:>3}% {}", event.percent, event.label))
//!     .unwrap();
//! println!("Wrote {}", result.output_path.display());
//! ```

pub mod config;
pub mod discovery;
pub mod error;
pub mod external;
pub mod fps_options;
pub mod frames;
pub mod media;
pub mod processing;
pub mod temp_files;
pub mod terminal;
pub mod utils;

// Re-exports for public API
pub use config::{CoreConfig, QualityPreset};
pub use discovery::find_video_files;
pub use error::{CoreError, CoreResult};
pub use external::{ExternalTools, locate_codec_tools};
pub use fps_options::{FpsOption, Multiplier, solve};
pub use frames::FrameSequence;
pub use media::{FfprobeProvider, MetadataProvider, VideoDescriptor};
pub use processing::{
    PipelineStage, ProcessingPipeline, ProgressEvent, UpscaleRequest, UpscaleResult,
};
pub use utils::{default_output_path, estimate_output_size_mb, format_bytes, format_duration};
