//! Frame-rate upsampling stages and their orchestration.
//!
//! Each stage wraps one capability from [`crate::external`] and hands frames to
//! the next through a [`crate::frames::FrameSequence`]. The pipeline runs them
//! strictly in order inside a per-run working directory.

/// Decomposition of a video into frames, and audio copy
pub mod extract;

/// Interpolation with ordered fallback over entry points
pub mod interpolate;

/// Reassembly of frames (and audio) into the output video
pub mod encode;

/// Stage sequencing, progress reporting and working directory cleanup
pub mod pipeline;

pub use encode::FrameEncoder;
pub use extract::FrameExtractor;
pub use interpolate::{FrameInterpolator, InvocationStrategy};
pub use pipeline::{
    PipelineRun, PipelineStage, ProcessingPipeline, ProgressEvent, UpscaleRequest, UpscaleResult,
};
