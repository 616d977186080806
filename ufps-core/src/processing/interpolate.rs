// ============================================================================
// ufps-core/src/processing/interpolate.rs
// ============================================================================
//
// FRAME INTERPOLATION: Ordered fallback over interpolation entry points
//
// The interpolation tool's command line differs between versions and forks,
// so interpolation is a search over an ordered list of strategies. Every
// configured entry point is tried first with the model directory argument and
// then without it. The first attempt that exits successfully and leaves at
// least one image in the output directory wins.
//
// The output directory is emptied before every attempt, so frames written by
// a failed attempt can never be mistaken for the result of a later one.

use crate::error::{CoreError, CoreResult};
use crate::external::{FrameSynthesizer, SynthesisRequest};
use crate::fps_options::Multiplier;
use crate::frames::{FRAME_EXTENSION, FrameSequence};

use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// One way of invoking the interpolation tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationStrategy {
    pub entry_point: String,
    pub with_model_dir: bool,
}

impl InvocationStrategy {
    /// Expands entry points into the attempt order: each entry point with the
    /// model directory, then the same entry point without it.
    #[must_use]
    pub fn plan(entry_points: &[String]) -> Vec<Self> {
        entry_points
            .iter()
            .flat_map(|entry_point| {
                [true, false].map(|with_model_dir| Self {
                    entry_point: entry_point.clone(),
                    with_model_dir,
                })
            })
            .collect()
    }

    fn describe(&self) -> String {
        if self.with_model_dir {
            format!("{} (with model dir)", self.entry_point)
        } else {
            format!("{} (without model dir)", self.entry_point)
        }
    }
}

/// Runs the fallback search against a [`FrameSynthesizer`].
pub struct FrameInterpolator<'a> {
    synthesizer: &'a dyn FrameSynthesizer,
    strategies: Vec<InvocationStrategy>,
    model_dir: PathBuf,
}

fn io_failure(action: &str, dir: &Path, e: std::io::Error) -> CoreError {
    CoreError::Interpolation(format!("cannot {action} {}: {e}", dir.display()))
}

/// Removes everything in `dir` and recreates it empty.
fn reset_dir(dir: &Path) -> CoreResult<()> {
    if dir.exists() {
        fs::remove_dir_all(dir).map_err(|e| io_failure("clear", dir, e))?;
    }
    fs::create_dir_all(dir).map_err(|e| io_failure("create", dir, e))
}

fn contains_frames(dir: &Path) -> bool {
    fs::read_dir(dir).is_ok_and(|entries| {
        entries.filter_map(Result::ok).any(|entry| {
            entry
                .path()
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case(FRAME_EXTENSION))
        })
    })
}

impl<'a> FrameInterpolator<'a> {
    pub fn new(
        synthesizer: &'a dyn FrameSynthesizer,
        entry_points: &[String],
        model_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            synthesizer,
            strategies: InvocationStrategy::plan(entry_points),
            model_dir: model_dir.into(),
        }
    }

    /// Interpolates `input` by `multiplier` into `output_dir`.
    ///
    /// Returns the output as a canonical frame sequence. Fails with
    /// [`CoreError::Interpolation`] once every strategy has failed; the
    /// message lists each attempt and its diagnostics.
    pub fn interpolate(
        &self,
        input: &FrameSequence,
        output_dir: &Path,
        multiplier: Multiplier,
    ) -> CoreResult<FrameSequence> {
        let mut failures: Vec<String> = Vec::new();

        for strategy in &self.strategies {
            if !self.synthesizer.has_entry_point(&strategy.entry_point) {
                debug!("Skipping {}: entry point not present", strategy.describe());
                continue;
            }

            reset_dir(output_dir)?;
            let request = SynthesisRequest {
                entry_point: &strategy.entry_point,
                input_dir: input.dir(),
                output_dir,
                exponent: multiplier.exponent(),
                model_dir: strategy.with_model_dir.then_some(self.model_dir.as_path()),
            };
            debug!("Interpolation attempt: {}", strategy.describe());

            let failure = match self.synthesizer.invoke(&request) {
                Ok(outcome) if outcome.success && contains_frames(output_dir) => {
                    let frames = FrameSequence::adopt(output_dir).map_err(|e| {
                        CoreError::Interpolation(format!("unusable interpolated frames: {e}"))
                    })?;
                    info!(
                        "Interpolated {} frames into {} using {}",
                        input.count(),
                        frames.count(),
                        strategy.describe()
                    );
                    return Ok(frames);
                }
                Ok(outcome) if outcome.success => "exited successfully but wrote no frames".to_string(),
                Ok(outcome) => outcome.diagnostic,
                Err(e) => e.to_string(),
            };

            warn!("Interpolation attempt {} failed", strategy.describe());
            debug!("{failure}");
            failures.push(format!("{}: {failure}", strategy.describe()));
        }

        // Leave no partial output behind.
        if output_dir.exists() {
            fs::remove_dir_all(output_dir).map_err(|e| io_failure("remove", output_dir, e))?;
        }

        if failures.is_empty() {
            let names: Vec<&str> = self.strategies.iter().map(|s| s.entry_point.as_str()).collect();
            return Err(CoreError::Interpolation(format!(
                "no compatible entry point found (looked for {})",
                names.join(", ")
            )));
        }
        Err(CoreError::Interpolation(format!(
            "all {} attempts failed\n{}",
            failures.len(),
            failures.join("\n")
        )))
    }
}
