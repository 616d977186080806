//! Implementation of the 'run' subcommand.
//!
//! Probes the input, picks the frame rate option, validates the installation
//! and drives the core pipeline with a progress bar.

use crate::cli::RunArgs;
use crate::commands::info::probe_video;
use crate::commands::options::format_option_row;
use crate::error::{CliErrorContext, CliResult};

use log::{debug, info};
use std::time::Duration;
use ufps_core::config::validate_crf;
use ufps_core::fps_options::{FpsOption, find_option_for_fps, recommended_option, solve};
use ufps_core::terminal::{self, StageProgress};
use ufps_core::utils::{estimate_output_size_mb, format_megabytes};
use ufps_core::{
    CoreConfig, CoreError, ExternalTools, Multiplier, ProcessingPipeline, UpscaleRequest,
    default_output_path, format_bytes, format_duration,
};

fn available(options: &[FpsOption]) -> String {
    options
        .iter()
        .map(|o| format!("{} fps", o.rounded_fps()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Picks the option for the requested fps or multiplier, else the recommended one.
pub fn select_option(
    options: &[FpsOption],
    current_fps: f64,
    fps: Option<f64>,
    multiplier: Option<Multiplier>,
) -> CliResult<FpsOption> {
    if options.is_empty() {
        return Err(CoreError::OperationFailed(format!(
            "No higher frame rate is reachable from {current_fps:.2} fps"
        )));
    }

    if let Some(fps) = fps {
        return find_option_for_fps(options, fps).cli_with_context(|| {
            format!(
                "{fps} fps is not reachable from {current_fps:.2} fps (available: {})",
                available(options)
            )
        });
    }

    if let Some(multiplier) = multiplier {
        return options
            .iter()
            .find(|o| o.multiplier == multiplier)
            .copied()
            .cli_with_context(|| {
                format!(
                    "{multiplier} would exceed 240 fps from {current_fps:.2} fps (available: {})",
                    available(options)
                )
            });
    }

    recommended_option(options).cli_context("No frame rate option available")
}

pub fn run_upscale(mut config: CoreConfig, args: &RunArgs) -> CliResult<()> {
    let source = probe_video(&config, &args.video)?;
    let options = solve(source.fps);
    let option = select_option(&options, source.fps, args.fps, args.multiplier)?;
    debug!("Selected option: {option:?}");

    let crf = args.crf();
    validate_crf(crf)?;

    config.interpolation_timeout = args.timeout.map(Duration::from_secs);
    config.validate()?;
    ExternalTools::check(&config)?;

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&args.video, option.actual_fps));

    terminal::print_section("Frame Rate Upsampling");
    terminal::print_status("Input", &args.video.display().to_string(), false);
    terminal::print_status("Current", &format!("{:.2} fps", source.fps), false);
    terminal::print_status("Frame rate", &format_option_row(&option, false).trim().to_string(), true);
    terminal::print_status("Quality", &format!("CRF {crf}"), false);
    terminal::print_status(
        "Estimated size",
        &format!(
            "~{}",
            format_megabytes(estimate_output_size_mb(source.file_size_mb, option.multiplier.factor(), crf))
        ),
        false,
    );
    terminal::print_status("Output", &output.display().to_string(), false);
    info!("");

    let tools = ExternalTools::from_config(&config);
    let pipeline = ProcessingPipeline::new(&config, &tools.probe, &tools.transcoder, &tools.synthesizer);
    let request = UpscaleRequest {
        input: args.video.clone(),
        output,
        target_fps: option.actual_fps,
        multiplier: option.multiplier,
        crf,
    };

    let progress = StageProgress::new();
    let result = match pipeline.run(&request, |event| progress.update(event)) {
        Ok(result) => {
            progress.finish();
            result
        }
        Err(e) => {
            progress.clear();
            return Err(e);
        }
    };

    terminal::print_success("Upsampling complete");
    terminal::print_status("Output", &result.output_path.display().to_string(), false);
    terminal::print_status(
        "Frames",
        &format!("{} -> {}", result.source_frames, result.output_frames),
        false,
    );
    terminal::print_status("Audio", if result.has_audio { "copied" } else { "none" }, false);
    terminal::print_status("Size", &format_bytes(result.output_size), false);
    terminal::print_status("Time", &format_duration(result.elapsed.as_secs_f64()), false);
    terminal::print_status(
        "Finished",
        &chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        false,
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_selection_is_sixty() {
        let options = solve(30.0);
        let option = select_option(&options, 30.0, None, None).unwrap();
        assert_eq!(option.rounded_fps(), 60);
        assert_eq!(option.multiplier, Multiplier::X2);
    }

    #[test]
    fn explicit_fps_matches_within_tolerance() {
        let options = solve(29.97);
        let option = select_option(&options, 29.97, Some(120.0), None).unwrap();
        assert_eq!(option.multiplier, Multiplier::X4);

        let err = select_option(&options, 29.97, Some(75.0), None).unwrap_err();
        assert!(err.to_string().contains("not reachable"));
    }

    #[test]
    fn explicit_multiplier() {
        let options = solve(24.0);
        let option = select_option(&options, 24.0, None, Some(Multiplier::X8)).unwrap();
        assert!((option.actual_fps - 192.0).abs() < 1e-9);

        let options = solve(60.0);
        assert!(select_option(&options, 60.0, None, Some(Multiplier::X8)).is_err());
    }

    #[test]
    fn nothing_reachable_at_240() {
        let err = select_option(&solve(240.0), 240.0, None, None).unwrap_err();
        assert!(err.to_string().contains("No higher frame rate"));
    }
}
