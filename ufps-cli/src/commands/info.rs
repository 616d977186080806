//! Implementation of the 'info' subcommand.

use crate::cli::InfoArgs;
use crate::error::CliResult;

use std::path::Path;
use ufps_core::media::{FfprobeProvider, MetadataProvider, VideoDescriptor};
use ufps_core::terminal;
use ufps_core::{CoreConfig, CoreError, format_duration};

/// Checks that `video` is an existing file and probes it.
pub fn probe_video(config: &CoreConfig, video: &Path) -> CliResult<VideoDescriptor> {
    if !video.is_file() {
        return Err(CoreError::PathError(format!(
            "Input file '{}' does not exist",
            video.display()
        )));
    }
    FfprobeProvider::new(&config.ffprobe_path).probe(video)
}

/// Prints a JSON document to stdout.
pub fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> CliResult<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| CoreError::OperationFailed(format!("Failed to serialize output: {e}")))?;
    println!("{text}");
    Ok(())
}

pub fn print_descriptor(descriptor: &VideoDescriptor) {
    terminal::print_status("Frame rate", &format!("{:.2} fps", descriptor.fps), true);
    terminal::print_status("Resolution", &descriptor.resolution(), false);
    terminal::print_status("Duration", &format_duration(descriptor.duration_secs), false);
    terminal::print_status("Frames", &descriptor.frame_count.to_string(), false);
    terminal::print_status("Codec", &descriptor.codec, false);
    if !descriptor.container.is_empty() {
        terminal::print_status("Container", &descriptor.container, false);
    }
    terminal::print_status("Bitrate", &format!("{} kbps", descriptor.bitrate_kbps), false);
    terminal::print_status("Audio", descriptor.audio_codec.as_deref().unwrap_or("none"), false);
    terminal::print_status("File size", &ufps_core::utils::format_megabytes(descriptor.file_size_mb), false);
}

pub fn run_info(config: &CoreConfig, args: &InfoArgs) -> CliResult<()> {
    let descriptor = probe_video(config, &args.video)?;

    if args.json {
        return print_json(&descriptor);
    }

    terminal::print_section("Video Information");
    terminal::print_processing(&args.video.display().to_string());
    print_descriptor(&descriptor);
    Ok(())
}
