//! Implementation of the 'options' subcommand.

use crate::cli::OptionsArgs;
use crate::commands::info::{print_json, probe_video};
use crate::error::CliResult;

use serde_json::json;
use ufps_core::fps_options::{FpsOption, recommended_option, solve};
use ufps_core::terminal;
use ufps_core::CoreConfig;

/// One table row: "60 fps   2×  Adds 1 frame between each original (Smooth motion)".
pub fn format_option_row(option: &FpsOption, recommended: bool) -> String {
    let approx = if option.exact { " " } else { "~" };
    let mut row = format!(
        "{approx}{:>3} fps  {:<3} {}",
        option.rounded_fps(),
        option.multiplier.to_string(),
        option.describe()
    );
    if recommended {
        row.push_str("  [Recommended]");
    }
    row
}

pub fn run_options(config: &CoreConfig, args: &OptionsArgs) -> CliResult<()> {
    let descriptor = probe_video(config, &args.video)?;
    let options = solve(descriptor.fps);
    let recommended = recommended_option(&options);

    if args.json {
        return print_json(&json!({
            "current_fps": descriptor.fps,
            "options": options,
            "recommended": recommended,
        }));
    }

    terminal::print_section("Frame Rate Options");
    terminal::print_status("Current", &format!("{:.2} fps", descriptor.fps), true);

    if options.is_empty() {
        terminal::print_warning("This video is already at or above the highest reachable frame rate (240 fps).");
        return Ok(());
    }

    terminal::print_processing("Available targets");
    for option in &options {
        terminal::print_sub_item(&format_option_row(option, Some(*option) == recommended));
    }
    Ok(())
}
