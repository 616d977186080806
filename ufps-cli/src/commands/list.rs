//! Implementation of the 'list' subcommand.

use crate::cli::ListArgs;
use crate::error::{CliErrorContext, CliResult};

use ufps_core::terminal;
use ufps_core::{CoreError, find_video_files, format_bytes};

pub fn run_list(args: &ListArgs) -> CliResult<()> {
    let files = match find_video_files(&args.dir) {
        Ok(files) => files,
        Err(CoreError::NoFilesFound) => {
            terminal::print_warning(&format!("No video files found in {}", args.dir.display()));
            return Ok(());
        }
        Err(e) => return Err(e).cli_with_context(|| format!("Cannot read {}", args.dir.display())),
    };

    terminal::print_section("Video Files");
    for file in &files {
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let size = std::fs::metadata(file).map(|m| m.len()).unwrap_or(0);
        terminal::print_status(&name, &format_bytes(size), false);
    }
    terminal::print_sub_item(&format!("{} file(s)", files.len()));
    Ok(())
}
