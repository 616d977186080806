//! Command implementations for the CLI.
//!
//! Each submodule contains the implementation of one subcommand.

/// `info`: probe a video and print its properties.
pub mod info;

/// `list`: list the video files in a directory.
pub mod list;

/// `options`: list the frame rates a video can be upsampled to.
pub mod options;

/// `run`: upsample a video through the full pipeline.
pub mod run;

use crate::cli::{Cli, Commands};
use crate::config::resolve_config;
use crate::error::CliResult;

/// Runs the parsed command line.
pub fn dispatch(cli: Cli) -> CliResult<()> {
    let config = resolve_config(&cli.tools);

    match cli.command {
        Commands::Info(args) => info::run_info(&config, &args),
        Commands::Options(args) => options::run_options(&config, &args),
        Commands::List(args) => list::run_list(&args),
        Commands::Run(args) => run::run_upscale(config, &args),
    }
}
