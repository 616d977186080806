// ufps-cli/src/main.rs
//
// Entry point for the `ufps` binary: parses arguments, sets up logging and
// hands off to the command implementations. Errors are printed with a hint
// and turn into exit code 1.

use clap::Parser;
use std::process;
use ufps_cli::error::suggestion_for;
use ufps_cli::{Cli, dispatch, logging};
use ufps_core::terminal;

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = dispatch(cli) {
        log::debug!("Command failed: {e:?}");
        terminal::print_error("Error", &e.to_string(), suggestion_for(&e));
        process::exit(1);
    }
}
