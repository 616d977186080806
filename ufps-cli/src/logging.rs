// ============================================================================
// ufps-cli/src/logging.rs
// ============================================================================
//
// LOGGING SETUP: env_logger initialization for the ufps binary
//
// Terminal output from ufps-core goes through `log::info!`, so info records
// are printed bare. Other levels carry a styled level tag. Records are written
// through ProgressAwareStderr so they never land on top of the progress bar.
//
// USAGE:
// - default: info
// - --verbose: debug
// - RUST_LOG overrides both (e.g. RUST_LOG=ufps_core=trace)

use env_logger::{Target, WriteStyle};
use log::LevelFilter;
use std::io::{IsTerminal, Write};
use ufps_core::terminal::ProgressAwareStderr;

/// Level used when RUST_LOG is not set.
pub fn default_level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Level tags are styled only on a terminal and when NO_COLOR is unset.
pub fn write_style(is_terminal: bool, no_color: bool) -> WriteStyle {
    if is_terminal && !no_color {
        WriteStyle::Always
    } else {
        WriteStyle::Never
    }
}

/// Installs the global logger.
pub fn init(verbose: bool) {
    let env = env_logger::Env::default().default_filter_or(default_level(verbose).as_str());
    let colors = write_style(
        std::io::stderr().is_terminal(),
        std::env::var_os("NO_COLOR").is_some(),
    );
    env_logger::Builder::from_env(env)
        .target(Target::Pipe(Box::new(ProgressAwareStderr)))
        .write_style(colors)
        .format(|buf, record| {
            if record.level() == log::Level::Info {
                writeln!(buf, "{}", record.args())
            } else {
                let style = buf.default_level_style(record.level());
                writeln!(buf, "{style}{:<5}{style:#} {}", record.level(), record.args())
            }
        })
        .init();

    log::debug!("Logger initialized");
}
