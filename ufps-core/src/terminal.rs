//! Terminal UI components and styling for ufps.
//!
//! Consistent terminal output using a small hierarchy of sections, steps and
//! key/value rows, plus the stage progress bar shown while a video is
//! processed. Text goes through the `log` facade at info level so the CLI's
//! logger decides where it ends up.

use crate::processing::ProgressEvent;

use console::{Term, style};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::info;
use owo_colors::OwoColorize;
use std::io::{self, IsTerminal, Write};
use std::sync::Mutex;
use std::time::Duration;
use unicode_width::UnicodeWidthStr;

/// Width the labels of status rows are padded to.
const LABEL_WIDTH: usize = 15;

/// Visual hierarchy levels in the CLI output
#[derive(Debug, Clone, Copy)]
pub enum OutputLevel {
    /// Main sections (===== SECTION =====)
    Section,
    /// Processing steps (» Step)
    Subsection,
    /// Items under a step
    Progress,
    /// Key-value status rows
    Status,
}

impl OutputLevel {
    fn indent(self) -> &'static str {
        match self {
            OutputLevel::Section => "",
            OutputLevel::Subsection => "  ",
            OutputLevel::Progress => "    ",
            OutputLevel::Status => "      ",
        }
    }
}

/// Check if color should be used (respects NO_COLOR environment variable)
fn should_use_color() -> bool {
    std::env::var_os("NO_COLOR").is_none()
}

/// Print a section header for major workflow phases
pub fn print_section(title: &str) {
    info!("");
    if should_use_color() {
        info!("===== {} =====", title.to_uppercase().cyan());
    } else {
        info!("===== {} =====", title.to_uppercase());
    }
    info!("");
}

/// Print an item at the specified hierarchy level
pub fn print_item(level: OutputLevel, symbol: Option<&str>, text: &str, bold: bool) {
    let indent = level.indent();
    let prefix = symbol.map(|sym| format!("{sym} ")).unwrap_or_default();

    if should_use_color() && bold {
        info!("{indent}{prefix}{}", style(text).bold());
    } else {
        info!("{indent}{prefix}{text}");
    }
}

/// Print a processing step
pub fn print_processing(message: &str) {
    info!("");
    print_item(OutputLevel::Subsection, Some("»"), message, true);
}

/// Print a sub-item under a processing step
pub fn print_sub_item(message: &str) {
    print_item(OutputLevel::Progress, None, message, false);
}

/// Print a success message
pub fn print_success(message: &str) {
    info!("");
    if should_use_color() {
        info!("  ✓ {}", message.green());
    } else {
        info!("  ✓ {message}");
    }
}

/// Pads `label` to the status column width.
fn status_prefix(label: &str) -> String {
    let padding = LABEL_WIDTH.saturating_sub(label.width()).max(1);
    format!("{}{}:{}", OutputLevel::Status.indent(), label, " ".repeat(padding))
}

/// Print a status line (key-value pair)
pub fn print_status(label: &str, value: &str, highlight: bool) {
    let prefix = status_prefix(label);

    if !should_use_color() {
        info!("{prefix} {value}");
        return;
    }

    let colored_value = match () {
        () if label.contains("Audio") && value == "none" => value.yellow().to_string(),
        () if label.contains("Quality") || label.contains("Frame rate") => value.bold().to_string(),
        () if value.contains("Recommended") => value.green().to_string(),
        () if highlight => value.bold().to_string(),
        () => value.to_string(),
    };
    info!("{prefix} {colored_value}");
}

/// Print an error message
pub fn print_error(title: &str, message: &str, suggestion: Option<&str>) {
    if should_use_color() {
        info!("✗ {}", title.red().bold());
    } else {
        info!("✗ {title}");
    }

    info!("");
    info!("  Message:  {message}");

    if let Some(suggestion_text) = suggestion {
        info!("");
        info!("  Suggestion: {suggestion_text}");
    }

    info!("");
}

/// Print a warning message
pub fn print_warning(message: &str) {
    if should_use_color() {
        info!("  ⚠ {}", message.yellow());
    } else {
        info!("  ⚠ {message}");
    }
}

// ============================================================================
// STAGE PROGRESS BAR
// ============================================================================

/// The bar currently drawn on stderr, if any.
static ACTIVE_BAR: Mutex<Option<ProgressBar>> = Mutex::new(None);

fn set_active_bar(bar: Option<ProgressBar>) {
    if let Ok(mut slot) = ACTIVE_BAR.lock() {
        *slot = bar;
    }
}

fn active_bar() -> Option<ProgressBar> {
    ACTIVE_BAR.lock().ok().and_then(|slot| slot.clone())
}

/// Stderr writer for log output. While a [`StageProgress`] bar is drawn, the
/// bar is cleared for each write and redrawn below the new text.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProgressAwareStderr;

impl Write for ProgressAwareStderr {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match active_bar() {
            Some(bar) if !bar.is_hidden() => {
                bar.suspend(|| io::stderr().write_all(buf))?;
                Ok(buf.len())
            }
            _ => io::stderr().write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()
    }
}

/// Progress bar driven by pipeline checkpoints. Hidden when stderr is not a terminal.
///
/// Log output written through [`ProgressAwareStderr`] is kept clear of the bar
/// until [`finish`](Self::finish) or [`clear`](Self::clear).
pub struct StageProgress {
    bar: ProgressBar,
}

impl StageProgress {
    pub fn new() -> Self {
        let bar = ProgressBar::new(100);

        let term_width = Term::stderr().size().1 as usize;
        let template = if term_width >= 80 {
            "  ⧖ {msg:<32} {percent:>3}% [{bar:30}] {elapsed_precise}"
        } else {
            "  ⧖ {percent:>3}% [{bar:15}] {msg}"
        };
        let bar_style = ProgressStyle::default_bar()
            .template(template)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##.");
        bar.set_style(bar_style);

        if !std::io::stderr().is_terminal() {
            bar.set_draw_target(ProgressDrawTarget::hidden());
        }

        bar.enable_steady_tick(Duration::from_millis(100));
        set_active_bar(Some(bar.clone()));
        Self { bar }
    }

    /// Moves the bar to the event's checkpoint.
    pub fn update(&self, event: &ProgressEvent) {
        self.bar.set_position(u64::from(event.percent));
        self.bar.set_message(event.label.clone());
        if self.bar.is_hidden() {
            info!("  [{:>3}%] {}", event.percent, event.label);
        }
    }

    /// Finish the bar, leaving its final state visible
    pub fn finish(&self) {
        set_active_bar(None);
        self.bar.finish();
    }

    /// Clear the bar
    pub fn clear(&self) {
        set_active_bar(None);
        self.bar.finish_and_clear();
    }
}

impl Default for StageProgress {
    fn default() -> Self {
        Self::new()
    }
}
