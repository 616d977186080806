// ufps-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use ufps_core::{Multiplier, QualityPreset};

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "UFPS: AI frame rate upsampling",
    long_about = "Raises a video's frame rate by interpolating new frames with RIFE and re-encoding with ffmpeg."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Show debug output (RUST_LOG overrides this)
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(flatten)]
    pub tools: ToolArgs,
}

/// Locations of the external tools. Each falls back to an environment
/// variable, then to the default install layout or PATH.
#[derive(Args, Debug, Default, Clone)]
pub struct ToolArgs {
    /// ffmpeg binary
    #[arg(long, global = true, value_name = "PATH", env = "UFPS_FFMPEG")]
    pub ffmpeg: Option<PathBuf>,

    /// ffprobe binary
    #[arg(long, global = true, value_name = "PATH", env = "UFPS_FFPROBE")]
    pub ffprobe: Option<PathBuf>,

    /// Python interpreter used to run the interpolation scripts
    #[arg(long, global = true, value_name = "PATH", env = "UFPS_PYTHON")]
    pub python: Option<PathBuf>,

    /// Root directory of the RIFE installation (default: ~/.ufps/RIFE)
    #[arg(long, global = true, value_name = "DIR", env = "UFPS_RIFE_DIR")]
    pub rife_dir: Option<PathBuf>,

    /// Directory holding the RIFE model weights (default: ~/.ufps/models)
    #[arg(long, global = true, value_name = "DIR", env = "UFPS_MODELS_DIR")]
    pub models_dir: Option<PathBuf>,

    /// Base directory for temporary working directories (default: system temp)
    #[arg(long, global = true, value_name = "DIR")]
    pub temp_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Shows the properties of a video
    Info(InfoArgs),
    /// Lists the frame rates a video can be upsampled to
    Options(OptionsArgs),
    /// Lists the video files in a directory
    List(ListArgs),
    /// Upsamples a video to a higher frame rate
    Run(RunArgs),
}

#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Video file to inspect
    #[arg(value_name = "VIDEO")]
    pub video: PathBuf,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct OptionsArgs {
    /// Video file to inspect
    #[arg(value_name = "VIDEO")]
    pub video: PathBuf,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Directory to search (non-recursive)
    #[arg(value_name = "DIR", default_value = ".")]
    pub dir: PathBuf,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Video file to upsample
    #[arg(value_name = "VIDEO")]
    pub video: PathBuf,

    /// Target frame rate; must match one of the available options within 1 fps
    #[arg(long, value_name = "FPS", conflicts_with = "multiplier")]
    pub fps: Option<f64>,

    /// Interpolation multiplier: 2, 4 or 8
    #[arg(short, long, value_name = "N", value_parser = parse_multiplier)]
    pub multiplier: Option<Multiplier>,

    /// Quality preset for the final encode
    #[arg(short, long, value_enum, value_name = "PRESET", conflicts_with = "crf")]
    pub quality: Option<QualityArg>,

    /// Explicit constant-quality value (0-51, lower is better)
    #[arg(long, value_name = "CRF", value_parser = clap::value_parser!(u8).range(0..=51))]
    pub crf: Option<u8>,

    /// Output file (default: <stem>_<fps>fps.<ext> next to the input)
    #[arg(short, long, value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// Kill an interpolation attempt after this many seconds
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,
}

fn parse_multiplier(s: &str) -> Result<Multiplier, String> {
    let factor: u32 = s
        .trim()
        .parse()
        .map_err(|_| format!("'{s}' is not a whole number"))?;
    Multiplier::try_from(factor)
}

impl RunArgs {
    /// Constant-quality value: explicit value, else preset, else default preset.
    pub fn crf(&self) -> u8 {
        self.crf
            .unwrap_or_else(|| QualityPreset::from(self.quality.unwrap_or_default()).crf())
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QualityArg {
    /// CRF 15, largest file
    Maximum,
    /// CRF 18, recommended
    #[default]
    High,
    /// CRF 23, smaller file
    Balanced,
    /// CRF 28, smallest file
    Compressed,
}

impl From<QualityArg> for QualityPreset {
    fn from(arg: QualityArg) -> Self {
        match arg {
            QualityArg::Maximum => QualityPreset::Maximum,
            QualityArg::High => QualityPreset::High,
            QualityArg::Balanced => QualityPreset::Balanced,
            QualityArg::Compressed => QualityPreset::Compressed,
        }
    }
}
