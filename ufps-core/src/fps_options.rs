//! Frame rate option solving.
//!
//! Given a source frame rate, works out which standard target rates can be
//! reached with a single interpolation pass and which multiplier each needs.
//! Pure computation, no I/O.

use serde::Serialize;
use std::fmt;

/// Standard target frame rates, ascending.
pub const STANDARD_FRAME_RATES: [u32; 13] = [24, 25, 30, 48, 50, 60, 90, 96, 100, 120, 144, 180, 240];

/// Highest frame rate an option may produce.
pub const MAX_TARGET_FPS: f64 = 240.0;

/// Distance below which an achievable rate counts as hitting a standard target.
pub const EXACT_TOLERANCE: f64 = 1.0;

/// Frame count factor of one interpolation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "u32")]
pub enum Multiplier {
    X2,
    X4,
    X8,
}

impl Multiplier {
    pub const ALL: [Multiplier; 3] = [Multiplier::X2, Multiplier::X4, Multiplier::X8];

    #[must_use]
    pub fn factor(self) -> u32 {
        match self {
            Multiplier::X2 => 2,
            Multiplier::X4 => 4,
            Multiplier::X8 => 8,
        }
    }

    /// Doubling exponent expected by the interpolation tool (`2^exp = factor`).
    #[must_use]
    pub fn exponent(self) -> u32 {
        self.factor().trailing_zeros()
    }

    /// Number of synthesized frames inserted between each pair of originals.
    #[must_use]
    pub fn inserted_frames(self) -> u32 {
        self.factor() - 1
    }

    /// Smallest multiplier whose product with the source rate covers `ratio`.
    #[must_use]
    pub fn covering(ratio: f64) -> Option<Multiplier> {
        Self::ALL.into_iter().find(|m| ratio <= f64::from(m.factor()))
    }
}

impl TryFrom<u32> for Multiplier {
    type Error = String;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            2 => Ok(Multiplier::X2),
            4 => Ok(Multiplier::X4),
            8 => Ok(Multiplier::X8),
            other => Err(format!("unsupported multiplier {other} (expected 2, 4 or 8)")),
        }
    }
}

impl From<Multiplier> for u32 {
    fn from(multiplier: Multiplier) -> Self {
        multiplier.factor()
    }
}

impl fmt::Display for Multiplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}×", self.factor())
    }
}

/// A reachable frame rate upgrade.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FpsOption {
    /// Standard rate this option hits, or the achievable rate itself when inexact.
    pub target_fps: f64,
    /// `current_fps × multiplier`.
    pub actual_fps: f64,
    pub multiplier: Multiplier,
    /// Whether `actual_fps` is within [`EXACT_TOLERANCE`] of a standard rate.
    pub exact: bool,
}

impl FpsOption {
    /// Human readable summary of what the interpolation pass does.
    #[must_use]
    pub fn describe(&self) -> String {
        let inserted = self.multiplier.inserted_frames();
        let noun = if inserted == 1 { "frame" } else { "frames" };
        let mut detail = format!("Adds {inserted} {noun} between each original");
        if let Some(note) = self.highlight() {
            detail.push_str(&format!(" ({note})"));
        }
        detail
    }

    /// Marker for the well known rates.
    #[must_use]
    pub fn highlight(&self) -> Option<&'static str> {
        match self.rounded_fps() {
            60 => Some("Smooth motion"),
            120 => Some("Gaming quality"),
            240 => Some("Slow motion"),
            _ => None,
        }
    }

    /// Whether this is the option offered by default.
    #[must_use]
    pub fn is_recommended(&self) -> bool {
        self.rounded_fps() == 60
    }

    /// Achievable rate rounded to the nearest integer, as shown to users.
    #[must_use]
    pub fn rounded_fps(&self) -> u32 {
        self.actual_fps.round() as u32
    }
}

/// Returns the achievable frame rate upgrades for `current_fps`, ascending by
/// achievable rate, without duplicate (actual, multiplier) pairs.
#[must_use]
pub fn solve(current_fps: f64) -> Vec<FpsOption> {
    if !current_fps.is_finite() || current_fps <= 0.0 {
        return Vec::new();
    }

    let mut options: Vec<FpsOption> = Vec::new();

    for target in STANDARD_FRAME_RATES.iter().map(|&t| f64::from(t)) {
        if target <= current_fps {
            continue;
        }

        let Some(multiplier) = Multiplier::covering(target / current_fps) else {
            continue;
        };

        let actual_fps = current_fps * f64::from(multiplier.factor());
        if actual_fps > MAX_TARGET_FPS {
            continue;
        }

        let exact = (actual_fps - target).abs() < EXACT_TOLERANCE;
        let candidate = FpsOption {
            target_fps: if exact { target } else { actual_fps },
            actual_fps,
            multiplier,
            exact,
        };

        match options
            .iter_mut()
            .find(|o| o.actual_fps == actual_fps && o.multiplier == multiplier)
        {
            // An exact hit on a later standard target upgrades the earlier inexact entry.
            Some(existing) if candidate.exact && !existing.exact => *existing = candidate,
            Some(_) => {}
            None => options.push(candidate),
        }
    }

    options.sort_by(|a, b| a.actual_fps.total_cmp(&b.actual_fps));
    options
}

/// Picks the option matching a requested rate, comparing against both the
/// standard target and the achievable rate.
#[must_use]
pub fn find_option_for_fps(options: &[FpsOption], fps: f64) -> Option<FpsOption> {
    options
        .iter()
        .find(|o| {
            (o.actual_fps - fps).abs() < EXACT_TOLERANCE || (o.target_fps - fps).abs() < EXACT_TOLERANCE
        })
        .copied()
}

/// The option offered by default: 60 fps when reachable, otherwise the lowest.
#[must_use]
pub fn recommended_option(options: &[FpsOption]) -> Option<FpsOption> {
    options
        .iter()
        .find(|o| o.is_recommended())
        .or_else(|| options.first())
        .copied()
}
