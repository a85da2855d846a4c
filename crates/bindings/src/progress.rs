//! Resolution progress of a binding

use serde::Serialize;
use std::fmt;

/// How far resolution has got for one binding.
///
/// ```text
/// INIT -> NOENTRY -> SPOTTED -> FOUND | MISSING
///                 \-> FOUND
/// ```
///
/// Scans may also move a binding straight out of `INIT` when they report a
/// path nobody has asked about yet. Nothing ever returns to `INIT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Progress {
    /// Never looked at.
    Init,
    /// Scans ran but never reported the path.
    NoEntry,
    /// A scan reported the path without a time; an individual stat is due.
    Spotted,
    /// The path was reported but its time could not be read.
    Missing,
    /// The time is known.
    Found,
}

impl Progress {
    /// Upper-case name used in trace output.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Init => "INIT",
            Self::NoEntry => "NOENTRY",
            Self::Spotted => "SPOTTED",
            Self::Missing => "MISSING",
            Self::Found => "FOUND",
        }
    }

    /// True for states that resolution will not try to improve on.
    #[must_use]
    pub const fn is_settled(self) -> bool {
        matches!(self, Self::NoEntry | Self::Missing | Self::Found)
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
