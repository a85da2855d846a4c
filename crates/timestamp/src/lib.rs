//! File modification timestamps for bindstamp.
//!
//! A [`Timestamp`] is a `(seconds, nanoseconds)` pair relative to the Unix
//! epoch. Seconds may be negative for pre-epoch times; nanoseconds are always
//! in `0..1_000_000_000`.
//!
//! The value `(0, 0)` doubles as the "cleared" marker handed out for paths
//! that could not be timed. A real file stamped exactly at the epoch is
//! indistinguishable from an absent one; callers that care must ask the
//! resolver for the binding's progress instead of inspecting the value.
//!
//! # Example
//!
//! ```
//! use bindstamp_timestamp::Timestamp;
//!
//! let older = Timestamp::new(1_700_000_000, 5);
//! let newer = Timestamp::new(1_700_000_000, 6);
//! assert_eq!(Timestamp::latest(older, newer), newer);
//! assert!(Timestamp::default().is_empty());
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

const NANOS_PER_SEC: u32 = 1_000_000_000;

/// Seconds between 1601-01-01 (the FILETIME epoch) and 1970-01-01.
const SECS_BETWEEN_EPOCHS: i64 = 11_644_473_600;

/// FILETIME resolution is 100ns.
const FILETIME_TICKS_PER_SEC: u64 = 10_000_000;

/// A comparable `(seconds, nanoseconds)` modification time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Timestamp {
    secs: i64,
    nsecs: u32,
}

impl Timestamp {
    /// The cleared timestamp, `(0, 0)`.
    pub const EMPTY: Self = Self { secs: 0, nsecs: 0 };

    /// Creates a timestamp, carrying whole seconds out of `nsecs`.
    #[must_use]
    pub fn new(secs: i64, nsecs: u32) -> Self {
        Self {
            secs: secs.saturating_add(i64::from(nsecs / NANOS_PER_SEC)),
            nsecs: nsecs % NANOS_PER_SEC,
        }
    }

    /// Captures the current wall-clock time.
    #[must_use]
    pub fn now() -> Self {
        SystemTime::now().into()
    }

    /// Converts a Windows `FILETIME` value (100ns ticks since 1601-01-01).
    #[must_use]
    pub fn from_filetime(ticks: u64) -> Self {
        let whole = i64::try_from(ticks / FILETIME_TICKS_PER_SEC).unwrap_or(i64::MAX);
        // The remainder is below 10^7, so the scaled value stays below 10^9.
        let frac = u32::try_from(ticks % FILETIME_TICKS_PER_SEC).unwrap_or(0);
        Self::new(whole - SECS_BETWEEN_EPOCHS, frac * 100)
    }

    /// Whole seconds since the Unix epoch.
    #[must_use]
    pub const fn secs(&self) -> i64 {
        self.secs
    }

    /// Sub-second part, in nanoseconds.
    #[must_use]
    pub const fn nsecs(&self) -> u32 {
        self.nsecs
    }

    /// Resets both fields to zero.
    pub fn clear(&mut self) {
        *self = Self::EMPTY;
    }

    /// Returns true for the cleared `(0, 0)` value.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.secs == 0 && self.nsecs == 0
    }

    /// Orders by seconds, then nanoseconds.
    #[must_use]
    pub fn compare(&self, other: &Self) -> Ordering {
        self.secs
            .cmp(&other.secs)
            .then_with(|| self.nsecs.cmp(&other.nsecs))
    }

    /// Returns whichever operand is more recent.
    ///
    /// On an exact tie the right-hand operand wins. This matters when the
    /// result is used to pick "the most recent dependency": with equal
    /// times, the later argument is reported.
    #[must_use]
    pub fn latest(lhs: Self, rhs: Self) -> Self {
        if lhs.compare(&rhs) == Ordering::Greater {
            lhs
        } else {
            rhs
        }
    }
}

impl PartialOrd for Timestamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timestamp {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

impl From<SystemTime> for Timestamp {
    fn from(time: SystemTime) -> Self {
        match time.duration_since(UNIX_EPOCH) {
            Ok(after) => Self::new(
                i64::try_from(after.as_secs()).unwrap_or(i64::MAX),
                after.subsec_nanos(),
            ),
            Err(err) => {
                let before = err.duration();
                let secs = i64::try_from(before.as_secs()).unwrap_or(i64::MAX);
                match before.subsec_nanos() {
                    0 => Self::new(-secs, 0),
                    nanos => Self::new(-secs - 1, NANOS_PER_SEC - nanos),
                }
            }
        }
    }
}

/// Renders `YYYY-MM-DD HH:MM:SS.nnnnnnnnn +0000` in UTC.
///
/// Display only; never parse this back for comparisons.
impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match DateTime::<Utc>::from_timestamp(self.secs, 0) {
            Some(dt) => write!(
                f,
                "{}.{:09} +0000",
                dt.format("%Y-%m-%d %H:%M:%S"),
                self.nsecs
            ),
            None => write!(f, "{}.{:09}", self.secs, self.nsecs),
        }
    }
}
