//! Weekly broadcast schedule — parsing and time alignment.
//!
//! The schedule file is plain text, one entry per line as
//! `folder,track,duration[#comment]`, in chronological order from Monday
//! 00:00:00. Aligning a week position to the table finds the entry whose
//! cumulative time range contains it, so the radio resumes "mid-broadcast"
//! after a power cycle.

#![cfg_attr(not(test), no_std)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::must_use_candidate)]

pub mod align;
pub mod parse;

pub use align::{align_to_week_seconds, scan, Alignment, ScanResult};
pub use parse::{parse_duration, parse_line, ScheduleEntry, MAX_FOLDER};
