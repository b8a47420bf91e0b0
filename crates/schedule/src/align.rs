//! Week-position to schedule-entry alignment.

use crate::parse::{parse_line, MAX_FOLDER};

/// Per-folder maximum track numbers seen while scanning, used as the initial
/// known-track baseline after alignment.
pub type FolderMaxima = heapless::Vec<(u8, u8), { MAX_FOLDER as usize }>;

/// Result of one scan pass over the schedule text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanResult {
    /// Entry whose cumulative range contains the target, if any.
    pub found: Option<(u8, u8)>,
    /// Highest track per folder across every valid entry (independent of
    /// whether it precedes the match).
    pub maxima: FolderMaxima,
    /// Total duration of all valid entries, in seconds.
    pub total_secs: u32,
}

/// A successful alignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alignment {
    /// Folder (album) of the matched entry.
    pub folder: u8,
    /// Track of the matched entry.
    pub track: u8,
    /// Known-track baseline from the whole table.
    pub maxima: FolderMaxima,
    /// Total schedule duration in seconds.
    pub total_secs: u32,
}

fn note_max(maxima: &mut FolderMaxima, folder: u8, track: u8) {
    for entry in maxima.iter_mut() {
        if entry.0 == folder {
            if track > entry.1 {
                entry.1 = track;
            }
            return;
        }
    }
    // Capacity equals the folder range, so this cannot fail.
    let _ = maxima.push((folder, track));
}

/// Scan the schedule text once, accumulating durations until the cumulative
/// range of an entry contains `target_secs`.
pub fn scan(text: &str, target_secs: u32) -> ScanResult {
    let mut found = None;
    let mut maxima = FolderMaxima::new();
    let mut total: u32 = 0;

    for line in text.lines() {
        let Some(entry) = parse_line(line) else {
            continue;
        };
        if found.is_none() && target_secs < total.saturating_add(entry.duration_secs) {
            found = Some((entry.folder, entry.track));
        }
        note_max(&mut maxima, entry.folder, entry.track);
        total = total.saturating_add(entry.duration_secs);
    }

    ScanResult {
        found,
        maxima,
        total_secs: total,
    }
}

/// Align a week position (seconds since Monday 00:00:00) to the schedule.
///
/// Positions beyond the table wrap modulo its total duration and are scanned
/// once more. Returns `None` when the table has no valid entries at all, in
/// which case the caller must keep whatever position it already had.
pub fn align_to_week_seconds(text: &str, target_secs: u32) -> Option<Alignment> {
    let first = scan(text, target_secs);
    if first.total_secs == 0 {
        return None;
    }
    let (folder, track) = match first.found {
        Some(hit) => hit,
        None => scan(text, target_secs % first.total_secs).found?,
    };
    Some(Alignment {
        folder,
        track,
        maxima: first.maxima,
        total_secs: first.total_secs,
    })
}
