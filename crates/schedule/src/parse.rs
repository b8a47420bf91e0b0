//! Schedule line parsing.
//!
//! Malformed lines are skipped, never fatal: the schedule is authored by an
//! offline tool, but hand edits happen and one bad line must not take the
//! radio off the air.

/// Highest folder number the decoder supports (folders 01..=99).
pub const MAX_FOLDER: u8 = 99;

/// One schedule entry: play `track` from `folder` for `duration_secs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleEntry {
    /// Folder number 1..=99.
    pub folder: u8,
    /// Track number 1..=255.
    pub track: u8,
    /// Entry duration in seconds, always > 0.
    pub duration_secs: u32,
}

/// Parse a duration as `SS`, `MM:SS` or `HH:MM:SS`.
pub fn parse_duration(value: &str) -> Option<u32> {
    let value = value.trim();
    if value.contains(':') {
        let mut parts = [0u32; 3];
        let mut count = 0usize;
        for bit in value.split(':') {
            if count == 3 {
                return None;
            }
            parts[count] = bit.trim().parse().ok()?;
            count += 1;
        }
        match count {
            2 => Some(parts[0] * 60 + parts[1]),
            3 => Some(parts[0] * 3_600 + parts[1] * 60 + parts[2]),
            _ => None,
        }
    } else {
        value.parse().ok()
    }
}

/// Parse one schedule line; `None` means skip (blank, comment or malformed).
///
/// Entries with non-positive duration, zero folder/track, or a folder above
/// [`MAX_FOLDER`] are discarded.
pub fn parse_line(line: &str) -> Option<ScheduleEntry> {
    let raw = line.trim();
    if raw.is_empty() || raw.starts_with('#') {
        return None;
    }
    let raw = raw.split('#').next().unwrap_or("").trim();
    if raw.is_empty() {
        return None;
    }

    let mut parts = raw.split(',');
    let folder: u8 = parts.next()?.trim().parse().ok()?;
    let track: u8 = parts.next()?.trim().parse().ok()?;
    let duration_secs = parse_duration(parts.next()?)?;

    if duration_secs == 0 || folder == 0 || track == 0 || folder > MAX_FOLDER {
        return None;
    }
    Some(ScheduleEntry {
        folder,
        track,
        duration_secs,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn duration_plain_seconds() {
        assert_eq!(parse_duration("90"), Some(90));
        assert_eq!(parse_duration(" 5 "), Some(5));
    }

    #[test]
    fn duration_minutes_seconds() {
        assert_eq!(parse_duration("29:30"), Some(29 * 60 + 30));
    }

    #[test]
    fn duration_hours_minutes_seconds() {
        assert_eq!(parse_duration("1:02:03"), Some(3_600 + 2 * 60 + 3));
    }

    #[test]
    fn duration_rejects_garbage() {
        assert_eq!(parse_duration("abc"), None);
        assert_eq!(parse_duration("1:2:3:4"), None);
        assert_eq!(parse_duration(""), None);
    }

    #[test]
    fn line_basic_entry() {
        assert_eq!(
            parse_line("3,7,29:30"),
            Some(ScheduleEntry {
                folder: 3,
                track: 7,
                duration_secs: 1770
            })
        );
    }

    #[test]
    fn line_trailing_comment_stripped() {
        assert_eq!(
            parse_line("1,1,60 # The Shadow ep.1"),
            Some(ScheduleEntry {
                folder: 1,
                track: 1,
                duration_secs: 60
            })
        );
    }

    #[test]
    fn line_blank_and_comment_skipped() {
        assert_eq!(parse_line(""), None);
        assert_eq!(parse_line("   "), None);
        assert_eq!(parse_line("# Monday block"), None);
    }

    #[test]
    fn line_out_of_range_folder_skipped() {
        assert_eq!(parse_line("100,1,60"), None);
        assert_eq!(parse_line("0,1,60"), None);
    }

    #[test]
    fn line_zero_duration_skipped() {
        assert_eq!(parse_line("1,1,0"), None);
    }

    #[test]
    fn line_malformed_numbers_skipped() {
        assert_eq!(parse_line("x,1,60"), None);
        assert_eq!(parse_line("1,y,60"), None);
        assert_eq!(parse_line("1,1"), None);
    }
}
