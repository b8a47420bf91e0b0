//! Playback position and known-track bounds.

use core::borrow::Borrow;

/// Highest album (decoder folder) number.
pub const MAX_ALBUM: u8 = 99;

/// Current playback position: album 1..=99, track 1..=255.
///
/// Mutated only by the navigation state machine or schedule alignment;
/// construction clamps so neither field can be zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackPosition {
    /// Album (decoder folder) number.
    pub album: u8,
    /// Track number within the album.
    pub track: u8,
}

impl PlaybackPosition {
    /// Create a position, clamping zeroes up to 1 and the album to 99.
    #[must_use]
    pub fn new(album: u8, track: u8) -> Self {
        Self {
            album: album.clamp(1, MAX_ALBUM),
            track: track.max(1),
        }
    }
}

impl Default for PlaybackPosition {
    fn default() -> Self {
        Self { album: 1, track: 1 }
    }
}

/// Per-album highest track number ever confirmed playable.
///
/// Monotonically non-decreasing per album within a session: navigation never
/// lowers a bound, only confirmed playback raises one. Schedule alignment
/// re-baselines the whole table from the schedule's contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnownTracks {
    // Index = album number; index 0 unused.
    bounds: [u8; MAX_ALBUM as usize + 1],
}

impl KnownTracks {
    /// An empty table: every album unknown.
    #[must_use]
    pub fn new() -> Self {
        Self {
            bounds: [0; MAX_ALBUM as usize + 1],
        }
    }

    /// Build a table from (album, bound) pairs, ignoring out-of-range albums.
    ///
    /// Accepts both owned pairs and references, so a `heapless::Vec` of pairs
    /// can be passed by reference.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator,
        I::Item: core::borrow::Borrow<(u8, u8)>,
    {
        let mut table = Self::new();
        for pair in pairs {
            let (album, track) = *pair.borrow();
            let _ = table.learn(album, track);
        }
        table
    }

    /// The known bound for an album; 0 when nothing was ever confirmed.
    pub fn bound(&self, album: u8) -> u8 {
        if album == 0 || album > MAX_ALBUM {
            return 0;
        }
        self.bounds[usize::from(album)]
    }

    /// Record a confirmed play. Returns `true` when the bound was extended.
    pub fn learn(&mut self, album: u8, track: u8) -> bool {
        if album == 0 || album > MAX_ALBUM {
            return false;
        }
        let slot = &mut self.bounds[usize::from(album)];
        if track > *slot {
            *slot = track;
            true
        } else {
            false
        }
    }

    /// Iterate known (album, bound) pairs in ascending album order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, u8)> + '_ {
        self.bounds
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(_, &bound)| bound > 0)
            .map(|(album, &bound)| {
                #[allow(clippy::cast_possible_truncation)] // album <= 99
                {
                    (album as u8, bound)
                }
            })
    }

    /// Whether any album has a known bound.
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

impl Default for KnownTracks {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn position_clamps_zeroes() {
        let p = PlaybackPosition::new(0, 0);
        assert_eq!(p, PlaybackPosition { album: 1, track: 1 });
        assert_eq!(PlaybackPosition::new(200, 3).album, MAX_ALBUM);
    }

    #[test]
    fn bounds_are_monotonic_under_confirmed_plays() {
        let mut known = KnownTracks::new();
        let mut prev = 0;
        for track in [1u8, 3, 2, 7, 5, 7, 9] {
            let _ = known.learn(4, track);
            assert!(known.bound(4) >= prev, "bound decreased");
            assert!(known.bound(4) >= track.min(known.bound(4)));
            prev = known.bound(4);
        }
        assert_eq!(known.bound(4), 9);
    }

    #[test]
    fn learn_reports_extension() {
        let mut known = KnownTracks::new();
        assert!(known.learn(2, 5));
        assert!(!known.learn(2, 5));
        assert!(!known.learn(2, 3));
        assert!(known.learn(2, 6));
    }

    #[test]
    fn out_of_range_albums_ignored() {
        let mut known = KnownTracks::new();
        assert!(!known.learn(0, 5));
        assert!(!known.learn(100, 5));
        assert!(known.is_empty());
    }

    #[test]
    fn from_pairs_accepts_borrowed_items() {
        let pairs = [(3u8, 2u8), (7, 5)];
        let known = KnownTracks::from_pairs(&pairs);
        assert_eq!(known.bound(3), 2);
        assert_eq!(known.bound(7), 5);
    }

    #[test]
    fn iter_is_sorted_by_album() {
        let known = KnownTracks::from_pairs([(9, 2), (1, 4), (5, 1)]);
        let pairs: Vec<_> = known.iter().collect();
        assert_eq!(pairs, vec![(1, 4), (5, 1), (9, 2)]);
    }
}
