//! Primary state record — one line of text.
//!
//! Format: `album,track;tracks=a1:c1,a2:c2,...` with the known-track pairs
//! sorted by album. Missing or unparseable content yields `None` and the
//! caller starts fresh; a half-written file never brings the radio down.

use core::fmt::Write as _;

use crate::position::{KnownTracks, PlaybackPosition};

/// Worst case: "99,255;tracks=" + 99 × "99:255," ≈ 707 bytes.
pub type PrimaryBuf = heapless::String<768>;

/// Encode the position and known-track table into the one-line record.
#[must_use]
pub fn encode(position: PlaybackPosition, known: &KnownTracks) -> PrimaryBuf {
    let mut out = PrimaryBuf::new();
    // Capacity is sized for the worst case; write cannot fail.
    let _ = write!(out, "{},{};tracks=", position.album, position.track);
    let mut first = true;
    for (album, bound) in known.iter() {
        if !first {
            let _ = out.push(',');
        }
        let _ = write!(out, "{album}:{bound}");
        first = false;
    }
    out
}

/// Decode a primary record. `None` means "start fresh with defaults".
pub fn decode(raw: &str) -> Option<(PlaybackPosition, KnownTracks)> {
    let raw = raw.trim();
    let mut sections = raw.split(';');

    let mut head = sections.next()?.split(',');
    let album: u8 = head.next()?.trim().parse().ok()?;
    let track: u8 = head.next()?.trim().parse().ok()?;
    if album == 0 || track == 0 {
        return None;
    }

    let mut known = KnownTracks::new();
    if let Some(tracks) = sections.next().and_then(|s| s.strip_prefix("tracks=")) {
        for pair in tracks.split(',').filter(|p| !p.is_empty()) {
            let (a, c) = pair.split_once(':')?;
            let album: u8 = a.trim().parse().ok()?;
            let bound: u8 = c.trim().parse().ok()?;
            let _ = known.learn(album, bound);
        }
    }
    Some((PlaybackPosition::new(album, track), known))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_preserves_triple() {
        let known = KnownTracks::from_pairs([(5, 12)]);
        let encoded = encode(PlaybackPosition::new(5, 12), &known);
        assert_eq!(encoded.as_str(), "5,12;tracks=5:12");

        let (position, reloaded) = decode(&encoded).unwrap();
        assert_eq!(position, PlaybackPosition::new(5, 12));
        assert_eq!(reloaded, known);
    }

    #[test]
    fn pairs_sorted_by_album() {
        let known = KnownTracks::from_pairs([(9, 1), (2, 4)]);
        let encoded = encode(PlaybackPosition::new(1, 1), &known);
        assert_eq!(encoded.as_str(), "1,1;tracks=2:4,9:1");
    }

    #[test]
    fn empty_known_table() {
        let encoded = encode(PlaybackPosition::default(), &KnownTracks::new());
        assert_eq!(encoded.as_str(), "1,1;tracks=");
        let (position, known) = decode(&encoded).unwrap();
        assert_eq!(position, PlaybackPosition::default());
        assert!(known.is_empty());
    }

    #[test]
    fn garbage_yields_none() {
        assert!(decode("").is_none());
        assert!(decode("not a record").is_none());
        assert!(decode("5;tracks=").is_none());
        assert!(decode("0,1;tracks=").is_none());
        assert!(decode("5,12;tracks=5").is_none());
    }

    #[test]
    fn missing_tracks_section_is_tolerated() {
        let (position, known) = decode("7,3").unwrap();
        assert_eq!(position, PlaybackPosition::new(7, 3));
        assert!(known.is_empty());
    }
}
