//! Secondary (EEPROM) state record — fixed 20-byte binary layout.
//!
//! All multi-byte integers are little-endian.
//!
//! ```text
//! [0..4]   magic              b"OTR1"
//! [4]      version            u8 = 1
//! [5]      flags              u8  (bit 0: time source has been set)
//! [6]      album              u8
//! [7]      track              u8
//! [8..10]  schedule_checksum  u16 le  (checksum16 of the schedule file)
//! [10..14] schedule_mtime     u32 le  (Unix seconds, 0 if unknown)
//! [14..18] week_seconds       u32 le  (seconds into week at save time)
//! [18..20] crc                u16 le  (checksum16 of bytes [0..18])
//! ```
//!
//! Validation is all-or-nothing: wrong magic, version, length or crc all
//! read as "no data" — the EEPROM may be blank, half-written or from an
//! older firmware, and none of that is an error.

/// 16-bit additive checksum: the sum of all byte values mod 65536.
///
/// Depends only on the multiset of byte values, not their order.
#[must_use]
pub fn checksum16(data: &[u8]) -> u16 {
    data.iter()
        .fold(0u16, |acc, &b| acc.wrapping_add(u16::from(b)))
}

/// Flag bit: the time source has been set at least once.
pub const FLAG_TIME_SOURCE_SET: u8 = 0x01;

/// Decoded secondary record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecondaryRecord {
    /// Flag bits (see [`FLAG_TIME_SOURCE_SET`]).
    pub flags: u8,
    /// Album at save time.
    pub album: u8,
    /// Track at save time.
    pub track: u8,
    /// checksum16 of the schedule file at save time.
    pub schedule_checksum: u16,
    /// Schedule file mtime (Unix seconds) at save time.
    pub schedule_mtime: u32,
    /// Seconds into the week at save time.
    pub week_seconds: u32,
}

impl SecondaryRecord {
    /// Record size in bytes.
    pub const SIZE: usize = 20;
    /// Magic bytes.
    pub const MAGIC: &'static [u8; 4] = b"OTR1";
    /// Layout version.
    pub const VERSION: u8 = 1;

    /// Encode the record into its 20-byte wire form, crc included.
    #[must_use]
    pub fn encode(&self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        buf[0..4].copy_from_slice(Self::MAGIC);
        buf[4] = Self::VERSION;
        buf[5] = self.flags;
        buf[6] = self.album;
        buf[7] = self.track;
        buf[8..10].copy_from_slice(&self.schedule_checksum.to_le_bytes());
        buf[10..14].copy_from_slice(&self.schedule_mtime.to_le_bytes());
        buf[14..18].copy_from_slice(&self.week_seconds.to_le_bytes());
        let crc = checksum16(&buf[..18]);
        buf[18..20].copy_from_slice(&crc.to_le_bytes());
        buf
    }

    /// Decode a record; `None` means "no usable data".
    #[must_use]
    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() != Self::SIZE {
            return None;
        }
        if &buf[0..4] != Self::MAGIC || buf[4] != Self::VERSION {
            return None;
        }
        let crc = u16::from_le_bytes([buf[18], buf[19]]);
        if checksum16(&buf[..18]) != crc {
            return None;
        }
        Some(Self {
            flags: buf[5],
            album: buf[6],
            track: buf[7],
            schedule_checksum: u16::from_le_bytes([buf[8], buf[9]]),
            schedule_mtime: u32::from_le_bytes([buf[10], buf[11], buf[12], buf[13]]),
            week_seconds: u32::from_le_bytes([buf[14], buf[15], buf[16], buf[17]]),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample() -> SecondaryRecord {
        SecondaryRecord {
            flags: FLAG_TIME_SOURCE_SET,
            album: 5,
            track: 12,
            schedule_checksum: 0xBEEF,
            schedule_mtime: 1_756_000_000,
            week_seconds: 432_000,
        }
    }

    #[test]
    fn record_size_is_20_bytes() {
        assert_eq!(SecondaryRecord::SIZE, 20);
        assert_eq!(sample().encode().len(), 20);
    }

    #[test]
    fn roundtrip() {
        let bytes = sample().encode();
        assert_eq!(SecondaryRecord::decode(&bytes).unwrap(), sample());
    }

    #[test]
    fn any_single_non_crc_byte_flip_reads_as_absent() {
        let bytes = sample().encode();
        for i in 0..18 {
            let mut corrupt = bytes;
            corrupt[i] ^= 0x01;
            assert!(
                SecondaryRecord::decode(&corrupt).is_none(),
                "byte {i} flip must invalidate the record"
            );
        }
    }

    #[test]
    fn wrong_length_reads_as_absent() {
        let bytes = sample().encode();
        assert!(SecondaryRecord::decode(&bytes[..19]).is_none());
    }

    #[test]
    fn wrong_magic_and_version_read_as_absent() {
        let mut bytes = sample().encode();
        bytes[0] = b'X';
        assert!(SecondaryRecord::decode(&bytes).is_none());

        let mut bytes = sample().encode();
        bytes[4] = 9;
        // version byte participates in the crc, so fix it up to isolate the check
        let crc = checksum16(&bytes[..18]);
        bytes[18..20].copy_from_slice(&crc.to_le_bytes());
        assert!(SecondaryRecord::decode(&bytes).is_none());
    }

    #[test]
    fn checksum16_is_order_independent() {
        let a = [1u8, 2, 3, 250, 250, 250];
        let b = [250u8, 3, 250, 2, 250, 1];
        assert_eq!(checksum16(&a), checksum16(&b));
        assert_ne!(checksum16(&a), checksum16(&[1u8, 2, 3]));
    }

    #[test]
    fn checksum16_wraps_mod_65536() {
        let data = [0xFFu8; 1024];
        assert_eq!(checksum16(&data), (1024u32 * 255 % 65536) as u16);
    }
}
