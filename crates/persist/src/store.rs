//! Dual-tier persistence manager.
//!
//! The primary store is overwritten on every state change. The secondary
//! store is written through a wall-clock rate limiter to bound EEPROM wear;
//! a save request inside the minimum interval is a silent no-op and must be
//! assumed not to have persisted.

use embassy_time::{Duration, Instant};
use platform::{NonvolatileStore, Storage};

use crate::position::{KnownTracks, PlaybackPosition};
use crate::primary;
use crate::record::SecondaryRecord;

/// Path of the primary state file.
pub const PRIMARY_STATE_PATH: &str = "album_state.txt";
/// EEPROM byte address of the secondary record.
pub const SECONDARY_STATE_ADDR: u16 = 0x0000;
/// Minimum interval between secondary-store writes.
pub const SECONDARY_SAVE_MIN_INTERVAL: Duration = Duration::from_secs(60);

/// Dual-tier persistence manager.
///
/// Owns the write-rate limiter and the schedule fingerprint captured at
/// boot; the stores themselves are borrowed per call so hardware and mocks
/// interchange freely.
pub struct PersistManager {
    last_secondary_save: Option<Instant>,
    /// Current flag bits, adopted from the secondary store at boot.
    pub flags: u8,
    schedule_checksum: u16,
    schedule_mtime: u32,
}

impl PersistManager {
    /// Create a manager carrying the schedule fingerprint for secondary
    /// saves.
    #[must_use]
    pub fn new(schedule_checksum: u16, schedule_mtime: u32) -> Self {
        Self {
            last_secondary_save: None,
            flags: 0,
            schedule_checksum,
            schedule_mtime,
        }
    }

    /// Load the primary record. `None` = missing/unparseable, use defaults.
    pub async fn load_primary<S: Storage>(
        &self,
        storage: &mut S,
    ) -> Option<(PlaybackPosition, KnownTracks)> {
        let mut buf = [0u8; 1024];
        let n = storage.read_file(PRIMARY_STATE_PATH, &mut buf).await.ok()?;
        let raw = core::str::from_utf8(&buf[..n]).ok()?;
        primary::decode(raw)
    }

    /// Overwrite the primary record with the current state.
    pub async fn save_primary<S: Storage>(
        &self,
        storage: &mut S,
        position: PlaybackPosition,
        known: &KnownTracks,
    ) -> Result<(), S::Error> {
        let encoded = primary::encode(position, known);
        storage.write_file(PRIMARY_STATE_PATH, encoded.as_bytes()).await
    }

    /// Load the secondary record; corruption or absence reads as `None`.
    pub async fn load_secondary<E: NonvolatileStore>(
        &self,
        eeprom: &mut E,
    ) -> Option<SecondaryRecord> {
        let mut buf = [0u8; SecondaryRecord::SIZE];
        eeprom.read(SECONDARY_STATE_ADDR, &mut buf).await.ok()?;
        SecondaryRecord::decode(&buf)
    }

    /// Save the secondary record, subject to the rate limiter.
    ///
    /// Returns `true` only when bytes were actually written; `false` covers
    /// both the silent rate-limited no-op and a store write failure (both
    /// non-fatal by policy).
    pub async fn save_secondary<E: NonvolatileStore>(
        &mut self,
        eeprom: &mut E,
        position: PlaybackPosition,
        week_seconds: u32,
    ) -> bool {
        let now = Instant::now();
        if let Some(last) = self.last_secondary_save {
            if now - last < SECONDARY_SAVE_MIN_INTERVAL {
                return false;
            }
        }
        let record = SecondaryRecord {
            flags: self.flags,
            album: position.album,
            track: position.track,
            schedule_checksum: self.schedule_checksum,
            schedule_mtime: self.schedule_mtime,
            week_seconds,
        };
        if eeprom
            .write(SECONDARY_STATE_ADDR, &record.encode())
            .await
            .is_err()
        {
            return false;
        }
        self.last_secondary_save = Some(now);
        true
    }
}
