//! Boot sequence pieces: power gating, persisted-state reconciliation,
//! clock bootstrap, and schedule alignment.
//!
//! Everything here is generic over the platform traits so the whole boot
//! path runs against mocks on the host.

use embassy_time::{with_timeout, Duration, Instant, Timer};

use persist::{checksum16, KnownTracks, PersistManager, PlaybackPosition};
use platform::{
    CalendarDateTime, DigitalIn, LineConsole, NonvolatileStore, Storage, TimeSource,
};
use schedule::align_to_week_seconds;

use crate::config;
use crate::fmt::{info, warning};

/// Poll period for the boot power-sense gate.
const POWER_POLL_MS: u64 = 50;

/// Block until the power-sense line reads high. The radio's dial switch
/// cuts this line, so boot pauses here until the set is switched on.
pub async fn wait_power_on<L: DigitalIn>(sense: &mut L) {
    while sense.is_low() {
        Timer::after_millis(POWER_POLL_MS).await;
    }
}

/// Outcome of the clock bootstrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockStatus {
    /// The oscillator was running and the time can be trusted.
    Valid,
    /// An operator just set the time over the console.
    JustSet,
    /// No trustworthy time; schedule alignment must be skipped.
    Invalid,
}

impl ClockStatus {
    /// Whether the current reading can drive schedule alignment.
    pub fn is_trusted(self) -> bool {
        matches!(self, ClockStatus::Valid | ClockStatus::JustSet)
    }
}

/// Parse the operator command `SET YYYY-MM-DD HH:MM[:SS]`.
///
/// Accepted variations: `/` for `-` in the date, `T` between date and
/// time, an optional `=` after `SET`, and omitted seconds.
pub fn parse_set_command(line: &str) -> Option<CalendarDateTime> {
    let rest = line.trim().strip_prefix("SET")?;
    let rest = rest.strip_prefix('=').unwrap_or(rest).trim_start();

    let (date, time) = rest.split_once(|c: char| c == ' ' || c == 'T')?;
    let mut parts = date.split(|c: char| c == '-' || c == '/');
    let year: u16 = parts.next()?.trim().parse().ok()?;
    let month: u8 = parts.next()?.trim().parse().ok()?;
    let day: u8 = parts.next()?.trim().parse().ok()?;
    if parts.next().is_some() {
        return None;
    }

    let mut parts = time.trim().split(':');
    let hour: u8 = parts.next()?.trim().parse().ok()?;
    let minute: u8 = parts.next()?.trim().parse().ok()?;
    let second: u8 = match parts.next() {
        Some(s) => s.trim().parse().ok()?,
        None => 0,
    };
    if parts.next().is_some() {
        return None;
    }

    let dt = CalendarDateTime {
        year,
        month,
        day,
        hour,
        minute,
        second,
    };
    let in_range = (2000..=2099).contains(&year)
        && (1..=12).contains(&month)
        && (1..=31).contains(&day)
        && hour < 24
        && minute < 60
        && second < 60;
    in_range.then_some(dt)
}

/// Establish a trustworthy clock at boot.
///
/// When the oscillator has stopped, or the operator forced the console by
/// holding the button, a bounded window accepts `SET ...` lines; the first
/// one that parses is written to the time source.
pub async fn establish_clock<T, C>(
    rtc: &mut T,
    console: &mut C,
    force_console: bool,
    window: Duration,
) -> ClockStatus
where
    T: TimeSource,
    C: LineConsole,
{
    let stopped = match rtc.oscillator_stopped().await {
        Ok(stopped) => stopped,
        Err(_) => {
            warning!("time source unreachable, running without a clock");
            return ClockStatus::Invalid;
        }
    };
    if !stopped && !force_console {
        return ClockStatus::Valid;
    }

    info!("clock bootstrap window open");
    let deadline = Instant::now() + window;
    let mut buf = [0u8; 64];
    loop {
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        let Ok(read) = with_timeout(deadline - now, console.read_line(&mut buf)).await else {
            break; // window elapsed
        };
        let Ok(n) = read else {
            break; // console fault, give up on the window
        };
        let Ok(line) = core::str::from_utf8(&buf[..n]) else {
            continue;
        };
        match parse_set_command(line) {
            Some(dt) => {
                if rtc.set(&dt).await.is_ok() {
                    info!("clock set by operator");
                    return ClockStatus::JustSet;
                }
                warning!("time source rejected the SET command");
                break;
            }
            None => warning!("unparseable console line ignored"),
        }
    }
    if stopped {
        ClockStatus::Invalid
    } else {
        ClockStatus::Valid
    }
}

/// State assembled from the two persistence tiers.
#[derive(Debug)]
pub struct LoadedState {
    /// Reconciled playback position.
    pub position: PlaybackPosition,
    /// Known-track bounds (primary tier only; the secondary record does not
    /// carry them).
    pub known: KnownTracks,
}

/// Load and reconcile persisted state.
///
/// The primary file wins when it parses; the secondary record's position
/// is the fallback. Secondary flag bits are adopted into the manager
/// either way.
pub async fn reconcile_state<S, E>(
    manager: &mut PersistManager,
    storage: &mut S,
    eeprom: Option<&mut E>,
) -> LoadedState
where
    S: Storage,
    E: NonvolatileStore,
{
    let secondary = match eeprom {
        Some(eeprom) => manager.load_secondary(eeprom).await,
        None => None,
    };
    if let Some(record) = &secondary {
        manager.flags = record.flags;
    }

    if let Some((position, known)) = manager.load_primary(storage).await {
        return LoadedState { position, known };
    }
    if let Some(record) = secondary {
        info!("primary state missing, restored from EEPROM record");
        return LoadedState {
            position: PlaybackPosition::new(record.album, record.track),
            known: KnownTracks::default(),
        };
    }
    info!("no persisted state, starting from album 1 track 1");
    LoadedState {
        position: PlaybackPosition::default(),
        known: KnownTracks::default(),
    }
}

/// Read the schedule file into `buf`.
///
/// Returns the text plus the fingerprint stored alongside secondary saves:
/// an additive checksum of the raw bytes and the file's mtime.
pub async fn load_schedule<'b, S: Storage>(
    storage: &mut S,
    buf: &'b mut [u8],
) -> Option<(&'b str, u16, u32)> {
    let n = storage.read_file(config::SCHEDULE_PATH, buf).await.ok()?;
    let checksum = checksum16(&buf[..n]);
    let mtime = storage.modified_unix(config::SCHEDULE_PATH).await.unwrap_or(0);
    let text = core::str::from_utf8(&buf[..n]).ok()?;
    Some((text, checksum, mtime))
}

/// Align the playback position to the weekly schedule.
///
/// The alignment also seeds the known-track bounds from every schedule
/// entry; learned bounds from persistence are merged on top so alignment
/// never forgets a confirmed track.
pub fn align_position(
    text: &str,
    week_seconds: u32,
    loaded: &LoadedState,
) -> Option<LoadedState> {
    let alignment = align_to_week_seconds(text, week_seconds)?;
    let mut known = KnownTracks::from_pairs(&alignment.maxima);
    for (album, bound) in loaded.known.iter() {
        known.learn(album, bound);
    }
    Some(LoadedState {
        position: PlaybackPosition::new(alignment.folder, alignment.track),
        known,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use persist::{SecondaryRecord, FLAG_TIME_SOURCE_SET};
    use platform::mocks::{MockConsole, MockEeprom, MockRtc, MockStorage};

    fn dt(year: u16, month: u8, day: u8, h: u8, m: u8, s: u8) -> CalendarDateTime {
        CalendarDateTime {
            year,
            month,
            day,
            hour: h,
            minute: m,
            second: s,
        }
    }

    #[test]
    fn set_command_variants() {
        let expect = dt(2024, 3, 9, 14, 5, 30);
        assert_eq!(parse_set_command("SET 2024-03-09 14:05:30"), Some(expect));
        assert_eq!(parse_set_command("SET 2024/03/09 14:05:30"), Some(expect));
        assert_eq!(parse_set_command("SET 2024-03-09T14:05:30"), Some(expect));
        assert_eq!(parse_set_command("SET=2024-03-09 14:05:30"), Some(expect));
        assert_eq!(
            parse_set_command("  SET 2024-03-09 14:05  "),
            Some(dt(2024, 3, 9, 14, 5, 0))
        );
    }

    #[test]
    fn set_command_rejects_garbage() {
        assert_eq!(parse_set_command("GET 2024-03-09 14:05:30"), None);
        assert_eq!(parse_set_command("SET 2024-03 14:05:30"), None);
        assert_eq!(parse_set_command("SET 2024-13-09 14:05:30"), None);
        assert_eq!(parse_set_command("SET 2024-03-09 24:05:30"), None);
        assert_eq!(parse_set_command("SET 1999-03-09 14:05:30"), None);
        assert_eq!(parse_set_command("SET 2024-03-09"), None);
        assert_eq!(parse_set_command(""), None);
    }

    #[tokio::test]
    async fn running_clock_skips_the_console() {
        let mut rtc = MockRtc::new(dt(2024, 1, 1, 0, 0, 0));
        let mut console = MockConsole::with_line("SET 2030-01-01 00:00:00");
        let status =
            establish_clock(&mut rtc, &mut console, false, Duration::from_millis(200)).await;
        assert_eq!(status, ClockStatus::Valid);
        assert_eq!(rtc.set_calls(), 0);
    }

    #[tokio::test]
    async fn stopped_clock_accepts_operator_time() {
        let mut rtc = MockRtc::stopped(dt(2000, 1, 1, 0, 0, 0));
        let mut console = MockConsole::with_line("SET 2024-06-03 07:30:00");
        let status =
            establish_clock(&mut rtc, &mut console, false, Duration::from_millis(500)).await;
        assert_eq!(status, ClockStatus::JustSet);
        assert_eq!(rtc.set_calls(), 1);
    }

    #[tokio::test]
    async fn stopped_clock_with_no_input_is_invalid() {
        let mut rtc = MockRtc::stopped(dt(2000, 1, 1, 0, 0, 0));
        let mut console = MockConsole::silent();
        let status =
            establish_clock(&mut rtc, &mut console, false, Duration::from_millis(100)).await;
        assert_eq!(status, ClockStatus::Invalid);
    }

    #[tokio::test]
    async fn forced_console_without_input_stays_valid() {
        let mut rtc = MockRtc::new(dt(2024, 1, 1, 0, 0, 0));
        let mut console = MockConsole::silent();
        let status =
            establish_clock(&mut rtc, &mut console, true, Duration::from_millis(100)).await;
        assert_eq!(status, ClockStatus::Valid);
    }

    #[tokio::test]
    async fn primary_wins_but_secondary_flags_are_adopted() {
        let mut manager = PersistManager::new(0, 0);
        let mut storage = MockStorage::new();
        storage.insert("album_state.txt", b"5,12;tracks=5:12");

        let mut eeprom = MockEeprom::new();
        let record = SecondaryRecord {
            flags: FLAG_TIME_SOURCE_SET,
            album: 2,
            track: 3,
            schedule_checksum: 0,
            schedule_mtime: 0,
            week_seconds: 0,
        };
        eeprom_write(&mut eeprom, &record).await;

        let loaded = reconcile_state(&mut manager, &mut storage, Some(&mut eeprom)).await;
        assert_eq!(loaded.position, PlaybackPosition::new(5, 12));
        assert_eq!(loaded.known.bound(5), 12);
        assert_eq!(manager.flags & FLAG_TIME_SOURCE_SET, FLAG_TIME_SOURCE_SET);
    }

    #[tokio::test]
    async fn secondary_position_used_when_primary_missing() {
        let mut manager = PersistManager::new(0, 0);
        let mut storage = MockStorage::new();
        let mut eeprom = MockEeprom::new();
        let record = SecondaryRecord {
            flags: 0,
            album: 7,
            track: 9,
            schedule_checksum: 0,
            schedule_mtime: 0,
            week_seconds: 0,
        };
        eeprom_write(&mut eeprom, &record).await;

        let loaded = reconcile_state(&mut manager, &mut storage, Some(&mut eeprom)).await;
        assert_eq!(loaded.position, PlaybackPosition::new(7, 9));
        assert!(loaded.known.is_empty());
    }

    #[tokio::test]
    async fn absent_eeprom_defaults_cleanly() {
        let mut manager = PersistManager::new(0, 0);
        let mut storage = MockStorage::new();
        let loaded =
            reconcile_state::<_, MockEeprom>(&mut manager, &mut storage, None).await;
        assert_eq!(loaded.position, PlaybackPosition::default());
    }

    #[tokio::test]
    async fn schedule_fingerprint_matches_contents() {
        let mut storage = MockStorage::new();
        storage.insert("schedule.txt", b"1,1,30:00\n");
        storage.set_mtime(1_700_000_000);
        let mut buf = [0u8; 256];
        let (text, checksum, mtime) = load_schedule(&mut storage, &mut buf).await.unwrap();
        assert_eq!(text, "1,1,30:00\n");
        assert_eq!(checksum, checksum16(b"1,1,30:00\n"));
        assert_eq!(mtime, 1_700_000_000);
    }

    #[test]
    fn alignment_merges_learned_bounds() {
        let text = "1,1,1:00:00\n1,2,1:00:00\n2,1,1:00:00\n";
        let loaded = LoadedState {
            position: PlaybackPosition::new(1, 1),
            known: KnownTracks::from_pairs(&[(2, 8)]),
        };
        // 90 minutes into the week lands on entry 1,2.
        let aligned = align_position(text, 5400, &loaded).unwrap();
        assert_eq!(aligned.position, PlaybackPosition::new(1, 2));
        assert_eq!(aligned.known.bound(1), 2);
        // The learned bound for album 2 survives the re-seed.
        assert_eq!(aligned.known.bound(2), 8);
    }

    #[test]
    fn alignment_fails_on_empty_schedule() {
        let loaded = LoadedState {
            position: PlaybackPosition::new(4, 4),
            known: KnownTracks::default(),
        };
        assert!(align_position("# nothing\n", 100, &loaded).is_none());
    }

    async fn eeprom_write(eeprom: &mut MockEeprom, record: &SecondaryRecord) {
        use platform::NonvolatileStore;
        eeprom
            .write(persist::SECONDARY_STATE_ADDR, &record.encode())
            .await
            .unwrap();
    }
}
