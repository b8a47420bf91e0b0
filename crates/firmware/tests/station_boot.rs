//! End-to-end boot path against mocks: clock, reconciliation, schedule
//! alignment, synchronized start, and the persistence that follows.

#![allow(clippy::unwrap_used)]

use embassy_time::{Duration, Timer};

use firmware::boot::{
    align_position, establish_clock, load_schedule, reconcile_state, ClockStatus,
};
use firmware::player::RadioPlayer;
use firmware::{config, PlayAttempt};
use persist::{PersistManager, PlaybackPosition, SecondaryRecord, SECONDARY_STATE_ADDR};
use platform::mocks::{
    MockConsole, MockDecoderPort, MockEeprom, MockLine, MockPwm, MockRtc, MockStorage,
};
use platform::{CalendarDateTime, NonvolatileStore, TimeSource};
use playback::{IntroEngine, WavAsset};

const SCHEDULE: &str = "\
1,1,1:00:00
1,2,1:00:00
2,1,2:00:00
";

fn tuesday_0930() -> CalendarDateTime {
    // 2024-01-02 is a Tuesday: 86400 + 9*3600 + 30*60 = 120600 s into the week.
    CalendarDateTime {
        year: 2024,
        month: 1,
        day: 2,
        hour: 9,
        minute: 30,
        second: 0,
    }
}

#[tokio::test]
async fn cold_boot_aligns_starts_and_persists() {
    let mut rtc = MockRtc::new(tuesday_0930());
    let mut console = MockConsole::silent();
    let clock = establish_clock(&mut rtc, &mut console, false, Duration::from_millis(50)).await;
    assert_eq!(clock, ClockStatus::Valid);

    let mut storage = MockStorage::new();
    storage.insert(config::SCHEDULE_PATH, SCHEDULE.as_bytes());
    storage.set_mtime(1_700_000_000);
    let mut buf = [0u8; 256];
    let (text, checksum, mtime) = load_schedule(&mut storage, &mut buf).await.unwrap();
    let mut manager = PersistManager::new(checksum, mtime);

    let mut eeprom = MockEeprom::new();
    let loaded = reconcile_state(&mut manager, &mut storage, Some(&mut eeprom)).await;
    assert_eq!(loaded.position, PlaybackPosition::default());

    // The table runs 14400 s; 120600 s wraps to 5400 s, inside entry 1/2.
    let dt = rtc.now().await.unwrap();
    let aligned = align_position(text, dt.seconds_into_week(), &loaded).unwrap();
    assert_eq!(aligned.position, PlaybackPosition::new(1, 2));
    assert_eq!(aligned.known.bound(1), 2);

    // Synchronized start with a 100 ms jingle and a decoder that asserts
    // busy right away.
    let samples = [150u8; 800];
    let asset = WavAsset {
        samples: &samples,
        sample_rate: 8000,
    };
    let engine = IntroEngine::new(&asset, config::FADE_OUT_MS);
    let mut player = RadioPlayer::new(
        MockDecoderPort::new(),
        MockLine::new(false),
        config::DECODER_VOLUME,
    );

    let ticker = async {
        let mut pwm = MockPwm::new();
        while !engine.is_finished() {
            engine.tick(&mut pwm);
            Timer::after_millis(1).await;
        }
    };
    let start = player.synchronized_start(&engine, aligned.position.album, aligned.position.track);
    let (_, confirmed) = tokio::join!(ticker, start);
    assert!(confirmed.unwrap());

    // First frames: RESET, volume 0, STOP, PLAY 1/2, then the ramp.
    let frames = player.link().port().frames();
    assert_eq!(frames[0][3], 0x3F);
    assert_eq!(frames[1][3], 0x06);
    assert_eq!(frames[1][6], 0);
    assert_eq!(frames[2][3], 0x16);
    assert_eq!(frames[3][3], 0x0F);
    assert_eq!(frames[3][5], 1);
    assert_eq!(frames[3][6], 2);
    // The ramp ends at the working volume.
    assert_eq!(player.link().state().volume, config::DECODER_VOLUME);

    // Persist the confirmed position to both tiers.
    manager
        .save_primary(&mut storage, aligned.position, &aligned.known)
        .await
        .unwrap();
    assert!(manager
        .save_secondary(&mut eeprom, aligned.position, dt.seconds_into_week())
        .await);

    let reloaded = manager.load_primary(&mut storage).await.unwrap();
    assert_eq!(reloaded.0, PlaybackPosition::new(1, 2));
    let record = manager.load_secondary(&mut eeprom).await.unwrap();
    assert_eq!(record.album, 1);
    assert_eq!(record.track, 2);
    assert_eq!(record.week_seconds, 120_600);
    assert_eq!(record.schedule_checksum, checksum);
}

#[tokio::test]
async fn corrupt_secondary_record_reads_as_absent() {
    let mut manager = PersistManager::new(0, 0);
    let mut storage = MockStorage::new();
    let mut eeprom = MockEeprom::new();

    let record = SecondaryRecord {
        flags: 0,
        album: 9,
        track: 4,
        schedule_checksum: 0xBEEF,
        schedule_mtime: 1,
        week_seconds: 2,
    };
    eeprom
        .write(SECONDARY_STATE_ADDR, &record.encode())
        .await
        .unwrap();
    eeprom.flip_byte(SECONDARY_STATE_ADDR + 6);

    let loaded = reconcile_state(&mut manager, &mut storage, Some(&mut eeprom)).await;
    assert_eq!(loaded.position, PlaybackPosition::default());
}

#[tokio::test]
async fn operator_clock_bootstrap_feeds_alignment() {
    let mut rtc = MockRtc::stopped(CalendarDateTime {
        year: 2000,
        month: 1,
        day: 1,
        hour: 0,
        minute: 0,
        second: 0,
    });
    let mut console = MockConsole::with_line("SET 2024-01-02 09:30:00");
    let clock = establish_clock(&mut rtc, &mut console, false, Duration::from_millis(500)).await;
    assert_eq!(clock, ClockStatus::JustSet);

    let dt = rtc.now().await.unwrap();
    assert_eq!(dt.seconds_into_week(), 120_600);
}

#[tokio::test]
async fn gave_up_play_still_moves_forward() {
    // A decoder that never asserts busy: navigation still lands somewhere
    // sane and the attempt reports unconfirmed.
    let mut player = RadioPlayer::new(
        MockDecoderPort::new(),
        MockLine::new(true),
        config::DECODER_VOLUME,
    );
    assert!(!player.attempt(1, 1).await);
}
