//! Desktop emulator: runs the whole radio against mocks.
//!
//! ```bash
//! cargo run -p firmware --example radio_emulator --features emulator
//! ```
//!
//! Boots the radio with a synthetic jingle and schedule, aligns to a mock
//! clock, runs the synchronized start against a decoder that confirms on
//! its busy line, then lets the control loop idle for a moment.

use std::time::Duration as StdDuration;

use embassy_time::{Duration, Timer};
use tracing::info;

use firmware::boot::{establish_clock, load_schedule, reconcile_state, ClockStatus, LoadedState};
use firmware::player::RadioPlayer;
use firmware::{config, Radio};
use persist::PersistManager;
use platform::mocks::{
    MockConsole, MockDecoderPort, MockEeprom, MockLine, MockPot, MockPwm, MockRtc, MockStorage,
};
use platform::CalendarDateTime;
use playback::{IntroEngine, WavAsset};

const SCHEDULE: &str = "\
# emulator schedule
1,1,1:00:00
1,2,1:00:00
2,1,2:00:00
1,3,30:00
";

fn synth_wav() -> Vec<u8> {
    // 300 ms of a 600 Hz square-ish tone at 8 kHz, 8-bit mono.
    let rate = 8000u32;
    let samples: Vec<u8> = (0..2400u32)
        .map(|i| if (i * 600 / rate) % 2 == 0 { 180 } else { 76 })
        .collect();
    let mut image = Vec::new();
    image.extend_from_slice(b"RIFF");
    image.extend_from_slice(&(36 + samples.len() as u32).to_le_bytes());
    image.extend_from_slice(b"WAVE");
    image.extend_from_slice(b"fmt ");
    image.extend_from_slice(&16u32.to_le_bytes());
    image.extend_from_slice(&1u16.to_le_bytes());
    image.extend_from_slice(&1u16.to_le_bytes());
    image.extend_from_slice(&rate.to_le_bytes());
    image.extend_from_slice(&rate.to_le_bytes());
    image.extend_from_slice(&1u16.to_le_bytes());
    image.extend_from_slice(&8u16.to_le_bytes());
    image.extend_from_slice(b"data");
    image.extend_from_slice(&(samples.len() as u32).to_le_bytes());
    image.extend_from_slice(&samples);
    image
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // Tuesday 09:30, trusted clock.
    let now = CalendarDateTime {
        year: 2024,
        month: 1,
        day: 2,
        hour: 9,
        minute: 30,
        second: 0,
    };
    let mut rtc = MockRtc::new(now);
    let mut console = MockConsole::silent();
    let clock = establish_clock(&mut rtc, &mut console, false, Duration::from_millis(50)).await;
    assert_eq!(clock, ClockStatus::Valid);

    let mut storage = MockStorage::new();
    storage.insert(config::SCHEDULE_PATH, SCHEDULE.as_bytes());
    let mut schedule_buf = [0u8; 1024];
    let (_, checksum, mtime) = load_schedule(&mut storage, &mut schedule_buf)
        .await
        .unwrap_or(("", 0, 0));
    let mut manager = PersistManager::new(checksum, mtime);

    let mut eeprom = MockEeprom::new();
    let loaded: LoadedState =
        reconcile_state(&mut manager, &mut storage, Some(&mut eeprom)).await;
    info!(
        album = loaded.position.album,
        track = loaded.position.track,
        "state loaded"
    );

    // Synthetic jingle driven by a background ticker at the sample rate.
    let image: &'static [u8] = Box::leak(synth_wav().into_boxed_slice());
    let Ok(asset) = WavAsset::parse(image) else {
        info!("synth wav rejected, nothing to emulate");
        return;
    };
    let engine: &'static IntroEngine<'static> =
        Box::leak(Box::new(IntroEngine::new(&asset, config::FADE_OUT_MS)));
    let ticker_engine = engine;
    tokio::spawn(async move {
        let mut pwm = MockPwm::new();
        loop {
            ticker_engine.tick(&mut pwm);
            tokio::time::sleep(StdDuration::from_micros(125)).await;
        }
    });

    // Busy line: the decoder "starts" shortly after every command.
    let busy = MockLine::new(false);
    let player = RadioPlayer::new(MockDecoderPort::new(), busy, config::DECODER_VOLUME);

    let mut radio = Radio::new(
        player,
        loaded,
        manager,
        MockLine::new(true),  // power sense on
        MockLine::new(false), // button released
        MockPot::new(48_000),
        storage,
        Some(eeprom),
        rtc,
        clock,
        engine,
        SCHEDULE,
    );

    radio.realign().await;
    info!(
        album = radio.nav.position.album,
        track = radio.nav.position.track,
        "aligned to schedule"
    );

    radio.start().await;
    info!("synchronized start complete");

    // A few quiet loop iterations.
    for _ in 0..20 {
        radio.step().await;
        Timer::after_millis(config::CONTROL_PERIOD_MS).await;
    }

    info!(
        album = radio.nav.position.album,
        track = radio.nav.position.track,
        frames = radio.player.link().port().frames().len(),
        "emulated session done"
    );
}
