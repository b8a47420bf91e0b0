//! The cooperative control loop.
//!
//! One flow owns every blocking operation: button, busy and power-sense
//! sampling, serial writes, persistence I/O. The sample engine's interrupt
//! context is the only thing running beside it, and the two share nothing
//! but the engine's cursor atomics.

use embassy_time::{Duration, Instant, Timer};

use decoder::EndOfTrackWatch;
use persist::PersistManager;
use platform::{AnalogIn, DecoderPort, DigitalIn, NonvolatileStore, Storage, TimeSource};
use playback::{IntroEngine, PotVolume};

use crate::boot::{align_position, ClockStatus, LoadedState};
use crate::config;
use crate::fmt::{debug, info, warning};
use crate::navigation::{Navigation, TapClassifier};
use crate::player::RadioPlayer;

/// Everything the control loop owns, generic over the platform traits so
/// the whole radio runs against mocks.
pub struct Radio<'a, P, L, W, B, A, S, E, T> {
    /// Decoder player.
    pub player: RadioPlayer<P, L>,
    /// Position and known-track bounds.
    pub nav: Navigation,
    /// Dual-tier persistence.
    pub manager: PersistManager,
    classifier: TapClassifier,
    watch: EndOfTrackWatch,
    pot: PotVolume,
    power: W,
    button: B,
    pot_in: A,
    storage: S,
    eeprom: Option<E>,
    rtc: T,
    clock: ClockStatus,
    engine: &'a IntroEngine<'a>,
    schedule_text: &'a str,
    powered: bool,
}

impl<'a, P, L, W, B, A, S, E, T> Radio<'a, P, L, W, B, A, S, E, T>
where
    P: DecoderPort,
    L: DigitalIn,
    W: DigitalIn,
    B: DigitalIn,
    A: AnalogIn,
    S: Storage,
    E: NonvolatileStore,
    T: TimeSource,
{
    /// Assemble the radio after boot reconciliation.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        player: RadioPlayer<P, L>,
        loaded: LoadedState,
        manager: PersistManager,
        power: W,
        button: B,
        pot_in: A,
        storage: S,
        eeprom: Option<E>,
        rtc: T,
        clock: ClockStatus,
        engine: &'a IntroEngine<'a>,
        schedule_text: &'a str,
    ) -> Self {
        Self {
            player,
            nav: Navigation::new(loaded.position, loaded.known),
            manager,
            classifier: TapClassifier::new(
                Duration::from_millis(config::LONG_PRESS_MS),
                Duration::from_millis(config::TAP_WINDOW_MS),
            ),
            watch: EndOfTrackWatch::new(Duration::from_millis(config::MANUAL_IGNORE_MS), false),
            pot: PotVolume::new(
                config::DECODER_VOLUME,
                config::DECODER_VOLUME,
                Duration::from_millis(config::POT_UPDATE_MS),
                config::POT_DEADBAND,
            ),
            power,
            button,
            pot_in,
            storage,
            eeprom,
            rtc,
            clock,
            engine,
            schedule_text,
            powered: true,
        }
    }

    /// Save the position to both tiers. Primary always; secondary through
    /// its rate limiter, stamped with the current week position when the
    /// clock is trusted.
    pub async fn save(&mut self) {
        if self
            .manager
            .save_primary(&mut self.storage, self.nav.position, &self.nav.known)
            .await
            .is_err()
        {
            warning!("primary state save failed");
        }
        let week_seconds = if self.clock.is_trusted() {
            match self.rtc.now().await {
                Ok(dt) => dt.seconds_into_week(),
                Err(_) => 0,
            }
        } else {
            0
        };
        if let Some(eeprom) = self.eeprom.as_mut() {
            let _ = self
                .manager
                .save_secondary(eeprom, self.nav.position, week_seconds)
                .await;
        }
    }

    /// Synchronized station start at the current position: jingle plus
    /// decoder fade-in, then persist the outcome.
    pub async fn start(&mut self) {
        let position = self.nav.position;
        match self
            .player
            .synchronized_start(self.engine, position.album, position.track)
            .await
        {
            Ok(true) => {
                self.nav.known.learn(position.album, position.track);
                info!("on air: album {} track {}", position.album, position.track);
            }
            Ok(false) => {
                warning!(
                    "start unconfirmed for album {} track {}",
                    position.album,
                    position.track
                );
            }
            Err(_) => warning!("decoder link write failed during start"),
        }
        self.pot.sync(config::DECODER_VOLUME);
        self.watch.note_manual_command(Instant::now());
        self.save().await;
    }

    async fn on_power_lost(&mut self) {
        info!("power sense low, going quiet");
        self.powered = false;
        if self.player.stop().await.is_err() {
            warning!("decoder stop failed on power loss");
        }
        self.save().await;
    }

    async fn on_power_restored(&mut self) {
        info!("power sense high, restarting");
        self.powered = true;
        Timer::after_millis(config::DECODER_BOOT_MS).await;
        if self.player.boot().await.is_err() {
            warning!("decoder reset failed after power return");
        }
        self.realign().await;
        self.start().await;
    }

    /// Re-run schedule alignment against the current clock. No-op when the
    /// clock is untrusted or the schedule does not cover the moment.
    pub async fn realign(&mut self) {
        if !self.clock.is_trusted() {
            return;
        }
        let Ok(dt) = self.rtc.now().await else {
            return;
        };
        let loaded = LoadedState {
            position: self.nav.position,
            known: self.nav.known.clone(),
        };
        if let Some(aligned) = align_position(self.schedule_text, dt.seconds_into_week(), &loaded)
        {
            debug!(
                "aligned to album {} track {}",
                aligned.position.album, aligned.position.track
            );
            self.nav.position = aligned.position;
            self.nav.known = aligned.known;
        }
    }

    /// One control-loop iteration: power transitions, button gestures,
    /// end-of-track auto-advance, and the volume pot.
    pub async fn step(&mut self) {
        let now = Instant::now();

        let power_on = self.power.is_high();
        if self.powered && !power_on {
            self.on_power_lost().await;
            return;
        }
        if !self.powered {
            if power_on {
                self.on_power_restored().await;
            }
            return;
        }

        if let Some(event) = self.classifier.sample(now, self.button.is_high()) {
            self.nav.on_event(event, &mut self.player).await;
            self.watch.note_manual_command(Instant::now());
            self.save().await;
            return;
        }

        let busy_low = self.player.busy_low();
        if self.watch.sample(now, busy_low, self.powered) {
            info!("track finished, auto-advancing");
            self.nav.next_track(&mut self.player).await;
            self.watch.note_manual_command(Instant::now());
            self.save().await;
            return;
        }

        if let Ok(raw) = self.pot_in.read_raw().await {
            if let Some(level) = self.pot.update(now, raw, false) {
                if self.player.set_volume(level).await.is_err() {
                    warning!("volume update failed");
                }
            }
        }
    }

    /// Run forever at the control period.
    pub async fn run(&mut self) -> ! {
        loop {
            self.step().await;
            Timer::after_millis(config::CONTROL_PERIOD_MS).await;
        }
    }
}
