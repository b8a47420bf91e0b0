//! The decoder-facing player: confirmed plays and the synchronized start.

use embassy_time::Duration;

use decoder::{wait_busy_low, BusyConfirm, DecoderLink};
use platform::{DecoderPort, DigitalIn};
use playback::{run_fade_in, FadePlan, IntroEngine};

use crate::config;
use crate::fmt::{info, warning};
use crate::navigation::PlayAttempt;

/// Decoder link plus busy line, driving every play through the
/// confirmation protocol.
pub struct RadioPlayer<P, L> {
    link: DecoderLink<P>,
    busy: L,
    target_volume: u8,
}

impl<P: DecoderPort, L: DigitalIn> RadioPlayer<P, L> {
    /// Wrap the serial port and busy line. `target_volume` is the level
    /// restored after resets and fades.
    pub fn new(port: P, busy: L, target_volume: u8) -> Self {
        Self {
            link: DecoderLink::new(port),
            busy,
            target_volume,
        }
    }

    /// Reset the decoder and restore the working volume. Used at boot and
    /// when power returns.
    pub async fn boot(&mut self) -> Result<(), P::Error> {
        self.link.reset().await?;
        self.link.set_volume(self.target_volume).await
    }

    /// Stop whatever is playing.
    pub async fn stop(&mut self) -> Result<(), P::Error> {
        self.link.stop().await
    }

    /// Push a new volume level.
    pub async fn set_volume(&mut self, level: u8) -> Result<(), P::Error> {
        self.link.set_volume(level).await
    }

    /// Sample the busy line: low means the decoder is playing.
    pub fn busy_low(&mut self) -> bool {
        self.busy.is_low()
    }

    /// Access the link (tests and the emulator).
    pub fn link(&self) -> &DecoderLink<P> {
        &self.link
    }

    async fn play_with_confirm(&mut self, album: u8, track: u8) -> Result<bool, P::Error> {
        self.link.stop_then_play(album, track).await?;
        let mut confirm = BusyConfirm::new();
        if wait_busy_low(&mut self.busy, Duration::from_millis(config::BUSY_CONFIRM_MS)).await {
            confirm.on_busy_low();
        } else if confirm.on_window_elapsed() {
            info!("no busy confirm for {}/{}, retrying once", album, track);
            self.link.reset().await?;
            self.link.set_volume(self.target_volume).await?;
            self.link.stop_then_play(album, track).await?;
            if wait_busy_low(&mut self.busy, Duration::from_millis(config::SECOND_CHANCE_MS)).await
            {
                confirm.on_busy_low();
            } else {
                let _ = confirm.on_window_elapsed();
            }
        }
        Ok(confirm.is_confirmed())
    }

    /// Start the station: decoder track at volume zero, jingle on the PWM
    /// pin, then the fade-in ramp. PLAY goes out before the engine is
    /// armed so the decoder is never behind local sample generation.
    ///
    /// Returns whether the decoder confirmed within either window. The
    /// engine is halted on the error path so the tick owner parks the pin.
    pub async fn synchronized_start(
        &mut self,
        engine: &IntroEngine<'_>,
        album: u8,
        track: u8,
    ) -> Result<bool, P::Error> {
        let result = self.start_inner(engine, album, track).await;
        if result.is_err() {
            engine.halt();
        }
        result
    }

    async fn start_inner(
        &mut self,
        engine: &IntroEngine<'_>,
        album: u8,
        track: u8,
    ) -> Result<bool, P::Error> {
        self.link.reset().await?;
        self.link.set_volume(0).await?;
        self.link.stop_then_play(album, track).await?;
        engine.arm();

        let plan = FadePlan::compute(config::FADE_IN_MS, engine.duration_ms());
        let confirmed = run_fade_in(
            &mut self.link,
            &mut self.busy,
            engine,
            plan,
            self.target_volume,
            Duration::from_millis(config::BUSY_CONFIRM_MS),
        )
        .await?;
        if confirmed {
            return Ok(true);
        }

        // Second chance at full volume; the jingle is over by now.
        info!("no busy confirm during fade for {}/{}, retrying", album, track);
        self.link.reset().await?;
        self.link.set_volume(self.target_volume).await?;
        self.link.stop_then_play(album, track).await?;
        Ok(wait_busy_low(&mut self.busy, Duration::from_millis(config::SECOND_CHANCE_MS)).await)
    }
}

impl<P: DecoderPort, L: DigitalIn> PlayAttempt for RadioPlayer<P, L> {
    async fn attempt(&mut self, album: u8, track: u8) -> bool {
        match self.play_with_confirm(album, track).await {
            Ok(confirmed) => confirmed,
            Err(_) => {
                warning!("decoder link write failed during play attempt");
                false
            }
        }
    }
}
