//! Command link to the decoder module.
//!
//! All sends are fire-and-forget with a fixed post-send settle so back-to-back
//! frames never collide at 9600 baud. The decoder needs a much longer settle
//! after RESET, and a guard pause between STOP and the following PLAY.

use embassy_time::Timer;
use platform::DecoderPort;

use crate::frame::{encode_frame, Command, VOLUME_MAX};

/// Settle delay after every frame.
pub const SERIAL_SETTLE_MS: u64 = 30;
/// Settle delay after a RESET command.
pub const RESET_SETTLE_MS: u64 = 800;
/// Guard delay between a STOP and the following PLAY.
pub const STOP_PLAY_GUARD_MS: u64 = 120;

/// Link state: last volume and command issued.
///
/// Used by the fade orchestrator to compute volume steps; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderLinkState {
    /// Last volume level written (0..=30).
    pub volume: u8,
    /// Last command issued, if any.
    pub last_command: Option<Command>,
}

/// Serial command link to the decoder.
pub struct DecoderLink<P> {
    port: P,
    state: DecoderLinkState,
}

impl<P: DecoderPort> DecoderLink<P> {
    /// Wrap a serial port. No traffic is performed here.
    pub fn new(port: P) -> Self {
        Self {
            port,
            state: DecoderLinkState {
                volume: 0,
                last_command: None,
            },
        }
    }

    /// Current link state.
    pub fn state(&self) -> DecoderLinkState {
        self.state
    }

    /// Access the underlying port (test hook).
    pub fn port(&self) -> &P {
        &self.port
    }

    async fn send(&mut self, cmd: Command) -> Result<(), P::Error> {
        self.port.write_all(&encode_frame(cmd)).await?;
        self.state.last_command = Some(cmd);
        Timer::after_millis(SERIAL_SETTLE_MS).await;
        Ok(())
    }

    /// Reset the module and wait out its long settle.
    pub async fn reset(&mut self) -> Result<(), P::Error> {
        self.send(Command::Reset).await?;
        Timer::after_millis(RESET_SETTLE_MS).await;
        Ok(())
    }

    /// Set the output volume, clamped to 0..=30.
    pub async fn set_volume(&mut self, level: u8) -> Result<(), P::Error> {
        let level = level.min(VOLUME_MAX);
        self.send(Command::SetVolume(level)).await?;
        self.state.volume = level;
        Ok(())
    }

    /// Stop playback.
    pub async fn stop(&mut self) -> Result<(), P::Error> {
        self.send(Command::Stop).await
    }

    /// Play a folder/track directly, with no preceding stop.
    pub async fn play_folder_track(&mut self, folder: u8, track: u8) -> Result<(), P::Error> {
        self.send(Command::PlayFolderTrack { folder, track }).await
    }

    /// STOP, guard pause, then PLAY — the sequence used for every track
    /// change so the decoder has settled before the new command.
    pub async fn stop_then_play(&mut self, folder: u8, track: u8) -> Result<(), P::Error> {
        self.stop().await?;
        Timer::after_millis(STOP_PLAY_GUARD_MS).await;
        self.play_folder_track(folder, track).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use platform::mocks::MockDecoderPort;

    #[tokio::test]
    async fn stop_then_play_issues_both_frames_in_order() {
        let mut link = DecoderLink::new(MockDecoderPort::new());
        link.stop_then_play(2, 9).await.unwrap();

        let frames = link.port().frames();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0][3], 0x16); // STOP
        assert_eq!(frames[1][3], 0x0F); // PLAY
        assert_eq!(frames[1][5], 2);
        assert_eq!(frames[1][6], 9);
    }

    #[tokio::test]
    async fn set_volume_tracks_state_and_clamps() {
        let mut link = DecoderLink::new(MockDecoderPort::new());
        link.set_volume(99).await.unwrap();
        assert_eq!(link.state().volume, 30);
        link.set_volume(12).await.unwrap();
        assert_eq!(link.state().volume, 12);
        assert_eq!(
            link.state().last_command,
            Some(Command::SetVolume(12)),
        );
    }
}
