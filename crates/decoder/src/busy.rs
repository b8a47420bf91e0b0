//! Busy-line confirmation protocol.
//!
//! After a PLAY the decoder's busy line (active-low while playing) is the
//! only evidence it actually started. [`BusyConfirm`] is the explicit
//! confirmation machine:
//!
//! ```text
//! Waiting ──busy low──────────▶ Confirmed
//!    │ window elapsed
//!    ▼
//! Retried ──busy low──────────▶ Confirmed
//!    │ second window elapsed
//!    ▼
//! GaveUp   (logged by the caller, never fatal)
//! ```
//!
//! Independently, a falling-then-rising busy edge while power is sensed on
//! means the track finished naturally and auto-advance should fire — unless
//! it lands in the ignore window after a manual command, which would
//! otherwise double-count the same mechanical event.

use embassy_time::{Duration, Instant, Timer};
use platform::DigitalIn;

/// Busy line poll period.
pub const BUSY_POLL_MS: u64 = 25;

/// Poll the busy line until it reads low (playing) or `window` elapses.
///
/// Returns `true` when playback was observed within the window.
pub async fn wait_busy_low<L: DigitalIn>(busy: &mut L, window: Duration) -> bool {
    let deadline = Instant::now() + window;
    while Instant::now() < deadline {
        if busy.is_low() {
            return true;
        }
        Timer::after_millis(BUSY_POLL_MS).await;
    }
    false
}

/// Phase of the confirmation machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmPhase {
    /// First confirm window is open.
    Waiting,
    /// First window elapsed; the caller has re-issued the command and the
    /// second-chance window is open.
    Retried,
    /// Busy was observed low; the track is playing.
    Confirmed,
    /// Both windows elapsed without confirmation.
    GaveUp,
}

/// Explicit three-state busy-confirmation machine.
///
/// Pure and synchronous so it can be driven against a simulated busy line;
/// the async windows live in [`wait_busy_low`] and the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusyConfirm {
    phase: ConfirmPhase,
}

impl BusyConfirm {
    /// Start a fresh confirmation attempt.
    #[must_use]
    pub fn new() -> Self {
        Self {
            phase: ConfirmPhase::Waiting,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> ConfirmPhase {
        self.phase
    }

    /// Whether the attempt ended in confirmation.
    pub fn is_confirmed(&self) -> bool {
        self.phase == ConfirmPhase::Confirmed
    }

    /// Whether the machine still expects busy-line observations.
    pub fn is_open(&self) -> bool {
        matches!(self.phase, ConfirmPhase::Waiting | ConfirmPhase::Retried)
    }

    /// The busy line was observed low within the open window.
    pub fn on_busy_low(&mut self) {
        if self.is_open() {
            self.phase = ConfirmPhase::Confirmed;
        }
    }

    /// The open window elapsed without a low observation.
    ///
    /// Returns `true` when the caller should perform the single retry
    /// (reset decoder, restore volume, re-issue STOP+PLAY).
    pub fn on_window_elapsed(&mut self) -> bool {
        match self.phase {
            ConfirmPhase::Waiting => {
                self.phase = ConfirmPhase::Retried;
                true
            }
            ConfirmPhase::Retried => {
                self.phase = ConfirmPhase::GaveUp;
                false
            }
            ConfirmPhase::Confirmed | ConfirmPhase::GaveUp => false,
        }
    }
}

impl Default for BusyConfirm {
    fn default() -> Self {
        Self::new()
    }
}

/// Natural end-of-track detector.
///
/// Sampled by the cooperative loop alongside the busy line; a low→high edge
/// while powered means the decoder finished a track on its own.
#[derive(Debug)]
pub struct EndOfTrackWatch {
    prev_busy_low: bool,
    ignore_until: Instant,
    ignore_window: Duration,
}

impl EndOfTrackWatch {
    /// Create a watch with the given post-manual-command ignore window.
    #[must_use]
    pub fn new(ignore_window: Duration, busy_low_now: bool) -> Self {
        Self {
            prev_busy_low: busy_low_now,
            ignore_until: Instant::from_ticks(0),
            ignore_window,
        }
    }

    /// Arm the ignore window: a manual command was just issued, so the next
    /// busy edge belongs to it, not to a naturally finished track.
    pub fn note_manual_command(&mut self, now: Instant) {
        self.ignore_until = now + self.ignore_window;
    }

    /// Feed one busy-line sample. Returns `true` on a track-finished edge.
    ///
    /// Edges are only reported while `power_on`; the previous level is still
    /// tracked during the ignore window so a suppressed edge is not replayed
    /// later.
    pub fn sample(&mut self, now: Instant, busy_low: bool, power_on: bool) -> bool {
        let edge = self.prev_busy_low && !busy_low;
        self.prev_busy_low = busy_low;
        edge && power_on && now >= self.ignore_until
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use platform::mocks::MockLine;

    #[test]
    fn confirm_on_first_window() {
        let mut confirm = BusyConfirm::new();
        confirm.on_busy_low();
        assert_eq!(confirm.phase(), ConfirmPhase::Confirmed);
        assert!(confirm.is_confirmed());
    }

    #[test]
    fn one_retry_then_give_up() {
        let mut confirm = BusyConfirm::new();
        assert!(confirm.on_window_elapsed(), "first expiry requests a retry");
        assert_eq!(confirm.phase(), ConfirmPhase::Retried);
        assert!(!confirm.on_window_elapsed(), "second expiry gives up");
        assert_eq!(confirm.phase(), ConfirmPhase::GaveUp);
    }

    #[test]
    fn confirm_during_retry_window() {
        let mut confirm = BusyConfirm::new();
        let _ = confirm.on_window_elapsed();
        confirm.on_busy_low();
        assert!(confirm.is_confirmed());
    }

    #[test]
    fn terminal_phases_stay_put() {
        let mut confirm = BusyConfirm::new();
        confirm.on_busy_low();
        assert!(!confirm.on_window_elapsed());
        assert_eq!(confirm.phase(), ConfirmPhase::Confirmed);
    }

    #[tokio::test]
    async fn wait_busy_low_sees_scripted_line() {
        let mut busy = MockLine::new(true);
        // high for two polls, then playing (low)
        busy.script(&[true, true], false);
        assert!(wait_busy_low(&mut busy, Duration::from_millis(500)).await);
    }

    #[tokio::test]
    async fn wait_busy_low_times_out_on_idle_line() {
        let mut busy = MockLine::new(true);
        assert!(!wait_busy_low(&mut busy, Duration::from_millis(80)).await);
    }

    #[test]
    fn end_of_track_edge_detected_when_powered() {
        let mut watch = EndOfTrackWatch::new(Duration::from_millis(2000), true);
        let t0 = Instant::from_ticks(0) + Duration::from_secs(10);
        assert!(!watch.sample(t0, true, true), "still playing");
        assert!(watch.sample(t0 + Duration::from_millis(25), false, true));
    }

    #[test]
    fn edge_suppressed_inside_ignore_window() {
        let mut watch = EndOfTrackWatch::new(Duration::from_millis(2000), false);
        let t0 = Instant::from_ticks(0) + Duration::from_secs(10);
        watch.note_manual_command(t0);
        let _ = watch.sample(t0 + Duration::from_millis(100), true, true);
        assert!(
            !watch.sample(t0 + Duration::from_millis(200), false, true),
            "edge inside the ignore window must not auto-advance"
        );
        // after the window, a fresh low→high edge fires again
        let _ = watch.sample(t0 + Duration::from_millis(2500), true, true);
        assert!(watch.sample(t0 + Duration::from_millis(2600), false, true));
    }

    #[test]
    fn edge_ignored_when_power_off() {
        let mut watch = EndOfTrackWatch::new(Duration::from_millis(2000), true);
        let t0 = Instant::from_ticks(0) + Duration::from_secs(10);
        assert!(!watch.sample(t0, false, false));
    }
}
