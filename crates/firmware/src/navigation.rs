//! Button classification and track navigation.
//!
//! A single button produces multi-tap and long-press events; each event
//! maps to a move over the album/track space, bounded by the set of
//! tracks playback has confirmed to exist.

use embassy_time::{Duration, Instant};

use persist::{KnownTracks, PlaybackPosition, MAX_ALBUM};

use crate::fmt::info;

/// A decided button gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    /// `n` short taps followed by a quiet window, `n >= 1`.
    Taps(u8),
    /// One press held at or past the long-press threshold.
    LongPress,
}

/// Turns raw button samples into [`ButtonEvent`]s.
///
/// Taps accumulate while releases keep coming inside the tap window; the
/// count is decided only once the window passes with no press. A long
/// press is decided immediately on release and throws away any pending
/// tap count, so "tap, tap, hold" is just a long press.
pub struct TapClassifier {
    long_press: Duration,
    tap_window: Duration,
    pressed_at: Option<Instant>,
    last_release: Option<Instant>,
    taps: u8,
}

impl TapClassifier {
    /// New classifier with the given long-press threshold and tap quiet
    /// window.
    #[must_use]
    pub fn new(long_press: Duration, tap_window: Duration) -> Self {
        Self {
            long_press,
            tap_window,
            pressed_at: None,
            last_release: None,
            taps: 0,
        }
    }

    /// Feed one debounced button sample. Returns a decided event, if any.
    pub fn sample(&mut self, now: Instant, pressed: bool) -> Option<ButtonEvent> {
        match (self.pressed_at, pressed) {
            (None, true) => {
                self.pressed_at = Some(now);
                None
            }
            (Some(since), false) => {
                self.pressed_at = None;
                if now - since >= self.long_press {
                    self.taps = 0;
                    self.last_release = None;
                    return Some(ButtonEvent::LongPress);
                }
                self.taps = self.taps.saturating_add(1);
                self.last_release = Some(now);
                None
            }
            (None, false) => {
                if let Some(release) = self.last_release {
                    if self.taps > 0 && now - release > self.tap_window {
                        let count = self.taps;
                        self.taps = 0;
                        self.last_release = None;
                        return Some(ButtonEvent::Taps(count));
                    }
                }
                None
            }
            (Some(_), true) => None,
        }
    }

    /// Whether the button is currently held down.
    pub fn is_pressed(&self) -> bool {
        self.pressed_at.is_some()
    }
}

/// One attempt to start a track on the decoder.
///
/// `true` means the busy line confirmed playback within the protocol's
/// windows; `false` covers both "track does not exist" and any link
/// failure, which navigation deliberately treats alike.
pub trait PlayAttempt {
    /// Issue the play and run the confirmation protocol.
    async fn attempt(&mut self, album: u8, track: u8) -> bool;
}

/// Album/track navigation over the known-track bounds.
pub struct Navigation {
    /// Current position. Mutated only here and by schedule alignment.
    pub position: PlaybackPosition,
    /// Highest confirmed track per album.
    pub known: KnownTracks,
}

impl Navigation {
    /// Start navigating from a loaded position and bounds.
    #[must_use]
    pub fn new(position: PlaybackPosition, known: KnownTracks) -> Self {
        Self { position, known }
    }

    async fn play_current<P: PlayAttempt>(&mut self, player: &mut P) -> bool {
        let confirmed = player
            .attempt(self.position.album, self.position.track)
            .await;
        if confirmed {
            self.known.learn(self.position.album, self.position.track);
        } else {
            info!(
                "playback unconfirmed: album {} track {}",
                self.position.album, self.position.track
            );
        }
        confirmed
    }

    /// Long press: jump to the next album (wrapping 99 to 1) at track 1.
    /// An album that will not confirm falls back to album 1, accepting
    /// whatever that attempt yields.
    pub async fn next_album<P: PlayAttempt>(&mut self, player: &mut P) -> bool {
        self.position.album = if self.position.album >= MAX_ALBUM {
            1
        } else {
            self.position.album + 1
        };
        self.position.track = 1;
        if self.play_current(player).await {
            return true;
        }
        self.position = PlaybackPosition::default();
        self.play_current(player).await
    }

    /// Single tap and auto-advance: step to the next track.
    ///
    /// Inside the album's known bound this is a plain advance. Past the
    /// bound it is a probe: confirmation extends the bound, otherwise the
    /// album wraps back to track 1.
    pub async fn next_track<P: PlayAttempt>(&mut self, player: &mut P) -> bool {
        let album = self.position.album;
        let candidate = self.position.track.saturating_add(1);
        if candidate <= self.known.bound(album) {
            self.position.track = candidate;
            return self.play_current(player).await;
        }
        // Probe an unconfirmed track number.
        self.position.track = candidate;
        if self.play_current(player).await {
            return true;
        }
        self.position.track = 1;
        self.play_current(player).await
    }

    /// Double tap: previous track, wrapping up to the album's known bound
    /// (at least 1) from track 1.
    pub async fn prev_track<P: PlayAttempt>(&mut self, player: &mut P) -> bool {
        self.position.track = if self.position.track > 1 {
            self.position.track - 1
        } else {
            self.known.bound(self.position.album).max(1)
        };
        self.play_current(player).await
    }

    /// Triple or more taps: restart the album at track 1.
    pub async fn restart_album<P: PlayAttempt>(&mut self, player: &mut P) -> bool {
        self.position.track = 1;
        self.play_current(player).await
    }

    /// Dispatch a decided button event.
    pub async fn on_event<P: PlayAttempt>(&mut self, event: ButtonEvent, player: &mut P) -> bool {
        match event {
            ButtonEvent::LongPress => self.next_album(player).await,
            ButtonEvent::Taps(1) => self.next_track(player).await,
            ButtonEvent::Taps(2) => self.prev_track(player).await,
            ButtonEvent::Taps(_) => self.restart_album(player).await,
        }
    }
}
