//! Tuned constants for the radio build.
//!
//! Timing values here were settled against real decoder hardware; change
//! them only with a module on the bench.

/// Full playback volume pushed to the decoder (0..=30 scale).
pub const DECODER_VOLUME: u8 = 28;

/// First busy-confirmation window after a PLAY, in milliseconds.
pub const BUSY_CONFIRM_MS: u64 = 1800;
/// Second-chance window after the retry. Tuned separately from the first
/// window; the two are not derived from one another.
pub const SECOND_CHANCE_MS: u64 = 1500;
/// Busy edges are ignored for this long after any manual command, so the
/// stop/start of a commanded track change is not read as end-of-track.
pub const MANUAL_IGNORE_MS: u64 = 2000;

/// Fade-in ramp length for the synchronized start.
pub const FADE_IN_MS: u32 = 2400;
/// Trailing fade-out applied to the jingle by the sample engine.
pub const FADE_OUT_MS: u32 = 800;

/// Press-to-release duration at or above this is a long press.
pub const LONG_PRESS_MS: u64 = 1000;
/// Quiet time after the last release before a tap count is final.
pub const TAP_WINDOW_MS: u64 = 800;

/// Minimum interval between pot-driven volume updates.
pub const POT_UPDATE_MS: u64 = 150;
/// Pot changes of at most this many volume steps are ignored.
pub const POT_DEADBAND: u8 = 1;

/// The decoder needs this long after power-up before it takes commands.
pub const DECODER_BOOT_MS: u64 = 2000;

/// How long the boot console waits for a `SET ...` line.
pub const CLOCK_CONSOLE_WINDOW_MS: u64 = 5000;
/// Open the clock console at every boot, not just when the oscillator
/// stopped or the button is held. Bench builds flip this to re-set the RTC
/// without opening the cabinet.
pub const FORCE_CLOCK_CONSOLE: bool = false;

/// Cooperative control loop period.
pub const CONTROL_PERIOD_MS: u64 = 10;

/// Weekly schedule file on the primary store.
pub const SCHEDULE_PATH: &str = "schedule.txt";
