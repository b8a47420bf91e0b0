//! Decoder fade-in synchronized to the startup jingle.
//!
//! The decoder starts its track at volume zero while the jingle plays on
//! the PWM pin; volume then ramps in steps so the station "comes in" under
//! the jingle's fade-out tail. While ramping, the busy line is polled to
//! confirm the decoder really started, within the caller's window.

use embassy_time::{Duration, Instant, Timer};

use decoder::DecoderLink;
use platform::{DecoderPort, DigitalIn};

use crate::engine::IntroEngine;

/// Most steps a ramp is split into.
const MAX_STEPS: u32 = 20;
/// Shortest useful step, volume writes below this just stack up serial
/// settles.
const STEP_BUDGET_MS: u32 = 40;
/// Floor for the per-step delay.
const MIN_STEP_DELAY_MS: u32 = 10;
/// Poll period while waiting inside a step.
const POLL_MS: u64 = 10;

/// Ramp shape: how many volume steps and how long each one holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FadePlan {
    /// Number of ramp steps, at least 1.
    pub steps: u32,
    /// Hold per step in milliseconds.
    pub step_delay_ms: u32,
}

impl FadePlan {
    /// Shape a ramp of `fade_total_ms`, shortened to the jingle length
    /// when a jingle is armed so the ramp never outlives it.
    pub fn compute(fade_total_ms: u32, jingle_ms: u32) -> Self {
        let total = if jingle_ms > 0 {
            fade_total_ms.min(jingle_ms)
        } else {
            fade_total_ms
        };
        let steps = (total / STEP_BUDGET_MS).clamp(1, MAX_STEPS);
        let step_delay_ms = (total / steps).max(MIN_STEP_DELAY_MS);
        Self {
            steps,
            step_delay_ms,
        }
    }
}

/// Ramp the decoder from volume zero to `target_volume` while the jingle
/// plays out, polling `busy` for a start confirmation until
/// `confirm_window` has elapsed.
///
/// If the jingle finishes mid-ramp the volume jumps straight to target.
/// Returns whether the busy line went low inside the window.
pub async fn run_fade_in<P, L>(
    link: &mut DecoderLink<P>,
    busy: &mut L,
    engine: &IntroEngine<'_>,
    plan: FadePlan,
    target_volume: u8,
    confirm_window: Duration,
) -> Result<bool, P::Error>
where
    P: DecoderPort,
    L: DigitalIn,
{
    let confirm_deadline = Instant::now() + confirm_window;
    let mut confirmed = false;

    for step in 0..=plan.steps {
        let level = (u32::from(target_volume) * step / plan.steps) as u8;
        link.set_volume(level).await?;

        let step_deadline = Instant::now() + Duration::from_millis(u64::from(plan.step_delay_ms));
        loop {
            if !confirmed && Instant::now() <= confirm_deadline && busy.is_low() {
                confirmed = true;
            }
            if engine.is_finished() || Instant::now() >= step_deadline {
                break;
            }
            Timer::after_millis(POLL_MS).await;
        }

        if engine.is_finished() && step < plan.steps {
            link.set_volume(target_volume).await?;
            break;
        }
    }

    // Hold here until the jingle is done so the caller's takeover of the
    // speaker lines up with the fade-out tail.
    while !engine.is_finished() {
        if !confirmed && Instant::now() <= confirm_deadline && busy.is_low() {
            confirmed = true;
        }
        Timer::after_millis(POLL_MS * 2).await;
    }
    Ok(confirmed)
}
