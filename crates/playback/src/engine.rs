//! PWM sample engine for the startup jingle.
//!
//! The firmware calls [`IntroEngine::tick`] once per sample period from a
//! timer interrupt while the async side is busy talking to the decoder.
//! State shared across that boundary lives in atomics, so `tick` takes
//! `&self` and a shared reference to the engine can be handed to the
//! interrupt handler.

use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use platform::PwmLevelOut;

use crate::wav::WavAsset;

/// PWM duty for silence, the midpoint of the 16-bit range.
pub const SILENCE_LEVEL: u16 = 32768;

/// Duty delta per 8-bit sample step.
const LUT_STEP: i32 = 256;

fn build_duty_lut() -> [u16; 256] {
    let mut lut = [0u16; 256];
    let mid = i32::from(SILENCE_LEVEL);
    let mut i = 0usize;
    while i < 256 {
        let d = mid + (i as i32 - 128) * LUT_STEP;
        lut[i] = d.clamp(0, i32::from(u16::MAX)) as u16;
        i += 1;
    }
    lut
}

/// Interrupt-driven renderer for an 8-bit mono asset.
///
/// A trailing linear fade-out window keeps the jingle from ending on a
/// click when the decoder takes over the speaker.
pub struct IntroEngine<'a> {
    samples: &'a [u8],
    sample_rate: u32,
    lut: [u16; 256],
    fade_out_len: usize,
    index: AtomicUsize,
    armed: AtomicBool,
    finished: AtomicBool,
}

impl<'a> IntroEngine<'a> {
    /// Build an engine for `asset`, fading the last `fade_out_ms` of it
    /// toward silence. The window is capped at the asset length.
    pub fn new(asset: &WavAsset<'a>, fade_out_ms: u32) -> Self {
        let window =
            (u64::from(asset.sample_rate) * u64::from(fade_out_ms) / 1000) as usize;
        Self {
            samples: asset.samples,
            sample_rate: asset.sample_rate,
            lut: build_duty_lut(),
            fade_out_len: window.min(asset.samples.len()),
            index: AtomicUsize::new(0),
            armed: AtomicBool::new(false),
            finished: AtomicBool::new(false),
        }
    }

    /// Rewind and start feeding samples on the next `tick`.
    pub fn arm(&self) {
        self.index.store(0, Ordering::Relaxed);
        self.finished.store(false, Ordering::Relaxed);
        self.armed.store(true, Ordering::Relaxed);
    }

    /// Stop rendering immediately and park the output at silence.
    pub fn disarm(&self, out: &mut impl PwmLevelOut) {
        self.armed.store(false, Ordering::Relaxed);
        out.set_level(SILENCE_LEVEL);
    }

    /// Abort from a context that does not own the output pin. Marks the
    /// engine finished so the tick owner stops and parks the pin itself.
    pub fn halt(&self) {
        self.armed.store(false, Ordering::Relaxed);
        self.finished.store(true, Ordering::Relaxed);
    }

    /// True once the whole asset has been played out.
    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Relaxed)
    }

    /// Samples per second the caller should tick at.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Playback length in milliseconds.
    pub fn duration_ms(&self) -> u32 {
        if self.sample_rate == 0 {
            return 0;
        }
        ((self.samples.len() as u64 * 1000) / u64::from(self.sample_rate)) as u32
    }

    /// Emit one sample. Called from the sample-rate interrupt; does
    /// nothing when the engine is not armed.
    pub fn tick(&self, out: &mut impl PwmLevelOut) {
        if !self.armed.load(Ordering::Relaxed) {
            return;
        }
        let n = self.samples.len();
        let idx = self.index.load(Ordering::Relaxed);
        if idx >= n {
            out.set_level(SILENCE_LEVEL);
            self.armed.store(false, Ordering::Relaxed);
            self.finished.store(true, Ordering::Relaxed);
            return;
        }
        let raw = i32::from(self.lut[usize::from(self.samples[idx])]);
        let remaining = n - idx;
        let duty = if self.fade_out_len > 0 && remaining <= self.fade_out_len {
            let scale = (remaining * 256 / self.fade_out_len) as i32;
            let mid = i32::from(SILENCE_LEVEL);
            (mid + (raw - mid) * scale / 256).clamp(0, i32::from(u16::MAX)) as u16
        } else {
            raw as u16
        };
        out.set_level(duty);
        self.index.store(idx + 1, Ordering::Relaxed);
    }
}
