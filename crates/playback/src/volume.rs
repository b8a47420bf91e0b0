//! Potentiometer volume control.
//!
//! The raw ADC reading is shaped with a power curve so the low end of the
//! knob has fine resolution, then mapped onto the decoder's 0..=30 scale.
//! Updates are rate limited and deadbanded to keep knob jitter from
//! flooding the serial link.

use embassy_time::{Duration, Instant};

/// Exponent of the taper curve. 2.0 approximates an audio-taper pot on a
/// linear part.
pub const POT_GAMMA: f32 = 2.0;

/// Map a raw 16-bit pot reading onto `0..=full_scale` through the gamma
/// curve.
pub fn pot_to_volume(raw: u16, gamma: f32, full_scale: u8) -> u8 {
    let x = f32::from(raw) / f32::from(u16::MAX);
    let y = libm::powf(x, gamma);
    let level = libm::roundf(y * f32::from(full_scale));
    // roundf of a value in 0..=full_scale; the clamp keeps the cast sound.
    (level as i32).clamp(0, i32::from(full_scale)) as u8
}

/// Deadbanded, rate-limited tracker for the volume knob.
///
/// [`PotVolume::update`] returns the new level when the decoder should be
/// told about it, and `None` when the reading is stale, inside the
/// deadband, or suppressed because a fade-in owns the volume.
pub struct PotVolume {
    current: u8,
    full_scale: u8,
    min_interval: Duration,
    deadband: u8,
    last_update: Option<Instant>,
}

impl PotVolume {
    /// Start tracking at `initial`, the level the decoder was booted with.
    pub fn new(initial: u8, full_scale: u8, min_interval: Duration, deadband: u8) -> Self {
        Self {
            current: initial,
            full_scale,
            min_interval,
            deadband,
            last_update: None,
        }
    }

    /// Level last pushed to the decoder.
    pub fn current(&self) -> u8 {
        self.current
    }

    /// Feed one pot sample. `fade_active` suppresses knob changes while a
    /// fade-in is ramping the same register.
    pub fn update(&mut self, now: Instant, raw: u16, fade_active: bool) -> Option<u8> {
        if fade_active {
            return None;
        }
        if let Some(last) = self.last_update {
            if now - last < self.min_interval {
                return None;
            }
        }
        self.last_update = Some(now);
        let level = pot_to_volume(raw, POT_GAMMA, self.full_scale);
        if level.abs_diff(self.current) <= self.deadband {
            return None;
        }
        self.current = level;
        Some(level)
    }

    /// Adopt a level set by someone else, typically the end of a fade-in.
    pub fn sync(&mut self, level: u8) {
        self.current = level.min(self.full_scale);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curve_endpoints_and_midpoint() {
        assert_eq!(pot_to_volume(0, POT_GAMMA, 28), 0);
        assert_eq!(pot_to_volume(u16::MAX, POT_GAMMA, 28), 28);
        // Half travel with gamma 2.0 lands at a quarter of full scale.
        assert_eq!(pot_to_volume(u16::MAX / 2, POT_GAMMA, 28), 7);
    }

    #[test]
    fn curve_is_monotone() {
        let mut prev = 0u8;
        for raw in (0..=u16::MAX).step_by(257) {
            let v = pot_to_volume(raw, POT_GAMMA, 28);
            assert!(v >= prev);
            prev = v;
        }
    }

    #[test]
    fn deadband_swallows_jitter() {
        let t0 = Instant::from_millis(0);
        let mut pot = PotVolume::new(7, 28, Duration::from_millis(150), 1);
        // Half travel maps to 7, already current.
        assert_eq!(pot.update(t0, u16::MAX / 2, false), None);
        // One step of jitter stays inside the deadband.
        let t1 = t0 + Duration::from_millis(200);
        assert_eq!(pot.update(t1, 34500, false), None);
        // A real turn gets through.
        let t2 = t1 + Duration::from_millis(200);
        assert_eq!(pot.update(t2, u16::MAX, false), Some(28));
        assert_eq!(pot.current(), 28);
    }

    #[test]
    fn updates_are_rate_limited() {
        let t0 = Instant::from_millis(1000);
        let mut pot = PotVolume::new(0, 28, Duration::from_millis(150), 1);
        assert_eq!(pot.update(t0, u16::MAX, false), Some(28));
        // Too soon, even though the level changed a lot.
        assert_eq!(pot.update(t0 + Duration::from_millis(50), 0, false), None);
        assert_eq!(
            pot.update(t0 + Duration::from_millis(151), 0, false),
            Some(0)
        );
    }

    #[test]
    fn fade_suppression_blocks_and_does_not_consume_the_interval() {
        let t0 = Instant::from_millis(0);
        let mut pot = PotVolume::new(0, 28, Duration::from_millis(150), 1);
        assert_eq!(pot.update(t0, u16::MAX, true), None);
        // Suppressed samples never arm the rate limiter.
        assert_eq!(pot.update(t0 + Duration::from_millis(1), u16::MAX, false), Some(28));
    }

    #[test]
    fn sync_adopts_external_level() {
        let mut pot = PotVolume::new(0, 28, Duration::from_millis(150), 1);
        pot.sync(99);
        assert_eq!(pot.current(), 28);
        pot.sync(12);
        assert_eq!(pot.current(), 12);
    }
}
