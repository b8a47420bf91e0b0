//! Digital line and PWM output abstractions.
//!
//! Three input lines matter to the core: the decoder's busy output
//! (active-low while playing), the user button (active-low, pulled up) and
//! the power-sense line from the amplifier rail (active-high). All are
//! sampled by the cooperative main flow; none are interrupt-driven.

/// A single digital input line.
pub trait DigitalIn {
    /// Sample the line. `true` = electrically high.
    fn is_high(&mut self) -> bool;

    /// Sample the line. `true` = electrically low.
    fn is_low(&mut self) -> bool {
        !self.is_high()
    }
}

/// PWM output level sink for the AM intro sample stream.
///
/// The carrier runs far above the audio band; the engine writes one 16-bit
/// duty level per sample period. 32768 is the silence midpoint.
///
/// Implementations must be non-blocking: [`PwmLevelOut::set_level`] is called
/// from the sample interrupt context.
pub trait PwmLevelOut {
    /// Set the output duty level (0..=65535, midpoint 32768 = silence).
    fn set_level(&mut self, duty: u16);
}
