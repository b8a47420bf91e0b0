//! Analog input abstraction for the volume potentiometer.

/// A single analog input channel.
pub trait AnalogIn {
    /// Error type
    type Error: core::fmt::Debug;

    /// Read the channel, scaled to the full 16-bit range (0..=65535).
    fn read_raw(&mut self) -> impl core::future::Future<Output = Result<u16, Self::Error>>;
}
