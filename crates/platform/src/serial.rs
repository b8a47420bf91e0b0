//! Serial port abstraction for the decoder link.

/// Byte sink for the decoder's 9600-baud serial link.
///
/// The decoder protocol is fire-and-forget: frames are written, nothing is
/// read back. Confirmation comes from the busy line, not the UART.
pub trait DecoderPort {
    /// Error type
    type Error: core::fmt::Debug;

    /// Write an entire frame to the link.
    fn write_all(
        &mut self,
        bytes: &[u8],
    ) -> impl core::future::Future<Output = Result<(), Self::Error>>;
}

/// Adapter exposing any [`embedded_io_async::Write`] as a [`DecoderPort`].
///
/// Used by the hardware target to wrap the Embassy UART TX half.
pub struct IoPort<W>(pub W);

impl<W: embedded_io_async::Write> DecoderPort for IoPort<W> {
    type Error = W::Error;

    async fn write_all(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        self.0.write_all(bytes).await
    }
}
