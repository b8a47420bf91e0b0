//! Line-oriented console abstraction for the RTC bootstrap command.
//!
//! Only used during the bounded window at boot in which an operator may send
//! `SET YYYY-MM-DD HH:MM:SS`. The firmware wraps [`LineConsole::read_line`]
//! in `embassy_time::with_timeout`, so implementations may pend forever when
//! no input arrives.

/// A console that yields complete lines.
pub trait LineConsole {
    /// Error type
    type Error: core::fmt::Debug;

    /// Read one line (terminated by CR or LF, terminator not included) into
    /// `buf`; returns its length. Empty lines are skipped, overlong input is
    /// truncated to `buf.len()`.
    fn read_line(
        &mut self,
        buf: &mut [u8],
    ) -> impl core::future::Future<Output = Result<usize, Self::Error>>;
}
