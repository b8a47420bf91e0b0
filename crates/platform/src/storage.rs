//! Storage abstraction for file access.
//!
//! Three files matter to the core: the weekly schedule, the primary state
//! record, and the AM intro WAV asset. All are small enough to read whole
//! into a caller-supplied buffer, so the trait skips open/seek entirely.

/// File storage access.
pub trait Storage {
    /// Error type
    type Error: core::fmt::Debug;

    /// Read an entire file into `buf`; returns the number of bytes read.
    ///
    /// Fails when the file is missing or larger than `buf`.
    fn read_file(
        &mut self,
        path: &str,
        buf: &mut [u8],
    ) -> impl core::future::Future<Output = Result<usize, Self::Error>>;

    /// Create or overwrite a file with `data`.
    fn write_file(
        &mut self,
        path: &str,
        data: &[u8],
    ) -> impl core::future::Future<Output = Result<(), Self::Error>>;

    /// Check if a path exists.
    fn exists(&mut self, path: &str) -> impl core::future::Future<Output = Result<bool, Self::Error>>;

    /// Last-modified time as Unix seconds, or 0 when the backend does not
    /// track timestamps.
    fn modified_unix(
        &mut self,
        path: &str,
    ) -> impl core::future::Future<Output = Result<u32, Self::Error>>;
}
