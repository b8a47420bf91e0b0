//! Mock implementations for testing
//!
//! This module provides mock implementations of all platform traits
//! for use in unit and integration tests.

#![cfg(any(test, feature = "std"))]
#![allow(missing_docs)]

use core::convert::Infallible;

use crate::analog::AnalogIn;
use crate::console::LineConsole;
use crate::eeprom::NonvolatileStore;
use crate::gpio::{DigitalIn, PwmLevelOut};
use crate::rtc::{CalendarDateTime, TimeSource};
use crate::serial::DecoderPort;
use crate::storage::Storage;

/// Mock decoder serial port that records every frame written.
pub struct MockDecoderPort {
    frames: heapless::Vec<heapless::Vec<u8, 16>, 64>,
}

impl MockDecoderPort {
    pub fn new() -> Self {
        Self {
            frames: heapless::Vec::new(),
        }
    }

    /// All frames written so far, oldest first.
    pub fn frames(&self) -> &[heapless::Vec<u8, 16>] {
        &self.frames
    }

    pub fn last_frame(&self) -> Option<&[u8]> {
        self.frames.last().map(heapless::Vec::as_slice)
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }
}

impl Default for MockDecoderPort {
    fn default() -> Self {
        Self::new()
    }
}

impl DecoderPort for MockDecoderPort {
    type Error = Infallible;

    async fn write_all(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        let mut frame = heapless::Vec::new();
        let _ = frame.extend_from_slice(bytes);
        // Oldest frames are dropped silently once the buffer is full.
        let _ = self.frames.push(frame);
        Ok(())
    }
}

/// Mock digital line with an optional scripted level sequence.
///
/// Each [`DigitalIn::is_high`] call pops the next scripted level; once the
/// script is drained the line holds its resting level.
pub struct MockLine {
    level: bool,
    script: heapless::Deque<bool, 128>,
}

impl MockLine {
    pub fn new(level: bool) -> Self {
        Self {
            level,
            script: heapless::Deque::new(),
        }
    }

    pub fn set_level(&mut self, high: bool) {
        self.level = high;
    }

    /// Queue levels to be returned by successive samples, before settling at
    /// `resting`.
    pub fn script(&mut self, levels: &[bool], resting: bool) {
        self.script.clear();
        for &l in levels {
            let _ = self.script.push_back(l);
        }
        self.level = resting;
    }
}

impl DigitalIn for MockLine {
    fn is_high(&mut self) -> bool {
        self.script.pop_front().unwrap_or(self.level)
    }
}

/// Mock PWM sink capturing the written levels.
pub struct MockPwm {
    last: u16,
    writes: usize,
    captured: heapless::Vec<u16, 256>,
}

impl MockPwm {
    pub fn new() -> Self {
        Self {
            last: 0,
            writes: 0,
            captured: heapless::Vec::new(),
        }
    }

    pub fn last(&self) -> u16 {
        self.last
    }

    pub fn writes(&self) -> usize {
        self.writes
    }

    /// The first levels written, up to the capture buffer capacity.
    pub fn captured(&self) -> &[u16] {
        &self.captured
    }
}

impl Default for MockPwm {
    fn default() -> Self {
        Self::new()
    }
}

impl PwmLevelOut for MockPwm {
    fn set_level(&mut self, duty: u16) {
        self.last = duty;
        self.writes += 1;
        let _ = self.captured.push(duty);
    }
}

/// Mock potentiometer.
pub struct MockPot {
    raw: u16,
}

impl MockPot {
    pub fn new(raw: u16) -> Self {
        Self { raw }
    }

    pub fn set_raw(&mut self, raw: u16) {
        self.raw = raw;
    }
}

impl AnalogIn for MockPot {
    type Error = Infallible;

    async fn read_raw(&mut self) -> Result<u16, Self::Error> {
        Ok(self.raw)
    }
}

/// Mock calendar time source.
pub struct MockRtc {
    now: CalendarDateTime,
    osf: bool,
    set_calls: usize,
}

impl MockRtc {
    pub fn new(now: CalendarDateTime) -> Self {
        Self {
            now,
            osf: false,
            set_calls: 0,
        }
    }

    /// A mock whose oscillator-stop flag is set (time invalid).
    pub fn stopped(now: CalendarDateTime) -> Self {
        Self {
            now,
            osf: true,
            set_calls: 0,
        }
    }

    pub fn set_calls(&self) -> usize {
        self.set_calls
    }
}

impl TimeSource for MockRtc {
    type Error = Infallible;

    async fn now(&mut self) -> Result<CalendarDateTime, Self::Error> {
        Ok(self.now)
    }

    async fn set(&mut self, dt: &CalendarDateTime) -> Result<(), Self::Error> {
        self.now = *dt;
        self.osf = false;
        self.set_calls += 1;
        Ok(())
    }

    async fn oscillator_stopped(&mut self) -> Result<bool, Self::Error> {
        Ok(self.osf)
    }
}

/// Mock EEPROM errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockEepromError {
    OutOfRange,
}

/// Mock 4 KiB EEPROM backed by an in-memory array.
pub struct MockEeprom {
    mem: [u8; 4096],
    write_ops: usize,
}

impl MockEeprom {
    pub fn new() -> Self {
        Self {
            mem: [0xFF; 4096],
            write_ops: 0,
        }
    }

    /// Number of completed write operations (for rate-limiter assertions).
    pub fn write_ops(&self) -> usize {
        self.write_ops
    }

    pub fn bytes(&self, addr: u16, len: usize) -> &[u8] {
        &self.mem[addr as usize..addr as usize + len]
    }

    /// Corrupt one byte in place.
    pub fn flip_byte(&mut self, addr: u16) {
        self.mem[addr as usize] ^= 0xFF;
    }
}

impl Default for MockEeprom {
    fn default() -> Self {
        Self::new()
    }
}

impl NonvolatileStore for MockEeprom {
    type Error = MockEepromError;

    async fn read(&mut self, addr: u16, buf: &mut [u8]) -> Result<(), Self::Error> {
        let start = addr as usize;
        let end = start + buf.len();
        if end > self.mem.len() {
            return Err(MockEepromError::OutOfRange);
        }
        buf.copy_from_slice(&self.mem[start..end]);
        Ok(())
    }

    async fn write(&mut self, addr: u16, data: &[u8]) -> Result<(), Self::Error> {
        let start = addr as usize;
        let end = start + data.len();
        if end > self.mem.len() {
            return Err(MockEepromError::OutOfRange);
        }
        self.mem[start..end].copy_from_slice(data);
        self.write_ops += 1;
        Ok(())
    }
}

/// Mock storage errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockStorageError {
    NotFound,
    TooLarge,
    Full,
}

type FileMap = heapless::LinearMap<heapless::String<40>, heapless::Vec<u8, 4096>, 8>;

/// Mock in-memory file storage.
pub struct MockStorage {
    files: FileMap,
    mtime: u32,
}

impl MockStorage {
    pub fn new() -> Self {
        Self {
            files: FileMap::new(),
            mtime: 0,
        }
    }

    /// Pre-populate a file, panicking (test-only) when capacity is exceeded.
    pub fn insert(&mut self, path: &str, data: &[u8]) {
        let key = heapless::String::try_from(path).unwrap_or_default();
        let mut contents = heapless::Vec::new();
        let _ = contents.extend_from_slice(data);
        let _ = self.files.insert(key, contents);
    }

    pub fn set_mtime(&mut self, mtime: u32) {
        self.mtime = mtime;
    }

    pub fn contents(&self, path: &str) -> Option<&[u8]> {
        let key = heapless::String::try_from(path).ok()?;
        self.files.get(&key).map(heapless::Vec::as_slice)
    }
}

impl Default for MockStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl Storage for MockStorage {
    type Error = MockStorageError;

    async fn read_file(&mut self, path: &str, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let data = self.contents(path).ok_or(MockStorageError::NotFound)?;
        if data.len() > buf.len() {
            return Err(MockStorageError::TooLarge);
        }
        buf[..data.len()].copy_from_slice(data);
        Ok(data.len())
    }

    async fn write_file(&mut self, path: &str, data: &[u8]) -> Result<(), Self::Error> {
        let key = heapless::String::try_from(path).map_err(|_| MockStorageError::Full)?;
        let mut contents = heapless::Vec::new();
        contents
            .extend_from_slice(data)
            .map_err(|()| MockStorageError::TooLarge)?;
        self.files.remove(&key);
        self.files
            .insert(key, contents)
            .map_err(|_| MockStorageError::Full)?;
        Ok(())
    }

    async fn exists(&mut self, path: &str) -> Result<bool, Self::Error> {
        Ok(self.contents(path).is_some())
    }

    async fn modified_unix(&mut self, _path: &str) -> Result<u32, Self::Error> {
        Ok(self.mtime)
    }
}

/// Mock bootstrap console yielding at most one scripted line.
pub struct MockConsole {
    line: Option<heapless::Vec<u8, 128>>,
}

impl MockConsole {
    /// A console that never produces input.
    pub fn silent() -> Self {
        Self { line: None }
    }

    /// A console that yields `line` once, then pends forever.
    pub fn with_line(line: &str) -> Self {
        let mut buf = heapless::Vec::new();
        let _ = buf.extend_from_slice(line.as_bytes());
        Self { line: Some(buf) }
    }
}

impl LineConsole for MockConsole {
    type Error = Infallible;

    async fn read_line(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if let Some(line) = self.line.take() {
            let n = line.len().min(buf.len());
            buf[..n].copy_from_slice(&line[..n]);
            return Ok(n);
        }
        loop {
            embassy_time::Timer::after_millis(100).await;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_port_records_frames() {
        let mut port = MockDecoderPort::new();
        port.write_all(&[0x7E, 0xEF]).await.unwrap();
        assert_eq!(port.frames().len(), 1);
        assert_eq!(port.last_frame().unwrap(), &[0x7E, 0xEF]);
    }

    #[test]
    fn mock_line_plays_script_then_rests() {
        let mut line = MockLine::new(true);
        line.script(&[true, false], true);
        assert!(line.is_high());
        assert!(!line.is_high());
        assert!(line.is_high());
        assert!(line.is_high());
    }

    #[tokio::test]
    async fn mock_eeprom_roundtrip() {
        let mut eeprom = MockEeprom::new();
        eeprom.write(0x10, &[1, 2, 3]).await.unwrap();
        let mut buf = [0u8; 3];
        eeprom.read(0x10, &mut buf).await.unwrap();
        assert_eq!(buf, [1, 2, 3]);
        assert_eq!(eeprom.write_ops(), 1);
    }

    #[tokio::test]
    async fn mock_storage_read_write() {
        let mut storage = MockStorage::new();
        storage.write_file("state.txt", b"1,1").await.unwrap();
        let mut buf = [0u8; 16];
        let n = storage.read_file("state.txt", &mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"1,1");
        assert!(storage.exists("state.txt").await.unwrap());
        assert!(!storage.exists("missing").await.unwrap());
    }
}
