//! AT24C32 EEPROM driver and nonvolatile store abstraction.
//!
//! The AT24C32 rides on most DS3231 modules at 0x50..=0x57 (set by the
//! A0-A2 pads). It is addressed with a 16-bit byte address and written in
//! 32-byte pages; each page write needs a short settle before the chip
//! acknowledges again.

use embassy_time::Timer;
use embedded_hal_async::i2c::I2c;

/// Lowest possible AT24C32 bus address (A2 A1 A0 = 000).
pub const AT24C32_ADDR_MIN: u8 = 0x50;
/// Highest possible AT24C32 bus address (A2 A1 A0 = 111, the common default).
pub const AT24C32_ADDR_MAX: u8 = 0x57;
/// Write page size in bytes.
pub const AT24C32_PAGE_SIZE: usize = 32;
/// Per-page write settle time.
pub const AT24C32_WRITE_SETTLE_MS: u64 = 6;

/// A byte store with 16-bit addressing.
///
/// May be absent at runtime; absence is handled by the persistence layer,
/// never treated as fatal.
pub trait NonvolatileStore {
    /// Error type
    type Error: core::fmt::Debug;

    /// Read `buf.len()` bytes starting at `addr`.
    fn read(
        &mut self,
        addr: u16,
        buf: &mut [u8],
    ) -> impl core::future::Future<Output = Result<(), Self::Error>>;

    /// Write `data` starting at `addr`, chunked to the device page size.
    fn write(
        &mut self,
        addr: u16,
        data: &[u8],
    ) -> impl core::future::Future<Output = Result<(), Self::Error>>;
}

/// AT24C32 driver over an async I2C bus.
pub struct At24c32<I2C> {
    i2c: I2C,
    device_addr: u8,
}

impl<I2C: I2c> At24c32<I2C> {
    /// Create a driver for a chip at a known bus address.
    pub fn new(i2c: I2C, device_addr: u8) -> Self {
        Self { i2c, device_addr }
    }

    /// Scan 0x50..=0x57 for a responding chip and return a driver for the
    /// first hit, or `None` when the module has no EEPROM fitted.
    pub async fn detect(mut i2c: I2C) -> Option<Self> {
        let mut found = None;
        for addr in AT24C32_ADDR_MIN..=AT24C32_ADDR_MAX {
            let mut probe = [0u8];
            if i2c
                .write_read(addr, &[0x00, 0x00], &mut probe)
                .await
                .is_ok()
            {
                found = Some(addr);
                break;
            }
        }
        found.map(|device_addr| Self { i2c, device_addr })
    }

    /// The detected or configured bus address.
    pub fn device_addr(&self) -> u8 {
        self.device_addr
    }
}

impl<I2C: I2c> NonvolatileStore for At24c32<I2C> {
    type Error = I2C::Error;

    async fn read(&mut self, addr: u16, buf: &mut [u8]) -> Result<(), Self::Error> {
        let header = addr.to_be_bytes();
        self.i2c.write_read(self.device_addr, &header, buf).await
    }

    async fn write(&mut self, addr: u16, data: &[u8]) -> Result<(), Self::Error> {
        let mut offset = 0usize;
        while offset < data.len() {
            let at = addr as usize + offset;
            let page_off = at % AT24C32_PAGE_SIZE;
            let chunk = (AT24C32_PAGE_SIZE - page_off).min(data.len() - offset);

            let mut frame = heapless::Vec::<u8, { 2 + AT24C32_PAGE_SIZE }>::new();
            #[allow(clippy::cast_possible_truncation)] // at stays within u16 addressing
            let at16 = at as u16;
            let _ = frame.extend_from_slice(&at16.to_be_bytes());
            let _ = frame.extend_from_slice(&data[offset..offset + chunk]);
            self.i2c.write(self.device_addr, &frame).await?;

            Timer::after_millis(AT24C32_WRITE_SETTLE_MS).await;
            offset += chunk;
        }
        Ok(())
    }
}
