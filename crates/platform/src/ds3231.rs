//! DS3231 real-time clock driver.
//!
//! Reference: Maxim DS3231 datasheet (19-5170, Rev 10).
//!
//! Register codec helpers are pure `const fn`s so the BCD and hour-mode
//! handling is testable without a bus. The driver itself is generic over any
//! [`embedded_hal_async::i2c::I2c`] implementation.

use embedded_hal_async::i2c::I2c;

use crate::rtc::{CalendarDateTime, TimeSource};

/// 7-bit I2C device address (fixed in silicon; the A0-A2 pads on common
/// modules address the piggyback EEPROM, not the RTC).
pub const DS3231_I2C_ADDR: u8 = 0x68;
/// Register 0x00: seconds (BCD, bit 7 reserved).
pub const REG_SECONDS: u8 = 0x00;
/// Register 0x0F: status (bit 7 = OSF, oscillator stop flag).
pub const REG_STATUS: u8 = 0x0F;
/// Status-register mask for the oscillator stop flag.
pub const STATUS_OSF_MASK: u8 = 0x80;

/// Convert one BCD byte to its integer value.
#[inline]
#[must_use]
pub const fn bcd_to_int(value: u8) -> u8 {
    (value >> 4) * 10 + (value & 0x0F)
}

/// Convert an integer 0..=99 to BCD.
#[inline]
#[must_use]
pub const fn int_to_bcd(value: u8) -> u8 {
    ((value / 10) << 4) | (value % 10)
}

/// Decode the hour register, tolerating both 12h and 24h encodings.
///
/// Bit 6 selects 12h mode; bit 5 is then the PM flag. The chip is always
/// written back in 24h mode, but a module configured elsewhere may arrive in
/// 12h mode.
#[must_use]
pub const fn decode_hour(raw: u8) -> u8 {
    if raw & 0x40 != 0 {
        let hour = bcd_to_int(raw & 0x1F);
        if raw & 0x20 != 0 {
            // PM: 12 stays 12, 1..=11 shift up
            if hour == 12 {
                12
            } else {
                hour + 12
            }
        } else {
            // AM: 12 means midnight
            if hour == 12 {
                0
            } else {
                hour
            }
        }
    } else {
        bcd_to_int(raw & 0x3F)
    }
}

/// Decode the seven timekeeping registers (0x00..=0x06).
#[must_use]
pub const fn decode_datetime(regs: &[u8; 7]) -> CalendarDateTime {
    CalendarDateTime {
        second: bcd_to_int(regs[0] & 0x7F),
        minute: bcd_to_int(regs[1] & 0x7F),
        hour: decode_hour(regs[2]),
        // regs[3] is day-of-week; recomputed from the date instead
        day: bcd_to_int(regs[4] & 0x3F),
        month: bcd_to_int(regs[5] & 0x1F),
        year: 2000 + bcd_to_int(regs[6]) as u16,
    }
}

/// Encode a datetime into the seven timekeeping registers (24h mode).
///
/// `weekday` is the ISO weekday 1..=7, stored in register 0x03.
#[must_use]
#[allow(clippy::cast_possible_truncation)] // year is validated to 2000..=2099 by the caller
pub const fn encode_datetime(dt: &CalendarDateTime, weekday: u8) -> [u8; 7] {
    [
        int_to_bcd(dt.second),
        int_to_bcd(dt.minute),
        int_to_bcd(dt.hour),
        int_to_bcd(weekday),
        int_to_bcd(dt.day),
        int_to_bcd(dt.month),
        int_to_bcd((dt.year - 2000) as u8),
    ]
}

/// DS3231 driver errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Ds3231Error<E> {
    /// I2C bus error.
    Bus(E),
    /// Year outside the chip's 2000..=2099 range.
    YearOutOfRange,
}

/// DS3231 driver over an async I2C bus.
pub struct Ds3231<I2C> {
    i2c: I2C,
}

impl<I2C: I2c> Ds3231<I2C> {
    /// Wrap an I2C bus. No bus traffic is performed here.
    pub fn new(i2c: I2C) -> Self {
        Self { i2c }
    }

    /// Probe the bus for the chip by reading the status register.
    pub async fn probe(&mut self) -> Result<(), Ds3231Error<I2C::Error>> {
        let mut status = [0u8];
        self.i2c
            .write_read(DS3231_I2C_ADDR, &[REG_STATUS], &mut status)
            .await
            .map_err(Ds3231Error::Bus)?;
        Ok(())
    }

    async fn read_status(&mut self) -> Result<u8, Ds3231Error<I2C::Error>> {
        let mut status = [0u8];
        self.i2c
            .write_read(DS3231_I2C_ADDR, &[REG_STATUS], &mut status)
            .await
            .map_err(Ds3231Error::Bus)?;
        Ok(status[0])
    }
}

impl<I2C: I2c> TimeSource for Ds3231<I2C> {
    type Error = Ds3231Error<I2C::Error>;

    async fn now(&mut self) -> Result<CalendarDateTime, Self::Error> {
        let mut regs = [0u8; 7];
        self.i2c
            .write_read(DS3231_I2C_ADDR, &[REG_SECONDS], &mut regs)
            .await
            .map_err(Ds3231Error::Bus)?;
        Ok(decode_datetime(&regs))
    }

    async fn set(&mut self, dt: &CalendarDateTime) -> Result<(), Self::Error> {
        if !(2000..=2099).contains(&dt.year) {
            return Err(Ds3231Error::YearOutOfRange);
        }
        let regs = encode_datetime(dt, dt.iso_weekday());
        let mut payload = [0u8; 8];
        payload[0] = REG_SECONDS;
        payload[1..].copy_from_slice(&regs);
        self.i2c
            .write(DS3231_I2C_ADDR, &payload)
            .await
            .map_err(Ds3231Error::Bus)?;
        // Clear OSF so the new time reads as valid.
        let status = self.read_status().await?;
        self.i2c
            .write(DS3231_I2C_ADDR, &[REG_STATUS, status & !STATUS_OSF_MASK])
            .await
            .map_err(Ds3231Error::Bus)?;
        Ok(())
    }

    async fn oscillator_stopped(&mut self) -> Result<bool, Self::Error> {
        Ok(self.read_status().await? & STATUS_OSF_MASK != 0)
    }
}
