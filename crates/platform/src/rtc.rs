//! Calendar time source abstraction and week arithmetic.
//!
//! The schedule spans one week starting Monday 00:00:00, so everything the
//! core needs from a date is its ISO weekday and the number of seconds into
//! that week.

/// A calendar date and time at 1-second resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalendarDateTime {
    /// Full year (2000..=2099 for the DS3231).
    pub year: u16,
    /// Month 1..=12.
    pub month: u8,
    /// Day of month 1..=31.
    pub day: u8,
    /// Hour 0..=23.
    pub hour: u8,
    /// Minute 0..=59.
    pub minute: u8,
    /// Second 0..=59.
    pub second: u8,
}

impl CalendarDateTime {
    /// ISO weekday: Monday = 1 .. Sunday = 7.
    ///
    /// Sakamoto's method, valid for Gregorian dates.
    #[must_use]
    pub fn iso_weekday(&self) -> u8 {
        const T: [u16; 12] = [0, 3, 2, 5, 0, 3, 5, 1, 4, 6, 2, 4];
        let y = if self.month < 3 {
            u32::from(self.year) - 1
        } else {
            u32::from(self.year)
        };
        let idx = usize::from(self.month - 1).min(11);
        let dow = (y + y / 4 - y / 100 + y / 400 + u32::from(T[idx]) + u32::from(self.day)) % 7;
        if dow == 0 {
            7
        } else {
            #[allow(clippy::cast_possible_truncation)] // dow is 1..=6 here
            {
                dow as u8
            }
        }
    }

    /// Seconds elapsed since Monday 00:00:00 of the current week.
    #[must_use]
    pub fn seconds_into_week(&self) -> u32 {
        u32::from(self.iso_weekday() - 1) * 86_400
            + u32::from(self.hour) * 3_600
            + u32::from(self.minute) * 60
            + u32::from(self.second)
    }
}

/// Calendar time source (DS3231 on hardware, mock on the host).
///
/// Only three operations are consumed: read, write and the "oscillator
/// stopped" validity check. Everything else the chip offers is ignored.
pub trait TimeSource {
    /// Error type
    type Error: core::fmt::Debug;

    /// Read the current calendar time.
    fn now(&mut self)
        -> impl core::future::Future<Output = Result<CalendarDateTime, Self::Error>>;

    /// Write the calendar time and mark the oscillator as valid.
    fn set(
        &mut self,
        dt: &CalendarDateTime,
    ) -> impl core::future::Future<Output = Result<(), Self::Error>>;

    /// `true` when the oscillator has stopped since the time was last set,
    /// meaning the current reading cannot be trusted.
    fn oscillator_stopped(&mut self) -> impl core::future::Future<Output = Result<bool, Self::Error>>;
}
