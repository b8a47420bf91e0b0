//! Logging front-end: defmt on hardware, tracing on the desktop emulator,
//! silent otherwise. Format strings must stay in the common subset both
//! back ends accept (plain `{}` placeholders).

#![allow(unused_macros)]

macro_rules! debug {
    ($($arg:tt)*) => {
        {
            #[cfg(feature = "defmt")]
            ::defmt::debug!($($arg)*);
            #[cfg(all(feature = "emulator", not(feature = "defmt")))]
            ::tracing::debug!($($arg)*);
            #[cfg(not(any(feature = "defmt", feature = "emulator")))]
            let _ = crate::fmt::sink!($($arg)*);
        }
    };
}

macro_rules! info {
    ($($arg:tt)*) => {
        {
            #[cfg(feature = "defmt")]
            ::defmt::info!($($arg)*);
            #[cfg(all(feature = "emulator", not(feature = "defmt")))]
            ::tracing::info!($($arg)*);
            #[cfg(not(any(feature = "defmt", feature = "emulator")))]
            let _ = crate::fmt::sink!($($arg)*);
        }
    };
}

macro_rules! warning {
    ($($arg:tt)*) => {
        {
            #[cfg(feature = "defmt")]
            ::defmt::warn!($($arg)*);
            #[cfg(all(feature = "emulator", not(feature = "defmt")))]
            ::tracing::warn!($($arg)*);
            #[cfg(not(any(feature = "defmt", feature = "emulator")))]
            let _ = crate::fmt::sink!($($arg)*);
        }
    };
}

// Evaluates arguments so unused-variable warnings do not depend on features.
macro_rules! sink {
    ($s:literal $(, $x:expr)* $(,)?) => {
        ($( & $x ),*)
    };
}

pub(crate) use {debug, info, sink, warning};
