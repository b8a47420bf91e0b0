//! Hardware Abstraction Layer (HAL) for the otr-radio firmware
//!
//! This crate provides trait-based abstractions for every peripheral the
//! radio core consumes, enabling development and testing without physical
//! hardware.
//!
//! # Architecture Layers
//!
//! ```text
//! Application Layer (firmware crate)
//!         ↓
//! Feature Layers (decoder, schedule, persist, playback)
//!         ↓
//! Platform HAL (this crate - trait abstractions)
//!         ↓
//! Hardware Layer (Embassy HAL + PAC)
//! ```
//!
//! # Abstractions
//!
//! - [`DecoderPort`] - serial link to the DFPlayer-class decoder module
//! - [`DigitalIn`] / [`PwmLevelOut`] - busy/button/power-sense lines, PWM audio out
//! - [`AnalogIn`] - volume potentiometer
//! - [`TimeSource`] - calendar time at 1-second resolution (DS3231)
//! - [`NonvolatileStore`] - 16-bit-addressed byte store (AT24C32 EEPROM)
//! - [`Storage`] - file access for the schedule, state file and intro asset
//! - [`LineConsole`] - line-oriented channel for the RTC bootstrap command
//!
//! # Features
//!
//! - `std`: expose the [`mocks`] module outside of `cfg(test)`
//! - `defmt`: enable defmt::Format derives on platform types

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(unused_must_use)]
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::doc_markdown)] // hex addresses and register names in doc comments
#![allow(clippy::must_use_candidate)] // hardware accessors — callers decide
#![allow(clippy::missing_errors_doc)]
#![allow(async_fn_in_trait)] // Embassy no_std: single-threaded, Send bounds not needed

pub mod analog;
pub mod console;
pub mod ds3231;
pub mod eeprom;
pub mod gpio;
pub mod rtc;
pub mod serial;
pub mod storage;

pub mod mocks;

// Re-export main traits
pub use analog::AnalogIn;
pub use console::LineConsole;
pub use eeprom::NonvolatileStore;
pub use gpio::{DigitalIn, PwmLevelOut};
pub use rtc::{CalendarDateTime, TimeSource};
pub use serial::DecoderPort;
pub use storage::Storage;

// Concrete I2C drivers
pub use ds3231::Ds3231;
pub use eeprom::At24c32;
