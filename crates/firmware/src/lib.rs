//! OTR radio firmware.
//!
//! Drives a cabinet radio that plays a simulated AM station: an RP2040
//! renders a short intro jingle on a PWM pin while a serial audio-decoder
//! module fades in the scheduled track, so the two appear to start
//! together. Position tracks a weekly schedule and survives power loss in
//! two persistence tiers.
//!
//! # Architecture
//!
//! ```text
//! control loop (control.rs)
//!     ├── navigation  — button gestures over known-track bounds
//!     ├── player      — decoder link + busy confirmation
//!     ├── playback    — jingle engine, fade-in, pot volume
//!     ├── schedule    — weekly alignment
//!     └── persist     — primary file + EEPROM record
//! ```
//!
//! # Features
//!
//! - `hardware` - Build for the RP2040 target (embassy-rp, defmt)
//! - `emulator` - Build for desktop testing (tokio, tracing)
//! - `std` - Enable the standard library (emulator and tests)

#![cfg_attr(all(not(test), not(feature = "std")), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::await_holding_lock)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::print_stdout)]
#![warn(clippy::dbg_macro)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::doc_markdown)]

pub(crate) mod fmt;

pub mod boot;
pub mod config;
pub mod control;
pub mod navigation;
pub mod player;

pub use boot::{establish_clock, parse_set_command, reconcile_state, ClockStatus, LoadedState};
pub use control::Radio;
pub use navigation::{ButtonEvent, Navigation, PlayAttempt, TapClassifier};
pub use player::RadioPlayer;
