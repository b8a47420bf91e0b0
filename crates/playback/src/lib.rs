//! Audio playback for the radio: the startup jingle sample engine, the
//! synchronized fade-in that hides the decoder's spin-up, and the
//! potentiometer volume curve.
//!
//! The jingle is rendered sample-by-sample on a PWM pin from a baked-in
//! 8-bit mono WAV asset. Everything here is `no_std` and hardware-free;
//! the firmware crate wires the engine to a real PWM slice and timer
//! interrupt.

#![cfg_attr(not(test), no_std)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![allow(async_fn_in_trait)]

pub mod engine;
pub mod fade;
pub mod volume;
pub mod wav;

pub use engine::{IntroEngine, SILENCE_LEVEL};
pub use fade::{run_fade_in, FadePlan};
pub use volume::{pot_to_volume, PotVolume};
pub use wav::{MalformedWav, WavAsset};
