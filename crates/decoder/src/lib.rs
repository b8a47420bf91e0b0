//! DFPlayer-class decoder module link — frame codec, command link, busy
//! confirmation protocol.
//!
//! The decoder plays numbered tracks from numbered folders on command over a
//! 9600-baud serial link and exposes one busy line (active-low while
//! playing). The link is strictly fire-and-forget: no acknowledgment bytes
//! are parsed, confirmation is entirely the busy protocol's job.

#![cfg_attr(not(test), no_std)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(async_fn_in_trait)]

pub mod busy;
pub mod frame;
pub mod link;

pub use busy::{wait_busy_low, BusyConfirm, ConfirmPhase, EndOfTrackWatch};
pub use frame::{encode_frame, Command, FRAME_LEN};
pub use link::DecoderLink;
