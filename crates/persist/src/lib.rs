//! Playback state persistence — position model, primary text record,
//! secondary EEPROM record, and the dual-tier persistence manager.
//!
//! Two independent stores survive power loss:
//!
//! - **Primary**: a one-line text file, overwritten on every state change.
//!   Authoritative whenever it parses.
//! - **Secondary**: a fixed 20-byte checksummed record in EEPROM, written at
//!   most once per minute to limit wear. Corruption reads as "absent",
//!   never as an error.

#![cfg_attr(not(test), no_std)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(async_fn_in_trait)]

pub mod position;
pub mod primary;
pub mod record;
pub mod store;

pub use position::{KnownTracks, PlaybackPosition, MAX_ALBUM};
pub use record::{checksum16, SecondaryRecord, FLAG_TIME_SOURCE_SET};
pub use store::{PersistManager, PRIMARY_STATE_PATH, SECONDARY_STATE_ADDR};
