//! Decoder serial frame codec.
//!
//! Every command is one fixed 10-byte frame:
//!
//! ```text
//! [0]  0x7E  start
//! [1]  0xFF  protocol version
//! [2]  0x06  payload length
//! [3]  CMD   opcode
//! [4]  0x00  no-feedback flag (acknowledgments unused)
//! [5]  P1    parameter high / folder
//! [6]  P2    parameter low / track
//! [7]  CSUM  checksum high byte
//! [8]  CSUM  checksum low byte
//! [9]  0xEF  end
//! ```
//!
//! The checksum is the two's complement (mod 65536) of the sum of bytes
//! 1..=6.

/// Total frame length in bytes.
pub const FRAME_LEN: usize = 10;

/// Frame start byte.
pub const START_BYTE: u8 = 0x7E;
/// Protocol version byte.
pub const VERSION_BYTE: u8 = 0xFF;
/// Payload length byte (constant for this protocol).
pub const LENGTH_BYTE: u8 = 0x06;
/// Frame end byte.
pub const END_BYTE: u8 = 0xEF;

/// Maximum decoder volume level.
pub const VOLUME_MAX: u8 = 30;

/// Commands the firmware issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Reset the module (0x3F). Needs a long settle before the next command.
    Reset,
    /// Set the output volume, clamped to 0..=30 (0x06).
    SetVolume(u8),
    /// Play a numbered track from a numbered folder (0x0F).
    PlayFolderTrack {
        /// Folder number 1..=99.
        folder: u8,
        /// Track number 1..=255.
        track: u8,
    },
    /// Stop playback (0x16).
    Stop,
}

impl Command {
    /// The wire opcode for this command.
    pub fn opcode(self) -> u8 {
        match self {
            Command::Reset => 0x3F,
            Command::SetVolume(_) => 0x06,
            Command::PlayFolderTrack { .. } => 0x0F,
            Command::Stop => 0x16,
        }
    }

    /// The two parameter bytes (P1, P2).
    pub fn params(self) -> (u8, u8) {
        match self {
            Command::Reset | Command::Stop => (0, 0),
            Command::SetVolume(level) => (0, level.min(VOLUME_MAX)),
            Command::PlayFolderTrack { folder, track } => (folder, track),
        }
    }
}

/// Encode a command into its 10-byte wire frame.
#[must_use]
pub fn encode_frame(cmd: Command) -> [u8; FRAME_LEN] {
    let (p1, p2) = cmd.params();
    let mut frame = [
        START_BYTE,
        VERSION_BYTE,
        LENGTH_BYTE,
        cmd.opcode(),
        0x00,
        p1,
        p2,
        0,
        0,
        END_BYTE,
    ];
    let sum: u16 = frame[1..7].iter().map(|&b| u16::from(b)).sum();
    let csum = 0u16.wrapping_sub(sum);
    frame[7] = (csum >> 8) as u8;
    frame[8] = (csum & 0xFF) as u8;
    frame
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn play_frame_matches_reference_vector() {
        // PLAY(folder=3, track=7): checksum = -(FF+06+0F+00+03+07) mod 65536
        //                                   = -(0x011E) mod 65536 = 0xFEE2
        let frame = encode_frame(Command::PlayFolderTrack {
            folder: 3,
            track: 7,
        });
        assert_eq!(
            frame,
            [0x7E, 0xFF, 0x06, 0x0F, 0x00, 0x03, 0x07, 0xFE, 0xE2, 0xEF]
        );
    }

    #[test]
    fn reset_frame_opcode_and_framing() {
        let frame = encode_frame(Command::Reset);
        assert_eq!(frame[0], START_BYTE);
        assert_eq!(frame[3], 0x3F);
        assert_eq!(frame[9], END_BYTE);
    }

    #[test]
    fn volume_is_clamped_to_30() {
        let frame = encode_frame(Command::SetVolume(200));
        assert_eq!(frame[6], VOLUME_MAX);
    }

    #[test]
    fn checksum_balances_payload_sum() {
        for cmd in [
            Command::Reset,
            Command::Stop,
            Command::SetVolume(15),
            Command::PlayFolderTrack {
                folder: 99,
                track: 255,
            },
        ] {
            let frame = encode_frame(cmd);
            let sum: u16 = frame[1..7]
                .iter()
                .fold(0u16, |acc, &b| acc.wrapping_add(u16::from(b)));
            let csum = u16::from_be_bytes([frame[7], frame[8]]);
            assert_eq!(
                sum.wrapping_add(csum),
                0,
                "payload + checksum must wrap to zero: {cmd:?}"
            );
        }
    }
}
