//! # Mako Protocol Constants and Types
//!
//! Wire definitions for the RC car's UDP command protocol.
//!
//! Each datagram carries one packet of raw bytes. For logging, packets are
//! rendered as lowercase two-digit hex separated by single spaces.
//!
//! ```text
//! c0 a8 01 01 00 00 04 21 e6 00 80
//! |---------| |---| |---| |------|
//!  header     rsvd  class  fwd rev steer
//! ```

/// Total command packet length in bytes
pub const COMMAND_PACKET_LEN: usize = 11;

/// Reserved sequence bytes following the header
pub const RESERVED_SEQUENCE: [u8; 2] = [0x00, 0x00];

/// Command class tag for drive commands
pub const COMMAND_CLASS_DRIVE: [u8; 2] = [0x04, 0x21];

/// Handshake token: ASCII `MAKO_CONNECT` (12 bytes)
pub const CONNECT_TOKEN: &[u8; 12] = b"MAKO_CONNECT";

/// Throttle byte meaning "no throttle"
pub const IDLE_THROTTLE: u8 = 0x00;

/// Centre value, also the zero point of every mapped axis
pub const CENTER_BYTE: u8 = 0x80;

/// Fixed low anchor every negative input is compressed toward
pub const NEGATIVE_ANCHOR: u8 = 0x2e;

/// Forward byte output range
pub const FORWARD_OUTPUT_MIN: u8 = 45;
pub const FORWARD_OUTPUT_MAX: u8 = 230;

/// Reverse byte output range
pub const REVERSE_OUTPUT_MIN: u8 = 42;
pub const REVERSE_OUTPUT_MAX: u8 = 230;

/// Steering byte output range
pub const STEERING_OUTPUT_MIN: u8 = 46;
pub const STEERING_OUTPUT_MAX: u8 = 210;

/// Four destination bytes at the start of every command packet.
///
/// The firmware expects two variants: drive commands streamed every tick use
/// [`PacketHeader::STREAM`], while the arming and shutdown idle packets use
/// [`PacketHeader::CONTROL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketHeader(pub [u8; 4]);

impl PacketHeader {
    /// Header of per-tick drive commands (192.168.1.1)
    pub const STREAM: PacketHeader = PacketHeader([0xc0, 0xa8, 0x01, 0x01]);

    /// Header of arming and idle packets (192.168.0.1)
    pub const CONTROL: PacketHeader = PacketHeader([0xc0, 0xa8, 0x00, 0x01]);

    /// Raw header bytes
    #[must_use]
    pub fn bytes(&self) -> [u8; 4] {
        self.0
    }
}

/// Renders bytes as lowercase hex pairs separated by single spaces.
///
/// # Examples
///
/// ```
/// use mako_bridge::mako::protocol::format_hex;
///
/// assert_eq!(format_hex(&[0xc0, 0xa8, 0x0f]), "c0 a8 0f");
/// assert_eq!(format_hex(&[]), "");
/// ```
#[must_use]
pub fn format_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_token_spelling() {
        assert_eq!(CONNECT_TOKEN.len(), 12);
        assert_eq!(
            format_hex(CONNECT_TOKEN),
            "4d 41 4b 4f 5f 43 4f 4e 4e 45 43 54"
        );
    }

    #[test]
    fn test_headers() {
        assert_eq!(format_hex(&PacketHeader::STREAM.bytes()), "c0 a8 01 01");
        assert_eq!(format_hex(&PacketHeader::CONTROL.bytes()), "c0 a8 00 01");
    }

    #[test]
    fn test_packet_layout_adds_up() {
        assert_eq!(
            4 + RESERVED_SEQUENCE.len() + COMMAND_CLASS_DRIVE.len() + 3,
            COMMAND_PACKET_LEN
        );
    }

    #[test]
    fn test_format_hex_pads_and_lowercases() {
        assert_eq!(format_hex(&[0x00, 0x0A, 0xFF]), "00 0a ff");
    }
}
