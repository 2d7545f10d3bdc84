//! Packet layout shared by every command and response.
//!
//! A packet is the unescaped payload handed to the framing codec:
//!
//! - leader (1 byte): unit address on the command side, `ACK` or `NAK` on
//!   the response side
//! - id (1 byte): command identifier
//! - body (fixed per command kind)
//! - lrc (1 byte): XOR of id and body
//!
//! The frame delimiters (`STX`/`ETX`) around a packet belong to the codec,
//! not to the packet.

/// Start of frame.
pub const STX: u8 = 0x02;
/// End of frame. Also the terminator scanned for on the receive side.
pub const ETX: u8 = 0x03;
/// Leader of a response to an accepted command.
pub const ACK: u8 = 0x06;
/// Leader of a response to a rejected command.
pub const NAK: u8 = 0x15;
/// Escape marker; the following byte carries its high bit set.
pub const ESC: u8 = 0x1b;

/// Unit address on a point-to-point link. Non-zero addresses are only used on
/// daisy-chained RS-485 installations, which this crate does not target.
pub const UNIT_ADDRESS: u8 = 0;

/// Upper bound on the size of any command or response packet. The session's
/// fixed transmit and receive buffers are sized from this.
pub const MAX_PACKET_LEN: usize = 64;

/// Number of packet bytes around the body: leader, id and lrc.
pub const fn packet_len(body_len: usize) -> usize {
    body_len + 3
}

/// Longitudinal redundancy check: XOR over id and body.
pub fn lrc(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0, |acc, b| acc ^ b)
}

/// A fixed-size binary body carried inside a packet.
pub trait Payload: Sized {
    /// Body length in bytes. Every value of the type encodes to exactly this
    /// many bytes.
    const BODY_LEN: usize;

    /// Write the body into `buf`, which is exactly `BODY_LEN` bytes.
    fn encode_body(&self, buf: &mut [u8]);

    /// Read the body back out of `buf`, which is exactly `BODY_LEN` bytes.
    fn decode_body(buf: &[u8]) -> Self;
}

/// A command kind: a stable identifier plus the response kind the device
/// answers it with.
pub trait Command: Payload {
    /// Command identifier, echoed back in the response header.
    const ID: u8;

    /// The response statically paired with this command.
    type Response: Payload;
}

/// Serialize a command packet into `buf` and return its length.
///
/// `buf` must hold at least `packet_len(C::BODY_LEN)` bytes; the session
/// guarantees this through the [`MAX_PACKET_LEN`] bound.
pub fn encode_command<C: Command>(address: u8, command: &C, buf: &mut [u8]) -> usize {
    let len = packet_len(C::BODY_LEN);
    buf[0] = address;
    buf[1] = C::ID;
    command.encode_body(&mut buf[2..len - 1]);
    buf[len - 1] = lrc(&buf[1..len - 1]);
    len
}
