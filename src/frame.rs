//! Framing codec: escaping and unescaping a packet between frame delimiters.
//!
//! Wire format is `STX <escaped packet bytes> ETX`. Inside the frame, any of
//! the five reserved control bytes is replaced by `ESC` followed by the byte
//! with its high bit set, so the only unescaped `ETX` on the wire is the
//! frame terminator.

use crate::packet::{ACK, ESC, ETX, NAK, STX};

/// A received byte sequence that does not unescape to a packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    /// The decoded payload does not lead with `ACK` or `NAK`.
    #[error("frame does not lead with ACK or NAK")]
    BadLeader,
    /// The input ended before an unescaped `ETX`.
    #[error("frame not terminated by ETX")]
    Unterminated,
}

const fn build_escape_table() -> [bool; 256] {
    let mut table = [false; 256];
    table[ACK as usize] = true;
    table[NAK as usize] = true;
    table[STX as usize] = true;
    table[ETX as usize] = true;
    table[ESC as usize] = true;
    table
}

/// Which byte values must be escaped inside a frame.
static ESCAPED: [bool; 256] = build_escape_table();

/// Encode a packet into its on-wire frame.
///
/// Total over any payload; no byte sequence fails to encode.
pub fn encode(payload: &[u8]) -> Vec<u8> {
    let mut frame = Vec::with_capacity(2 + 2 * payload.len());
    frame.push(STX);
    for &byte in payload {
        if ESCAPED[byte as usize] {
            frame.push(ESC);
            frame.push(byte | 0x80);
        } else {
            frame.push(byte);
        }
    }
    frame.push(ETX);
    frame
}

/// Decode raw received bytes back into a packet.
///
/// A leading `STX` is tolerated but not required: the device leads its
/// replies with a bare `ACK`/`NAK`, while frames produced by [`encode`] open
/// with `STX`. Scanning stops at the first unescaped `ETX`; a byte following
/// `ESC` is data with its high bit cleared. The decoded packet must lead
/// with `ACK` or `NAK`.
pub fn decode(raw: &[u8]) -> Result<Vec<u8>, FrameError> {
    let raw = match raw.first() {
        Some(&STX) => &raw[1..],
        _ => raw,
    };
    let mut payload = Vec::with_capacity(raw.len());
    let mut bytes = raw.iter();
    loop {
        match bytes.next() {
            None => return Err(FrameError::Unterminated),
            Some(&ETX) => break,
            Some(&ESC) => {
                let byte = bytes.next().ok_or(FrameError::Unterminated)?;
                payload.push(byte & 0x7f);
            }
            Some(&byte) => payload.push(byte),
        }
    }
    match payload.first() {
        Some(&ACK) | Some(&NAK) => Ok(payload),
        _ => Err(FrameError::BadLeader),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const RESERVED: [u8; 5] = [ACK, NAK, STX, ETX, ESC];

    #[test]
    fn encode_plain_bytes_pass_through() {
        assert_eq!(encode(&[0x40, 0x41]), vec![STX, 0x40, 0x41, ETX]);
    }

    #[test]
    fn encode_escapes_every_reserved_byte() {
        let frame = encode(&RESERVED);
        assert_eq!(
            frame,
            vec![
                STX,
                ESC,
                ACK | 0x80,
                ESC,
                NAK | 0x80,
                ESC,
                STX | 0x80,
                ESC,
                ETX | 0x80,
                ESC,
                ESC | 0x80,
                ETX,
            ]
        );
        // Payload length + one marker per reserved byte + the two delimiters.
        assert_eq!(frame.len(), RESERVED.len() * 2 + 2);
    }

    #[test]
    fn encode_leaves_no_unescaped_reserved_bytes() {
        let payload: Vec<u8> = (0u8..=255).collect();
        let frame = encode(&payload);
        let mut i = 1;
        while i < frame.len() - 1 {
            if frame[i] == ESC {
                // An escape pair; the stuffed byte has its high bit set.
                assert_ne!(frame[i + 1] & 0x80, 0);
                i += 2;
            } else {
                assert!(!ESCAPED[frame[i] as usize], "unescaped byte at {i}");
                i += 1;
            }
        }
    }

    #[test]
    fn decode_rejects_bad_leader() {
        assert_eq!(decode(&[0x00, 0x31, 0x31, ETX]), Err(FrameError::BadLeader));
    }

    #[test]
    fn decode_rejects_missing_etx() {
        assert_eq!(decode(&[ACK, 0x31, 0x31]), Err(FrameError::Unterminated));
        // ESC as the very last byte swallows nothing.
        assert_eq!(decode(&[ACK, 0x31, ESC]), Err(FrameError::Unterminated));
    }

    #[test]
    fn decode_accepts_bare_device_reply() {
        // Replies lead with an unescaped ACK and no STX.
        assert_eq!(decode(&[ACK, 0x31, 0x31, ETX]), Ok(vec![ACK, 0x31, 0x31]));
    }

    #[test]
    fn escaped_etx_is_data_not_terminator() {
        let raw = [ACK, ESC, ETX | 0x80, 0x44, ETX];
        assert_eq!(decode(&raw), Ok(vec![ACK, ETX, 0x44]));
    }

    proptest! {
        // Round-trip law over payloads that lead like a device reply and
        // contain every reserved control byte at least once.
        #[test]
        fn roundtrip(leader in prop::sample::select(vec![ACK, NAK]),
                     body in prop::collection::vec(any::<u8>(), 0..58)) {
            let mut payload = vec![leader];
            payload.extend_from_slice(&body);
            payload.extend_from_slice(&RESERVED);
            prop_assert!(payload.len() <= 64);
            prop_assert_eq!(decode(&encode(&payload)), Ok(payload));
        }
    }
}
