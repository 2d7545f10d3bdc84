//! The command catalogue.
//!
//! Each command is a plain struct implementing [`Command`], statically paired
//! with the response the device answers it with. Angles are signed 16-bit
//! little-endian words in tenths of a degree.

use static_assertions::const_assert;

use crate::packet::{packet_len, Command, Payload, MAX_PACKET_LEN};

fn get_i16_le(buf: &[u8], at: usize) -> i16 {
    i16::from_le_bytes([buf[at], buf[at + 1]])
}

/// Query the current position and status. Does not move the unit.
#[derive(Debug, Clone, Copy, Default)]
pub struct GetStatus;

impl Payload for GetStatus {
    const BODY_LEN: usize = 0;

    fn encode_body(&self, _buf: &mut [u8]) {}

    fn decode_body(_buf: &[u8]) -> Self {
        GetStatus
    }
}

impl Command for GetStatus {
    const ID: u8 = 0x31;
    type Response = Status;
}

/// Move to an absolute pan/tilt position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveTo {
    /// Target pan angle in tenths of a degree.
    pub pan: i16,
    /// Target tilt angle in tenths of a degree.
    pub tilt: i16,
}

impl Payload for MoveTo {
    const BODY_LEN: usize = 4;

    fn encode_body(&self, buf: &mut [u8]) {
        buf[0..2].copy_from_slice(&self.pan.to_le_bytes());
        buf[2..4].copy_from_slice(&self.tilt.to_le_bytes());
    }

    fn decode_body(buf: &[u8]) -> Self {
        MoveTo {
            pan: get_i16_le(buf, 0),
            tilt: get_i16_le(buf, 2),
        }
    }
}

impl Command for MoveTo {
    const ID: u8 = 0x33;
    type Response = Status;
}

/// Move by a pan/tilt offset relative to the current position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveToDelta {
    /// Pan offset in tenths of a degree.
    pub pan: i16,
    /// Tilt offset in tenths of a degree.
    pub tilt: i16,
}

impl Payload for MoveToDelta {
    const BODY_LEN: usize = 4;

    fn encode_body(&self, buf: &mut [u8]) {
        buf[0..2].copy_from_slice(&self.pan.to_le_bytes());
        buf[2..4].copy_from_slice(&self.tilt.to_le_bytes());
    }

    fn decode_body(buf: &[u8]) -> Self {
        MoveToDelta {
            pan: get_i16_le(buf, 0),
            tilt: get_i16_le(buf, 2),
        }
    }
}

impl Command for MoveToDelta {
    const ID: u8 = 0x34;
    type Response = Status;
}

/// Query the configured soft travel limits. Does not move the unit.
#[derive(Debug, Clone, Copy, Default)]
pub struct GetLimits;

impl Payload for GetLimits {
    const BODY_LEN: usize = 0;

    fn encode_body(&self, _buf: &mut [u8]) {}

    fn decode_body(_buf: &[u8]) -> Self {
        GetLimits
    }
}

impl Command for GetLimits {
    const ID: u8 = 0x35;
    type Response = Limits;
}

/// Replace the soft travel limits. The unit answers with the limits now in
/// effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetLimits {
    /// Lowest allowed pan angle in tenths of a degree.
    pub pan_min: i16,
    /// Highest allowed pan angle in tenths of a degree.
    pub pan_max: i16,
    /// Lowest allowed tilt angle in tenths of a degree.
    pub tilt_min: i16,
    /// Highest allowed tilt angle in tenths of a degree.
    pub tilt_max: i16,
}

impl Payload for SetLimits {
    const BODY_LEN: usize = 8;

    fn encode_body(&self, buf: &mut [u8]) {
        buf[0..2].copy_from_slice(&self.pan_min.to_le_bytes());
        buf[2..4].copy_from_slice(&self.pan_max.to_le_bytes());
        buf[4..6].copy_from_slice(&self.tilt_min.to_le_bytes());
        buf[6..8].copy_from_slice(&self.tilt_max.to_le_bytes());
    }

    fn decode_body(buf: &[u8]) -> Self {
        SetLimits {
            pan_min: get_i16_le(buf, 0),
            pan_max: get_i16_le(buf, 2),
            tilt_min: get_i16_le(buf, 4),
            tilt_max: get_i16_le(buf, 6),
        }
    }
}

impl Command for SetLimits {
    const ID: u8 = 0x36;
    type Response = Limits;
}

/// The soft travel limits in effect, the response to the limit commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Lowest allowed pan angle in tenths of a degree.
    pub pan_min: i16,
    /// Highest allowed pan angle in tenths of a degree.
    pub pan_max: i16,
    /// Lowest allowed tilt angle in tenths of a degree.
    pub tilt_min: i16,
    /// Highest allowed tilt angle in tenths of a degree.
    pub tilt_max: i16,
}

impl Payload for Limits {
    const BODY_LEN: usize = 8;

    fn encode_body(&self, buf: &mut [u8]) {
        buf[0..2].copy_from_slice(&self.pan_min.to_le_bytes());
        buf[2..4].copy_from_slice(&self.pan_max.to_le_bytes());
        buf[4..6].copy_from_slice(&self.tilt_min.to_le_bytes());
        buf[6..8].copy_from_slice(&self.tilt_max.to_le_bytes());
    }

    fn decode_body(buf: &[u8]) -> Self {
        Limits {
            pan_min: get_i16_le(buf, 0),
            pan_max: get_i16_le(buf, 2),
            tilt_min: get_i16_le(buf, 4),
            tilt_max: get_i16_le(buf, 6),
        }
    }
}

/// Switch the power state of the two camera channels. The unit answers with
/// the states now in effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetCamera {
    /// Control flags for the first camera channel.
    pub camera1: u8,
    /// Control flags for the second camera channel.
    pub camera2: u8,
}

impl Payload for SetCamera {
    const BODY_LEN: usize = 2;

    fn encode_body(&self, buf: &mut [u8]) {
        buf[0] = self.camera1;
        buf[1] = self.camera2;
    }

    fn decode_body(buf: &[u8]) -> Self {
        SetCamera {
            camera1: buf[0],
            camera2: buf[1],
        }
    }
}

impl Command for SetCamera {
    const ID: u8 = 0x41;
    type Response = CameraStatus;
}

/// The camera channel states in effect, the response to [`SetCamera`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraStatus {
    /// Status flags of the first camera channel.
    pub camera1: u8,
    /// Status flags of the second camera channel.
    pub camera2: u8,
}

impl Payload for CameraStatus {
    const BODY_LEN: usize = 2;

    fn encode_body(&self, buf: &mut [u8]) {
        buf[0] = self.camera1;
        buf[1] = self.camera2;
    }

    fn decode_body(buf: &[u8]) -> Self {
        CameraStatus {
            camera1: buf[0],
            camera2: buf[1],
        }
    }
}

/// Position and status report, the response to every motion and status
/// command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status {
    /// Current pan angle in tenths of a degree.
    pub pan: i16,
    /// Current tilt angle in tenths of a degree.
    pub tilt: i16,
    /// Pan axis status flags.
    pub pan_status: u8,
    /// Tilt axis status flags.
    pub tilt_status: u8,
    /// General unit status flags.
    pub status: u8,
}

impl Payload for Status {
    const BODY_LEN: usize = 7;

    fn encode_body(&self, buf: &mut [u8]) {
        buf[0..2].copy_from_slice(&self.pan.to_le_bytes());
        buf[2..4].copy_from_slice(&self.tilt.to_le_bytes());
        buf[4] = self.pan_status;
        buf[5] = self.tilt_status;
        buf[6] = self.status;
    }

    fn decode_body(buf: &[u8]) -> Self {
        Status {
            pan: get_i16_le(buf, 0),
            tilt: get_i16_le(buf, 2),
            pan_status: buf[4],
            tilt_status: buf[5],
            status: buf[6],
        }
    }
}

const_assert!(packet_len(GetStatus::BODY_LEN) < MAX_PACKET_LEN);
const_assert!(packet_len(MoveTo::BODY_LEN) < MAX_PACKET_LEN);
const_assert!(packet_len(MoveToDelta::BODY_LEN) < MAX_PACKET_LEN);
const_assert!(packet_len(GetLimits::BODY_LEN) < MAX_PACKET_LEN);
const_assert!(packet_len(SetLimits::BODY_LEN) < MAX_PACKET_LEN);
const_assert!(packet_len(SetCamera::BODY_LEN) < MAX_PACKET_LEN);
const_assert!(packet_len(Status::BODY_LEN) < MAX_PACKET_LEN);
const_assert!(packet_len(Limits::BODY_LEN) < MAX_PACKET_LEN);
const_assert!(packet_len(CameraStatus::BODY_LEN) < MAX_PACKET_LEN);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_body_roundtrip() {
        let status = Status {
            pan: -900,
            tilt: 450,
            pan_status: 0x01,
            tilt_status: 0x00,
            status: 0x80,
        };
        let mut buf = [0u8; Status::BODY_LEN];
        status.encode_body(&mut buf);
        assert_eq!(Status::decode_body(&buf), status);
    }

    #[test]
    fn move_to_body_is_little_endian() {
        let mut buf = [0u8; MoveTo::BODY_LEN];
        MoveTo {
            pan: 0x1234,
            tilt: -2,
        }
        .encode_body(&mut buf);
        assert_eq!(buf, [0x34, 0x12, 0xfe, 0xff]);
    }

    #[test]
    fn limits_body_roundtrip() {
        let limits = Limits {
            pan_min: -1800,
            pan_max: 1800,
            tilt_min: -450,
            tilt_max: 900,
        };
        let mut buf = [0u8; Limits::BODY_LEN];
        limits.encode_body(&mut buf);
        assert_eq!(Limits::decode_body(&buf), limits);
    }

    #[test]
    fn set_limits_body_is_little_endian() {
        let mut buf = [0u8; SetLimits::BODY_LEN];
        SetLimits {
            pan_min: -1800,
            pan_max: 1800,
            tilt_min: -1,
            tilt_max: 0x0102,
        }
        .encode_body(&mut buf);
        assert_eq!(buf, [0xf8, 0xf8, 0x08, 0x07, 0xff, 0xff, 0x02, 0x01]);
    }

    #[test]
    fn camera_body_roundtrip() {
        let camera = SetCamera {
            camera1: 0x01,
            camera2: 0x00,
        };
        let mut buf = [0u8; SetCamera::BODY_LEN];
        camera.encode_body(&mut buf);
        assert_eq!(SetCamera::decode_body(&buf), camera);
    }
}
