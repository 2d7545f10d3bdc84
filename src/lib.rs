//! Client support for the PTCR pan-tilt protocol.
//!
//! PTCR is a point-to-point, half-duplex request/response protocol spoken by
//! pan-tilt positioner units over a serial line or a TCP-attached serial
//! server. Commands and responses are small fixed-size binary packets,
//! byte-stuffed between `STX`/`ETX` delimiters and guarded by an XOR
//! checksum.
//!
//! A [`Session`] owns the transport and runs one exchange at a time: it
//! encodes a command, writes the frame, waits up to one second for the
//! terminated reply, and validates it against the command that was sent. A
//! silent or garbled device yields `Ok(None)` so the caller can decide to
//! resend; only link failures and caller misuse are errors.
//!
//! ```no_run
//! use ptcr::{MoveTo, Session};
//!
//! // "tcp:<host>:<port>" for a serial server, or a device path
//! // such as "/dev/ttyS0".
//! let mut session = Session::connect("tcp:10.0.0.20:10001")?;
//!
//! // Angles are in tenths of a degree.
//! match session.exchange(&MoveTo { pan: 900, tilt: -150 })? {
//!     Some(status) => println!("unit at pan {} tilt {}", status.pan, status.tilt),
//!     None => eprintln!("no response, resend or give up"),
//! }
//! session.close()?;
//! # Ok::<(), ptcr::Error>(())
//! ```
//!
//! New command kinds are added by implementing the [`Command`] trait; the
//! built-in catalogue lives in [`commands`].

pub mod commands;
pub mod frame;
pub mod packet;

mod error;
mod session;
mod transport;

pub use crate::commands::{
    CameraStatus, GetLimits, GetStatus, Limits, MoveTo, MoveToDelta, SetCamera, SetLimits, Status,
};
pub use crate::error::{Error, Result};
pub use crate::packet::{Command, Payload};
pub use crate::session::Session;
pub use crate::transport::{Address, Transport};
