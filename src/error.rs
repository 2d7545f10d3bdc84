use std::io;

/// Errors surfaced by a protocol session.
///
/// Only link-level and caller-contract problems are errors. A device that is
/// reachable but stays silent or replies incoherently is *not* an error: the
/// session reports that as an absent response (`Ok(None)`) and the caller
/// decides whether to resend.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The address string is neither `tcp:<host>:<port>` nor usable as a
    /// serial device path.
    #[error("invalid address '{0}', expected tcp:<host>:<port> or a serial device path")]
    InvalidAddress(String),

    /// Opening or configuring the transport failed.
    #[error("failed to open '{address}': {source}")]
    Connect {
        address: String,
        source: io::Error,
    },

    /// A read or write on the established transport failed.
    #[error("connection failed: {0}")]
    Io(#[from] io::Error),

    /// The peer closed the stream, or the session was used after `close()`.
    #[error("connection closed")]
    ConnectionClosed,

    /// A second command was issued while one was still awaiting its response.
    /// This is caller misuse, not device behavior, and is never retried
    /// internally.
    #[error("cannot send command {requested:#04x} while command {pending:#04x} is pending")]
    CommandPending { pending: u8, requested: u8 },
}

pub type Result<T> = std::result::Result<T, Error>;
