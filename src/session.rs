//! The protocol session: one full request/response exchange at a time.

use std::io::{Read, Write};
use std::mem;
use std::os::unix::io::{AsRawFd, RawFd};
use std::time::Duration;

use log::debug;

use crate::error::{Error, Result};
use crate::frame;
use crate::packet::{self, Command, Payload, ETX, MAX_PACKET_LEN, UNIT_ADDRESS};
use crate::transport::Transport;

/// How long to wait for the device to finish its reply. Exchanges run at
/// mechanical-actuator speed, so one second is generous but still bounded.
const RESPONSE_TIMEOUT: Duration = Duration::from_secs(1);

/// Raw receive buffer size: worst-case escaping of a maximum-size packet
/// plus the frame delimiters.
const RX_BUF_LEN: usize = 128;

/// A half-duplex protocol session over one exclusively-owned transport.
///
/// A session is either idle or awaiting the response to exactly one command;
/// [`exchange`](Session::exchange) refuses to start a second exchange while
/// one is in flight. All I/O is synchronous and blocking, bounded by a fixed
/// response timeout.
///
/// # Examples
///
/// ```no_run
/// use ptcr::{GetStatus, Session};
///
/// let mut session = Session::connect("tcp:10.0.0.20:10001")?;
/// if let Some(status) = session.exchange(&GetStatus)? {
///     println!("pan {} tilt {}", status.pan, status.tilt);
/// }
/// session.close()?;
/// # Ok::<(), ptcr::Error>(())
/// ```
pub struct Session {
    transport: Option<Transport>,
    pending: Option<u8>,
    rxbuf: [u8; RX_BUF_LEN],
}

impl Session {
    /// Open a session to the device at `address`, either `tcp:<host>:<port>`
    /// or a serial device path.
    pub fn connect<S: ?Sized + AsRef<str>>(address: &S) -> Result<Self> {
        let transport = Transport::connect(address.as_ref(), RESPONSE_TIMEOUT)?;
        Ok(Session {
            transport: Some(transport),
            pending: None,
            rxbuf: [0; RX_BUF_LEN],
        })
    }

    /// Send `command` and wait for its response.
    ///
    /// Returns `Ok(None)` when no coherent response was obtained within the
    /// timeout: the device stayed silent, the frame was malformed, or the
    /// response failed validation. These are ordinary, retriable outcomes;
    /// whether to resend is the caller's decision. Transport failures are
    /// errors and leave the session unusable.
    pub fn exchange<C: Command>(&mut self, command: &C) -> Result<Option<C::Response>> {
        const {
            assert!(packet::packet_len(C::BODY_LEN) < MAX_PACKET_LEN);
            assert!(packet::packet_len(<C::Response as Payload>::BODY_LEN) < MAX_PACKET_LEN);
        }
        if let Some(pending) = self.pending {
            return Err(Error::CommandPending {
                pending,
                requested: C::ID,
            });
        }

        let mut buf = [0u8; MAX_PACKET_LEN];
        let len = packet::encode_command(UNIT_ADDRESS, command, &mut buf);
        let transport = self.transport.as_mut().ok_or(Error::ConnectionClosed)?;
        transport.write_all(&frame::encode(&buf[..len]))?;
        self.pending = Some(C::ID);

        // A transport error below leaves the pending marker set: the session
        // is dead and must not start another exchange.
        let received = self.receive()?;
        self.pending = None;

        let raw = match received {
            Some(len) => &self.rxbuf[..len],
            None => {
                debug!("command {:#04x}: timed out waiting for response", C::ID);
                return Ok(None);
            }
        };
        let payload = match frame::decode(raw) {
            Ok(payload) => payload,
            Err(e) => {
                debug!("command {:#04x}: discarding response, {}", C::ID, e);
                return Ok(None);
            }
        };
        let expected = packet::packet_len(<C::Response as Payload>::BODY_LEN);
        if payload.len() != expected {
            debug!(
                "command {:#04x}: discarding {}-byte response, expected {}",
                C::ID,
                payload.len(),
                expected
            );
            return Ok(None);
        }
        if payload[1] != C::ID {
            debug!(
                "command {:#04x}: discarding response to command {:#04x}",
                C::ID,
                payload[1]
            );
            return Ok(None);
        }
        if packet::lrc(&payload[1..expected - 1]) != payload[expected - 1] {
            debug!("command {:#04x}: discarding response, bad checksum", C::ID);
            return Ok(None);
        }
        Ok(Some(C::Response::decode_body(&payload[2..expected - 1])))
    }

    /// Read one byte at a time until a raw `ETX`, bounded by the response
    /// timeout. Returns the number of buffered bytes including the `ETX`, or
    /// `None` when the timeout elapsed or the frame overran the buffer.
    ///
    /// Byte-at-a-time reads are deliberate: frames are tiny and the device's
    /// response latency dominates.
    fn receive(&mut self) -> Result<Option<usize>> {
        let transport = self.transport.as_mut().ok_or(Error::ConnectionClosed)?;
        let fd = transport.as_raw_fd();
        let mut len = 0;
        while wait_readable(fd, RESPONSE_TIMEOUT)? {
            if len == self.rxbuf.len() {
                debug!("response overran {}-byte buffer", self.rxbuf.len());
                return Ok(None);
            }
            let mut byte = [0u8; 1];
            if transport.read(&mut byte)? == 0 {
                return Err(Error::ConnectionClosed);
            }
            self.rxbuf[len] = byte[0];
            len += 1;
            if byte[0] == ETX {
                return Ok(Some(len));
            }
        }
        Ok(None)
    }

    /// Close the session, terminating all further I/O. Every later call on
    /// this session fails fast with a connection-closed error.
    pub fn close(&mut self) -> Result<()> {
        match self.transport.take() {
            Some(mut transport) => transport.shutdown(),
            None => Ok(()),
        }
    }
}

/// Wait for the descriptor to become readable, bounded by `timeout`.
fn wait_readable(fd: RawFd, timeout: Duration) -> Result<bool> {
    use libc::{fd_set, select, timeval, EINTR, FD_ISSET, FD_SET, FD_ZERO};

    let mut timeout = timeval {
        tv_sec: timeout.as_secs() as _,
        tv_usec: timeout.subsec_micros() as _,
    };

    unsafe {
        let mut readfds = mem::MaybeUninit::<fd_set>::uninit();
        loop {
            FD_ZERO(readfds.as_mut_ptr());
            FD_SET(fd, readfds.as_mut_ptr());
            let ret = select(
                fd + 1,
                readfds.as_mut_ptr(),
                std::ptr::null_mut(),
                std::ptr::null_mut(),
                &mut timeout,
            );
            if ret < 0 {
                let err = std::io::Error::last_os_error();
                if err.raw_os_error() == Some(EINTR) {
                    continue;
                }
                return Err(err.into());
            }
            return Ok(FD_ISSET(fd, readfds.as_mut_ptr()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::GetStatus;
    use std::net::TcpListener;

    fn loopback_session() -> (Session, std::net::TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let session = Session::connect(&format!("tcp:127.0.0.1:{}", addr.port())).unwrap();
        let (peer, _) = listener.accept().unwrap();
        (session, peer)
    }

    #[test]
    fn second_send_while_pending_is_a_contract_violation() {
        let (mut session, _peer) = loopback_session();
        session.pending = Some(0x33);
        match session.exchange(&GetStatus) {
            Err(Error::CommandPending { pending, requested }) => {
                assert_eq!(pending, 0x33);
                assert_eq!(requested, 0x31);
            }
            other => panic!("expected CommandPending, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn exchange_after_close_fails_fast() {
        let (mut session, _peer) = loopback_session();
        session.close().unwrap();
        assert!(matches!(
            session.exchange(&GetStatus),
            Err(Error::ConnectionClosed)
        ));
        // A second close is a no-op.
        session.close().unwrap();
    }

    #[test]
    fn peer_eof_is_a_connection_error_and_leaves_the_marker_set() {
        let (mut session, peer) = loopback_session();
        peer.shutdown(std::net::Shutdown::Write).unwrap();
        assert!(matches!(
            session.exchange(&GetStatus),
            Err(Error::ConnectionClosed)
        ));
        assert!(matches!(
            session.exchange(&GetStatus),
            Err(Error::CommandPending { .. })
        ));
    }
}
