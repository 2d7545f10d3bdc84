//! Byte-stream transport to the device: a TCP socket or a local serial line.

use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::os::unix::io::{AsRawFd, RawFd};
use std::str::FromStr;
use std::time::Duration;

use serialport::{DataBits, Parity, StopBits, TTYPort};

use crate::error::{Error, Result};

/// A parsed device address.
///
/// `tcp:<host>:<port>` selects a TCP transport; any other string is taken as
/// a local serial device path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Address {
    Tcp { host: String, port: u16 },
    Serial(String),
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.strip_prefix("tcp:") {
            Some(rest) => {
                let (host, port) = rest
                    .split_once(':')
                    .ok_or_else(|| Error::InvalidAddress(s.into()))?;
                let port = port
                    .parse::<u16>()
                    .map_err(|_| Error::InvalidAddress(s.into()))?;
                if host.is_empty() {
                    return Err(Error::InvalidAddress(s.into()));
                }
                Ok(Address::Tcp {
                    host: host.into(),
                    port,
                })
            }
            None => Ok(Address::Serial(s.into())),
        }
    }
}

/// An open byte-stream endpoint. Owns the underlying OS resource exclusively;
/// dropping it closes the descriptor.
#[derive(Debug)]
pub enum Transport {
    Tcp(TcpStream),
    Serial(TTYPort),
}

impl Transport {
    /// Open the endpoint described by `address`.
    ///
    /// TCP connections are opened with no-delay so each command frame goes
    /// out immediately. Serial lines are configured 8N1 at 9600 baud (the
    /// unit autobauds against the first frame byte) with reads bounded by
    /// `read_timeout`.
    pub fn connect(address: &str, read_timeout: Duration) -> Result<Self> {
        let connect_err = |e: io::Error| Error::Connect {
            address: address.into(),
            source: e,
        };
        match address.parse::<Address>()? {
            Address::Tcp { host, port } => {
                let stream = TcpStream::connect((host.as_str(), port)).map_err(connect_err)?;
                stream.set_nodelay(true).map_err(connect_err)?;
                Ok(Transport::Tcp(stream))
            }
            Address::Serial(path) => {
                let port = serialport::new(path, 9600)
                    .data_bits(DataBits::Eight)
                    .parity(Parity::None)
                    .stop_bits(StopBits::One)
                    .timeout(read_timeout)
                    .open_native()
                    .map_err(|e| connect_err(e.into()))?;
                Ok(Transport::Serial(port))
            }
        }
    }

    /// Shut down the stream. For TCP this terminates both directions; a
    /// serial line is closed when the transport is dropped.
    pub fn shutdown(&mut self) -> Result<()> {
        match self {
            Transport::Tcp(stream) => stream.shutdown(Shutdown::Both).map_err(Error::Io),
            Transport::Serial(_) => Ok(()),
        }
    }
}

impl Read for Transport {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Transport::Tcp(stream) => stream.read(buf),
            Transport::Serial(port) => port.read(buf),
        }
    }
}

impl Write for Transport {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Transport::Tcp(stream) => stream.write(buf),
            Transport::Serial(port) => port.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Transport::Tcp(stream) => stream.flush(),
            Transport::Serial(port) => port.flush(),
        }
    }
}

impl AsRawFd for Transport {
    fn as_raw_fd(&self) -> RawFd {
        match self {
            Transport::Tcp(stream) => stream.as_raw_fd(),
            Transport::Serial(port) => port.as_raw_fd(),
        }
    }
}
