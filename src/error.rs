use std::array::TryFromSliceError;
use std::io;
use std::net::AddrParseError;
use std::str::Utf8Error;

use thiserror::Error;
use tokio::time::error::Elapsed;

use crate::packet::Opcode;

/// Any error raised while querying a SA-MP server.
///
/// Every variant is terminal for the request that raised it; retrying is
/// left to the caller.
#[derive(Debug, Error)]
pub enum SampQueryError {
    /// The configured server address is not a dotted-quad IPv4 address.
    #[error("invalid IPv4 address: {0}")]
    InvalidAddress(#[from] AddrParseError),

    /// Could not bind a local UDP socket.
    #[error("failed binding local socket: {0}")]
    FailedPortBind(io::Error),

    /// Could not connect the socket toward the server.
    #[error("unreachable host: {0}")]
    UnreachableHost(io::Error),

    #[error("failed sending request: {0}")]
    SendError(io::Error),

    #[error("failed receiving response: {0}")]
    ReceiveError(io::Error),

    /// The server did not answer within the configured deadline.
    #[error("no response within the deadline: {0}")]
    TimedOut(#[from] Elapsed),

    /// The response is shorter than the fixed 11 byte header.
    #[error("response of {0} byte(s) is shorter than the 11 byte header")]
    TruncatedHeader(usize),

    /// The response does not start with the `SAMP` marker.
    #[error("bad packet marker: {0:?}")]
    InvalidMagic([u8; 4]),

    /// The opcode byte is not one of `i r c d p x`.
    #[error("unknown opcode: {0:#04x}")]
    UnknownOpcode(u8),

    /// The response answers a different query kind than the one sent.
    #[error("expected opcode {expected:?}, got {got:?}")]
    OpcodeMismatch { expected: Opcode, got: Opcode },

    /// A length field points past the end of the buffer.
    #[error("malformed packet: wanted {wanted} byte(s) at offset {offset}, buffer holds {len}")]
    MalformedPacket {
        offset: usize,
        wanted: usize,
        len: usize,
    },

    /// A text field is not valid UTF-8.
    #[error("malformed text field: {0}")]
    MalformedText(#[from] Utf8Error),

    #[error("malformed field: {0}")]
    MalformedSlice(#[from] TryFromSliceError),
}
