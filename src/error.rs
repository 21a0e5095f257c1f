//! Our error types for the Array 371X electronic loads.

use thiserror::Error;

pub type Result<T, I> = core::result::Result<T, Error<I>>;

/// Errors raised while building or parsing the fixed 26-byte frames.
///
/// These are pure codec failures with no dependency on the serial interface,
/// so they can be matched on without naming the interface error type.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// Device addresses run 0x00-0xFE; 0xFF is reserved.
    #[error("invalid device address {0:#04x}")]
    InvalidAddress(u8),
    /// Fewer bytes than a full frame were available for decoding.
    #[error("short frame: expected {expected} bytes, got {actual}")]
    ShortRead { expected: usize, actual: usize },
    /// Frame did not begin with the 0xAA start byte.
    #[error("bad start byte {0:#04x}")]
    BadStartByte(u8),
    /// Frame carried a command byte other than the one being decoded.
    #[error("bad command byte: expected {expected:#04x}, got {actual:#04x}")]
    BadCommandByte { expected: u8, actual: u8 },
    /// Trailing checksum did not match the modulo-256 sum of the frame body.
    #[error("checksum mismatch: computed {computed:#04x}, frame carried {received:#04x}")]
    ChecksumMismatch { computed: u8, received: u8 },
    /// Set frame carried a type byte outside 1-3.
    #[error("unknown setpoint kind {0:#04x}")]
    UnknownSetpointKind(u8),
}

/// Custom error type for Array 371X communications.
#[derive(Error, Debug)]
pub enum Error<I: embedded_io::Error> {
    /// The underlying serial interface failed on write, or on read with
    /// something other than a timeout.
    #[error("serial communication error")]
    Serial(I),
    #[error(transparent)]
    Frame(#[from] FrameError),
    /// The device returned nothing within the interface read timeout.
    #[error("communication timeout")]
    Timeout,
}
