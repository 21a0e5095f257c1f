//! Frame codec for the Array 371X binary command protocol.
//!
//! Every command and response on the wire is a fixed 26-byte frame: a `0xAA`
//! start byte, the device address, a command byte, a command-specific payload
//! with little-endian multi-byte fields, zero padding out to byte 24, and a
//! trailing checksum equal to the sum of the first 25 bytes modulo 256.
//!
//! This module is pure transformation; all I/O lives in
//! [`ElectronicLoad`](crate::load::ElectronicLoad).

use modular_bitfield::prelude::*;
use strum_macros::EnumIter;

use crate::error::FrameError;

/// Total length of every frame, checksum byte included.
pub const FRAME_LEN: usize = 26;

/// First byte of every frame.
pub const START_BYTE: u8 = 0xAA;

/// Command byte of a Set frame (setpoint plus limits).
pub const CMD_SET: u8 = 0x90;
/// Command byte of a Get frame (state query and its response).
pub const CMD_GET: u8 = 0x91;
/// Command byte of a State frame (remote/enable toggles).
pub const CMD_STATE: u8 = 0x92;

/// Modulo-256 sum of `body`, as carried in the last byte of every frame.
pub fn checksum(body: &[u8]) -> u8 {
    body.iter().fold(0u8, |sum, &byte| sum.wrapping_add(byte))
}

/// Write the checksum over bytes 0..25 into the final byte.
fn seal(mut frame: [u8; FRAME_LEN]) -> [u8; FRAME_LEN] {
    frame[FRAME_LEN - 1] = checksum(&frame[..FRAME_LEN - 1]);
    frame
}

/// Validate length, checksum, start byte and command byte, in that order.
///
/// The checksum is verified before the header bytes so that any single-byte
/// corruption of a previously valid frame surfaces as a checksum failure.
fn check_envelope(bytes: &[u8], command: u8) -> Result<&[u8], FrameError> {
    if bytes.len() < FRAME_LEN {
        return Err(FrameError::ShortRead {
            expected: FRAME_LEN,
            actual: bytes.len(),
        });
    }
    let frame = &bytes[..FRAME_LEN];
    let computed = checksum(&frame[..FRAME_LEN - 1]);
    let received = frame[FRAME_LEN - 1];
    if computed != received {
        return Err(FrameError::ChecksumMismatch { computed, received });
    }
    if frame[0] != START_BYTE {
        return Err(FrameError::BadStartByte(frame[0]));
    }
    if frame[2] != command {
        return Err(FrameError::BadCommandByte {
            expected: command,
            actual: frame[2],
        });
    }
    Ok(frame)
}

fn read_u16(frame: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([frame[offset], frame[offset + 1]])
}

fn read_u32(frame: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        frame[offset],
        frame[offset + 1],
        frame[offset + 2],
        frame[offset + 3],
    ])
}

/// Which controlled quantity a Set frame targets.
///
/// The discriminant is the type byte carried at offset 8 of the Set frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
#[repr(u8)]
pub enum SetpointKind {
    Current = 1,
    Power = 2,
    Resistance = 3,
}

impl From<SetpointKind> for u8 {
    fn from(value: SetpointKind) -> Self {
        value as u8
    }
}

impl TryFrom<u8> for SetpointKind {
    type Error = FrameError;

    fn try_from(value: u8) -> Result<Self, FrameError> {
        match value {
            1 => Ok(SetpointKind::Current),
            2 => Ok(SetpointKind::Power),
            3 => Ok(SetpointKind::Resistance),
            other => Err(FrameError::UnknownSetpointKind(other)),
        }
    }
}

/// Status byte of a Get response (frame offset 17).
///
/// Bits 6-7 are reserved; the device is expected to send them as zero and
/// the accessors ignore them either way.
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusFlags {
    pub remote: bool,
    pub enabled: bool,
    pub incorrect_polarity: bool,
    pub excessive_temperature: bool,
    pub excessive_voltage: bool,
    pub excessive_current: bool,
    #[skip]
    __: B2,
}

/// Control byte of a State frame (frame offset 3). Bits 2-7 are reserved.
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlBits {
    pub enabled: bool,
    pub remote: bool,
    #[skip]
    __: B6,
}

/// Set frame: commands a new setpoint and re-asserts the configured limits.
///
/// The protocol has no partial update. Every Set frame commits the current
/// limit, the power limit, the device address and the new setpoint together,
/// so the sender must supply its cached limit values on every write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetCommand {
    pub address: u8,
    /// Current limit in device units (milliamps).
    pub max_current: u16,
    /// Power limit in device units (deciwatts).
    pub max_power: u16,
    /// Address the device adopts on receipt. Kept equal to `address` unless
    /// deliberately re-addressing the device.
    pub new_address: u8,
    pub kind: SetpointKind,
    /// Setpoint in the device units of `kind`.
    pub value: u16,
}

impl SetCommand {
    /// Build the 26-byte wire frame. Addresses must be 0x00-0xFE; passing
    /// 0xFF is a caller contract violation.
    pub fn encode(&self) -> [u8; FRAME_LEN] {
        debug_assert!(self.address != 0xFF && self.new_address != 0xFF);
        let mut frame = [0u8; FRAME_LEN];
        frame[0] = START_BYTE;
        frame[1] = self.address;
        frame[2] = CMD_SET;
        frame[3..5].copy_from_slice(&self.max_current.to_le_bytes());
        frame[5..7].copy_from_slice(&self.max_power.to_le_bytes());
        frame[7] = self.new_address;
        frame[8] = self.kind as u8;
        frame[9..11].copy_from_slice(&self.value.to_le_bytes());
        seal(frame)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, FrameError> {
        let frame = check_envelope(bytes, CMD_SET)?;
        Ok(SetCommand {
            address: frame[1],
            max_current: read_u16(frame, 3),
            max_power: read_u16(frame, 5),
            new_address: frame[7],
            kind: SetpointKind::try_from(frame[8])?,
            value: read_u16(frame, 9),
        })
    }
}

/// Get frame as sent by the host: a state query with every payload field zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetRequest {
    pub address: u8,
}

impl GetRequest {
    pub fn encode(&self) -> [u8; FRAME_LEN] {
        debug_assert!(self.address != 0xFF);
        let mut frame = [0u8; FRAME_LEN];
        frame[0] = START_BYTE;
        frame[1] = self.address;
        frame[2] = CMD_GET;
        seal(frame)
    }
}

/// Get frame as returned by the device: a full measurement and state snapshot.
///
/// Numeric fields are raw device units; see [`Scale`](crate::scaling::Scale)
/// for the conversion factors. Snapshots are transient, one per query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetResponse {
    pub address: u8,
    pub current: u16,
    pub voltage: u32,
    pub power: u16,
    pub max_current: u16,
    pub max_power: u16,
    pub resistance: u16,
    pub status: StatusFlags,
}

impl GetResponse {
    /// Build the 26-byte wire frame a device would send. Used by tests and
    /// device emulation; hosts only decode this frame kind.
    pub fn encode(&self) -> [u8; FRAME_LEN] {
        debug_assert!(self.address != 0xFF);
        let mut frame = [0u8; FRAME_LEN];
        frame[0] = START_BYTE;
        frame[1] = self.address;
        frame[2] = CMD_GET;
        frame[3..5].copy_from_slice(&self.current.to_le_bytes());
        frame[5..9].copy_from_slice(&self.voltage.to_le_bytes());
        frame[9..11].copy_from_slice(&self.power.to_le_bytes());
        frame[11..13].copy_from_slice(&self.max_current.to_le_bytes());
        frame[13..15].copy_from_slice(&self.max_power.to_le_bytes());
        frame[15..17].copy_from_slice(&self.resistance.to_le_bytes());
        frame[17] = self.status.into_bytes()[0];
        seal(frame)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, FrameError> {
        let frame = check_envelope(bytes, CMD_GET)?;
        Ok(GetResponse {
            address: frame[1],
            current: read_u16(frame, 3),
            voltage: read_u32(frame, 5),
            power: read_u16(frame, 9),
            max_current: read_u16(frame, 11),
            max_power: read_u16(frame, 13),
            resistance: read_u16(frame, 15),
            status: StatusFlags::from_bytes([frame[17]]),
        })
    }
}

/// State frame: toggles the remote-control and output-enable bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateCommand {
    pub address: u8,
    pub remote: bool,
    pub enabled: bool,
}

impl StateCommand {
    pub fn encode(&self) -> [u8; FRAME_LEN] {
        debug_assert!(self.address != 0xFF);
        let mut frame = [0u8; FRAME_LEN];
        frame[0] = START_BYTE;
        frame[1] = self.address;
        frame[2] = CMD_STATE;
        frame[3] = ControlBits::new()
            .with_enabled(self.enabled)
            .with_remote(self.remote)
            .into_bytes()[0];
        seal(frame)
    }
}
