//! This crate provides an interface for communicating with and controlling the Array 371X
//! series of programmable electronic loads.
//!
//! It supports `no-std` environments by use of the `no_std` feature flag.
//!
//! Load models this should work with:
//! * 3710A
//! * 3711A
//!
//! The protocol is the vendor's fixed 26-byte binary framing (start byte
//! `0xAA`, address, command, little-endian payload, zero padding, modulo-256
//! sum checksum), carried over serial/UART. It is suitable for any transport
//! exposing [embedded_io::Read] and [embedded_io::Write]; configure the port
//! with a bounded read timeout (one second is a good default) so a silent
//! device turns into an error instead of a hang.
//!
//! The serial port used for load comms should be configured like so:
//! * Default baud rate: 9600
//! * Data bits: 8
//! * Stop bits: 1
//! * Parity: None
//!
//! Setpoint writes are silently clamped to the device's valid ranges and are
//! not acknowledged by the device; see
//! [`ElectronicLoad`](crate::load::ElectronicLoad) for the details.

#![cfg_attr(feature = "no_std", no_std)]

pub mod error;
pub mod frame;
pub mod load;
pub mod scaling;

#[cfg(test)]
mod mock_serial;
