//! Synchronous request/response driver for a single Array 371X load.

use embedded_io::Error as _;

use crate::{
    error::{Error, FrameError, Result},
    frame::{FRAME_LEN, GetRequest, GetResponse, SetCommand, SetpointKind, StateCommand, StatusFlags},
    scaling::Scale,
};

/// You can create an ElectronicLoad using any interface which implements
/// [embedded_io::Read] & [embedded_io::Write].
///
/// Method nomenclature: "read" returns a measured value from a fresh device
/// query, "set" writes a command frame. The protocol defines no
/// acknowledgement for command frames, so every setter is fire-and-forget:
/// success means the bytes were written, and a follow-up [`Self::read_state`]
/// is the only way to confirm the device applied the change.
///
/// Each exchange assumes it is the only traffic on the wire. One
/// ElectronicLoad per serial handle, driven by one caller at a time; this
/// type provides no locking of its own. The interface's read timeout bounds
/// every query (one second works well with these devices).
pub struct ElectronicLoad<S: embedded_io::Read + embedded_io::Write> {
    interface: S,
    /// Device address, 0x00-0xFE. Fixed at construction.
    address: u8,
    /// Current limit in device units, resent in every Set frame.
    max_current: u16,
    /// Power limit in device units, resent in every Set frame.
    max_power: u16,
}

impl<S: embedded_io::Read + embedded_io::Write> ElectronicLoad<S> {
    /// Create a new ElectronicLoad bound to one interface and one address.
    ///
    /// Both limits start at zero, as on the device after power-up; call
    /// [`Self::set_max_current_a`] and [`Self::set_max_power_w`] before the
    /// first setpoint write.
    pub fn new(interface: S, address: u8) -> Result<Self, S::Error> {
        if address == 0xFF {
            return Err(FrameError::InvalidAddress(address).into());
        }
        Ok(ElectronicLoad {
            interface,
            address,
            max_current: 0,
            max_power: 0,
        })
    }

    /// The device address this client was constructed with.
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Query the device and return a fresh state snapshot.
    ///
    /// Blocks for up to one full frame or the interface read timeout. Decode
    /// failures propagate as-is; no retry, no partial state.
    pub fn read_state(&mut self) -> Result<GetResponse, S::Error> {
        let query = GetRequest { address: self.address }.encode();
        self.interface.write_all(&query).map_err(Error::Serial)?;

        let frame = self.read_frame()?;
        let response = GetResponse::decode(&frame)?;
        Ok(response)
    }

    /// Command a new setpoint for the given quantity.
    ///
    /// `value` is in physical units (amps, watts or ohms) and is silently
    /// clamped to the quantity's valid range before scaling. The frame also
    /// carries the cached current/power limits and the device address, since
    /// the protocol commits all of them atomically with the setpoint.
    pub fn set_setpoint(&mut self, kind: SetpointKind, value: f64) -> Result<(), S::Error> {
        let command = SetCommand {
            address: self.address,
            max_current: self.max_current,
            max_power: self.max_power,
            new_address: self.address,
            kind,
            value: kind.scale().to_raw(value),
        };
        self.interface
            .write_all(&command.encode())
            .map_err(Error::Serial)
    }

    /// Command a new load current in amps. See [`Self::set_setpoint`].
    pub fn set_current_a(&mut self, amps: f64) -> Result<(), S::Error> {
        self.set_setpoint(SetpointKind::Current, amps)
    }

    /// Command a new load power in watts. See [`Self::set_setpoint`].
    pub fn set_power_w(&mut self, watts: f64) -> Result<(), S::Error> {
        self.set_setpoint(SetpointKind::Power, watts)
    }

    /// Command a new load resistance in ohms. See [`Self::set_setpoint`].
    pub fn set_resistance_ohm(&mut self, ohms: f64) -> Result<(), S::Error> {
        self.set_setpoint(SetpointKind::Resistance, ohms)
    }

    /// Toggle remote control and the load input together.
    ///
    /// Fire-and-forget like the setpoint writes. Note that dropping `remote`
    /// hands control back to the front panel.
    pub fn set_remote_enabled(&mut self, remote: bool, enabled: bool) -> Result<(), S::Error> {
        let command = StateCommand {
            address: self.address,
            remote,
            enabled,
        };
        self.interface
            .write_all(&command.encode())
            .map_err(Error::Serial)
    }

    /// Set the current limit, in amps, carried by subsequent Set frames.
    ///
    /// Client-local only; the device sees the new limit on the next setpoint
    /// write. Silently clamped to the valid current range.
    pub fn set_max_current_a(&mut self, amps: f64) {
        self.max_current = Scale::CURRENT.to_raw(amps);
    }

    /// Set the power limit, in watts, carried by subsequent Set frames.
    ///
    /// Client-local only, like [`Self::set_max_current_a`].
    pub fn set_max_power_w(&mut self, watts: f64) {
        self.max_power = Scale::POWER.to_raw(watts);
    }

    /// The cached current limit in amps, as it will be sent on the next
    /// setpoint write. Not read back from the device.
    pub fn max_current_a(&self) -> f64 {
        Scale::CURRENT.to_physical(self.max_current as u32)
    }

    /// The cached power limit in watts. Not read back from the device.
    pub fn max_power_w(&self) -> f64 {
        Scale::POWER.to_physical(self.max_power as u32)
    }

    /// Return the measured load current in amps.
    pub fn read_current_a(&mut self) -> Result<f64, S::Error> {
        let state = self.read_state()?;
        Ok(Scale::CURRENT.to_physical(state.current as u32))
    }

    /// Return the measured terminal voltage in volts.
    pub fn read_voltage_v(&mut self) -> Result<f64, S::Error> {
        let state = self.read_state()?;
        Ok(Scale::VOLTAGE.to_physical(state.voltage))
    }

    /// Return the measured power in watts.
    pub fn read_power_w(&mut self) -> Result<f64, S::Error> {
        let state = self.read_state()?;
        Ok(Scale::POWER.to_physical(state.power as u32))
    }

    /// Return the resistance setting in ohms.
    pub fn read_resistance_ohm(&mut self) -> Result<f64, S::Error> {
        let state = self.read_state()?;
        Ok(Scale::RESISTANCE.to_physical(state.resistance as u32))
    }

    /// Return the full status byte from a fresh query.
    ///
    /// Flags change asynchronously (the device trips protections on its own),
    /// so nothing here is cached; every call is a device exchange.
    pub fn read_status(&mut self) -> Result<StatusFlags, S::Error> {
        Ok(self.read_state()?.status)
    }

    /// Whether the load input is currently enabled. Fresh query per call.
    pub fn is_enabled(&mut self) -> Result<bool, S::Error> {
        Ok(self.read_state()?.status.enabled())
    }

    /// Whether the device is under remote control. Fresh query per call.
    pub fn is_remote(&mut self) -> Result<bool, S::Error> {
        Ok(self.read_state()?.status.remote())
    }

    /// Accumulate exactly one 26-byte frame from the interface.
    ///
    /// Keeps reading until the frame is full or the interface reports a
    /// timeout. Nothing at all within the timeout is a [`Error::Timeout`];
    /// a partial frame is a [`FrameError::ShortRead`].
    fn read_frame(&mut self) -> Result<heapless::Vec<u8, FRAME_LEN>, S::Error> {
        let mut frame: heapless::Vec<u8, FRAME_LEN> = heapless::Vec::new();
        let mut chunk = [0u8; FRAME_LEN];

        while frame.len() < FRAME_LEN {
            let want = FRAME_LEN - frame.len();
            match self.interface.read(&mut chunk[..want]) {
                Ok(0) => break,
                Ok(n) => {
                    // Cannot overflow: reads are capped to the space left.
                    let _ = frame.extend_from_slice(&chunk[..n]);
                }
                Err(e) => match e.kind() {
                    embedded_io::ErrorKind::TimedOut | embedded_io::ErrorKind::Other => break,
                    _ => return Err(Error::Serial(e)),
                },
            }
        }

        if frame.is_empty() {
            return Err(Error::Timeout);
        }
        if frame.len() < FRAME_LEN {
            return Err(FrameError::ShortRead {
                expected: FRAME_LEN,
                actual: frame.len(),
            }
            .into());
        }
        Ok(frame)
    }
}
