//! Scaling between physical quantities and the 371X's fixed-point integers.
//!
//! The device stores every quantity as an unsigned integer with a fixed
//! multiplier. The valid ranges and factors are from the vendor protocol
//! document:
//!
//! | Quantity   | Range        | Factor |
//! |------------|--------------|--------|
//! | current    | 0 - 30 A     | x1000  |
//! | voltage    | 0 - 360 V    | x1000  |
//! | resistance | 0 - 500 Ohm  | x100   |
//! | power      | 0 - 200 W    | x10    |
//! | duration   | 0 - 65535 s  | x1     |

use crate::frame::SetpointKind;

/// Valid physical range and fixed-point factor for one device quantity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale {
    /// Lower bound of the valid physical range.
    pub min: f64,
    /// Upper bound of the valid physical range.
    pub max: f64,
    /// Multiplier from physical units to device integer units.
    pub factor: f64,
}

impl Scale {
    /// Current in amps, device units of 1 mA.
    pub const CURRENT: Scale = Scale::new(0.0, 30.0, 1000.0);
    /// Voltage in volts, device units of 1 mV.
    pub const VOLTAGE: Scale = Scale::new(0.0, 360.0, 1000.0);
    /// Resistance in ohms, device units of 10 mOhm.
    pub const RESISTANCE: Scale = Scale::new(0.0, 500.0, 100.0);
    /// Power in watts, device units of 100 mW.
    pub const POWER: Scale = Scale::new(0.0, 200.0, 10.0);
    /// Sequence-step duration in whole seconds.
    pub const DURATION: Scale = Scale::new(0.0, 65535.0, 1.0);

    pub const fn new(min: f64, max: f64, factor: f64) -> Self {
        Scale { min, max, factor }
    }

    /// Convert a physical value to device integer units.
    ///
    /// Out-of-range requests are silently saturated to the nearest bound of
    /// the valid range, never rejected; this matches the device's own
    /// behavior of refusing to run outside its envelope. Callers who need
    /// rejection instead can compare against [`Scale::min`]/[`Scale::max`]
    /// before calling.
    ///
    /// Returns a u16 because every writable frame field is 16 bits; voltage
    /// (the one quantity whose scaled range exceeds 16 bits) is read-only.
    #[inline]
    pub fn to_raw(&self, value: f64) -> u16 {
        let clamped = value.clamp(self.min, self.max);
        // Round half up; plain truncation after +0.5 keeps this core-only.
        (clamped * self.factor + 0.5) as u16
    }

    /// Convert a device integer value back to physical units.
    #[inline]
    pub fn to_physical(&self, raw: u32) -> f64 {
        raw as f64 / self.factor
    }
}

impl SetpointKind {
    /// The scale used when writing this setpoint kind to the device.
    pub const fn scale(&self) -> Scale {
        match self {
            SetpointKind::Current => Scale::CURRENT,
            SetpointKind::Power => Scale::POWER,
            SetpointKind::Resistance => Scale::RESISTANCE,
        }
    }
}
