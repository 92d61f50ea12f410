//! Safety layer: validates caller-supplied parameters before any HID traffic.
//!
//! ## Outlet index
//! - **Range**: 0–2. Outlet 3 on the strip is the unswitched 15A outlet and
//!   has no command bytes.
//!
//! ## Line voltage
//! - The strip integrates current only; energy needs a caller estimate of the
//!   AC line voltage. Values must be finite and within 1–480 V.
//!
//! ## Safety Invariants
//! 1. Outlet indices are bounds-checked against `SOCKET_COUNT`
//! 2. All validation happens BEFORE any HID communication, so a rejected call
//!    never writes to the device

use crate::error::{Error, Result};
use crate::SOCKET_COUNT;

/// Lowest accepted line voltage estimate.
pub const LINE_VOLTAGE_MIN: f32 = 1.0;
/// Highest accepted line voltage estimate.
pub const LINE_VOLTAGE_MAX: f32 = 480.0;

/// Validate an outlet index (0-based).
pub fn validate_socket_index(index: usize) -> Result<()> {
    if index >= SOCKET_COUNT {
        return Err(socket_index_error(index));
    }
    Ok(())
}

pub(crate) fn socket_index_error(index: usize) -> Error {
    Error::OutOfRange {
        field: "socket_index",
        value: index.to_string(),
        min: "0".into(),
        max: (SOCKET_COUNT - 1).to_string(),
    }
}

/// Validate a line voltage estimate used for energy conversion.
pub fn validate_line_voltage(volts: f32) -> Result<f32> {
    if !volts.is_finite() || !(LINE_VOLTAGE_MIN..=LINE_VOLTAGE_MAX).contains(&volts) {
        return Err(Error::OutOfRange {
            field: "line_voltage",
            value: volts.to_string(),
            min: LINE_VOLTAGE_MIN.to_string(),
            max: LINE_VOLTAGE_MAX.to_string(),
        });
    }
    Ok(volts)
}
