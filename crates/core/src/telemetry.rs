//! Energy estimation from the strip's charge accumulator.

use crate::device::PowerStrip;
use crate::error::Result;
use crate::transport::HidTransport;
use serde::Serialize;

/// Convert accumulated charge to energy in kilowatt-hours.
///
/// The strip does not measure voltage, so `line_voltage` is the caller's
/// estimate of the AC line.
pub fn convert_charge_to_energy(milliamp_minutes: i32, line_voltage: f32) -> f32 {
    let amp_hours = milliamp_minutes as f32 / 60.0 / 1000.0;
    amp_hours * line_voltage / 1000.0
}

/// One fresh reading of the strip's telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TelemetrySample {
    /// Total instantaneous current in milliamps.
    pub current_ma: i16,
    /// Charge since the last accumulator reset, in milliamp-minutes.
    pub charge_ma_min: i32,
    /// Estimated energy since the last reset, in kWh.
    pub energy_kwh: f32,
}

impl TelemetrySample {
    /// Query current and charge from the strip.
    pub fn read<T: HidTransport>(strip: &PowerStrip<T>, line_voltage: f32) -> Result<Self> {
        let current_ma = strip.instantaneous_current()?;
        let charge_ma_min = strip.accumulated_charge()?;
        Ok(Self {
            current_ma,
            charge_ma_min,
            energy_kwh: convert_charge_to_energy(charge_ma_min, line_voltage),
        })
    }
}
