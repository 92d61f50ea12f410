//! pwrusb-core: PowerUSB power strip protocol over USB HID.
//!
//! This crate provides the driver for PowerUSB power strips: outlet switching,
//! power-on defaults, current and charge telemetry, and the energy estimate
//! derived from them.

pub mod config;
pub mod device;
pub mod error;
pub mod protocol;
pub mod safety;
pub mod telemetry;
pub mod transport;

/// PowerUSB USB Vendor ID.
pub const VENDOR_ID: u16 = 0x04D8;

/// PowerUSB USB Product ID.
pub const PRODUCT_ID: u16 = 0x003F;

/// Number of switchable outlets on every PowerUSB strip.
pub const SOCKET_COUNT: usize = 3;
