//! Error types for pwrusb-core.

use thiserror::Error;

/// Core library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// HID transport reported a failure.
    #[error("HID error: {0}")]
    Hid(String),

    /// No matching device could be opened.
    #[error("device not found (VID=0x{vid:04X} PID=0x{pid:04X})")]
    DeviceNotFound { vid: u16, pid: u16 },

    /// The driver or HID session holds no open handle.
    #[error("device not initialized")]
    NotInitialized,

    /// The transport moved fewer bytes than the command requires.
    #[error("short {op}: expected {expected} bytes, got {actual}")]
    ShortTransfer {
        op: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Identify response outside the known device type codes.
    #[error("unknown device type code: 0x{0:02X}")]
    UnknownDeviceType(u8),

    /// Value out of safe range.
    #[error("value out of range: {field} = {value} (allowed {min}..={max})")]
    OutOfRange {
        field: &'static str,
        value: String,
        min: String,
        max: String,
    },

    /// Configuration file could not be read or parsed.
    #[error("config error: {0}")]
    Config(String),
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, Error>;
