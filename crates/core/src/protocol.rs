//! PowerUSB wire protocol: command bytes and response decoding.
//!
//! Every command is a single byte written to the device. Queries are followed
//! by a fixed-length read; there is no framing or checksum:
//!
//! | Command          | Byte | Response                          |
//! |------------------|------|-----------------------------------|
//! | Identify         | 0xAA | 1 byte, 1-based device type code  |
//! | Current          | 0xB1 | 2 bytes, big-endian i16, mA       |
//! | Charge           | 0xB2 | 4 bytes, big-endian i32, mA·min   |
//! | Reset charge     | 0xB3 | none                              |
//! | Outlet switching | per-outlet tables below | none           |

use crate::error::{Error, Result};
use crate::SOCKET_COUNT;

/// Query the device type.
pub const GET_DEVICE_TYPE: u8 = 0xAA;
/// Query the total instantaneous current.
pub const GET_INSTANTANEOUS_CURRENT: u8 = 0xB1;
/// Query the accumulated charge.
pub const GET_ACCUMULATED_CHARGE: u8 = 0xB2;
/// Reset the charge accumulator.
pub const RESET_CHARGE_ACCUMULATOR: u8 = 0xB3;

/// Response length of [`GET_DEVICE_TYPE`].
pub const DEVICE_TYPE_LEN: usize = 1;
/// Response length of [`GET_INSTANTANEOUS_CURRENT`].
pub const CURRENT_LEN: usize = 2;
/// Response length of [`GET_ACCUMULATED_CHARGE`].
pub const CHARGE_LEN: usize = 4;

/// Immediate power-on command, indexed by outlet.
pub const POWER_ON: [u8; SOCKET_COUNT] = [0x41, 0x43, 0x45];
/// Immediate power-off command, indexed by outlet.
pub const POWER_OFF: [u8; SOCKET_COUNT] = [0x42, 0x44, 0x50];
/// Power-on-default "on" command, indexed by outlet.
pub const DEFAULT_POWER_ON: [u8; SOCKET_COUNT] = [0x4E, 0x47, 0x4F];
/// Power-on-default "off" command, indexed by outlet.
pub const DEFAULT_POWER_OFF: [u8; SOCKET_COUNT] = [0x46, 0x51, 0x48];

/// Power state of a switchable outlet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum SocketState {
    Off,
    On,
}

impl SocketState {
    pub fn from_bool(on: bool) -> Self {
        if on {
            Self::On
        } else {
            Self::Off
        }
    }
}

impl std::fmt::Display for SocketState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Off => write!(f, "off"),
            Self::On => write!(f, "on"),
        }
    }
}

/// PowerUSB product variant reported by the identify command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum DeviceType {
    Basic,
    DigitalIo,
    Watchdog,
    Smart,
}

impl DeviceType {
    /// All variants, in wire-code order.
    pub const ALL: &'static [DeviceType] = &[
        DeviceType::Basic,
        DeviceType::DigitalIo,
        DeviceType::Watchdog,
        DeviceType::Smart,
    ];

    /// Decode the 1-based identify code.
    ///
    /// Code 0 wraps to 0xFF and is rejected along with anything above 4.
    pub fn from_code(code: u8) -> Result<Self> {
        let index = usize::from(code.wrapping_sub(1));
        Self::ALL
            .get(index)
            .copied()
            .ok_or(Error::UnknownDeviceType(code))
    }

    /// Variant label as printed on the product line.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Basic => "Basic",
            Self::DigitalIo => "Digital IO",
            Self::Watchdog => "Watchdog",
            Self::Smart => "Smart",
        }
    }
}

impl std::fmt::Display for DeviceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Immediate switching command for an outlet. `None` if the index is out of range.
pub fn socket_command(index: usize, state: SocketState) -> Option<u8> {
    let table = match state {
        SocketState::On => &POWER_ON,
        SocketState::Off => &POWER_OFF,
    };
    table.get(index).copied()
}

/// Power-on-default command for an outlet. `None` if the index is out of range.
pub fn default_socket_command(index: usize, state: SocketState) -> Option<u8> {
    let table = match state {
        SocketState::On => &DEFAULT_POWER_ON,
        SocketState::Off => &DEFAULT_POWER_OFF,
    };
    table.get(index).copied()
}

/// Decode the current response: big-endian signed milliamps.
pub fn decode_current(buf: [u8; CURRENT_LEN]) -> i16 {
    i16::from_be_bytes(buf)
}

/// Decode the charge response: big-endian signed milliamp-minutes.
pub fn decode_charge(buf: [u8; CHARGE_LEN]) -> i32 {
    i32::from_be_bytes(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn socket_command_matches_tables() {
        assert_eq!(socket_command(0, SocketState::On), Some(0x41));
        assert_eq!(socket_command(1, SocketState::On), Some(0x43));
        assert_eq!(socket_command(2, SocketState::On), Some(0x45));
        assert_eq!(socket_command(0, SocketState::Off), Some(0x42));
        assert_eq!(socket_command(1, SocketState::Off), Some(0x44));
        assert_eq!(socket_command(2, SocketState::Off), Some(0x50));
    }

    #[test]
    fn default_socket_command_matches_tables() {
        assert_eq!(default_socket_command(0, SocketState::On), Some(0x4E));
        assert_eq!(default_socket_command(1, SocketState::On), Some(0x47));
        assert_eq!(default_socket_command(2, SocketState::On), Some(0x4F));
        assert_eq!(default_socket_command(0, SocketState::Off), Some(0x46));
        assert_eq!(default_socket_command(1, SocketState::Off), Some(0x51));
        assert_eq!(default_socket_command(2, SocketState::Off), Some(0x48));
    }

    #[test]
    fn commands_reject_out_of_range_index() {
        assert_eq!(socket_command(3, SocketState::On), None);
        assert_eq!(default_socket_command(usize::MAX, SocketState::Off), None);
    }

    #[test]
    fn command_bytes_are_distinct() {
        let mut all: Vec<u8> = [POWER_ON, POWER_OFF, DEFAULT_POWER_ON, DEFAULT_POWER_OFF]
            .concat()
            .into_iter()
            .chain([
                GET_DEVICE_TYPE,
                GET_INSTANTANEOUS_CURRENT,
                GET_ACCUMULATED_CHARGE,
                RESET_CHARGE_ACCUMULATOR,
            ])
            .collect();
        let total = all.len();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), total);
    }

    #[test]
    fn decode_current_big_endian() {
        assert_eq!(decode_current([0x01, 0x90]), 400);
        assert_eq!(decode_current([0xFF, 0xFF]), -1);
        assert_eq!(decode_current([0x80, 0x00]), i16::MIN);
    }

    #[test]
    fn decode_charge_big_endian() {
        assert_eq!(decode_charge([0x00, 0x00, 0x01, 0x00]), 256);
        assert_eq!(decode_charge([0xFF, 0xFF, 0xFF, 0xFF]), -1);
        assert_eq!(decode_charge([0x01, 0x02, 0x03, 0x04]), 0x0102_0304);
    }

    #[test]
    fn device_type_from_valid_codes() {
        assert_eq!(DeviceType::from_code(1).unwrap(), DeviceType::Basic);
        assert_eq!(DeviceType::from_code(2).unwrap(), DeviceType::DigitalIo);
        assert_eq!(DeviceType::from_code(3).unwrap(), DeviceType::Watchdog);
        assert_eq!(DeviceType::from_code(4).unwrap(), DeviceType::Smart);
        assert_eq!(DeviceType::DigitalIo.label(), "Digital IO");
    }

    #[test]
    fn device_type_rejects_zero_and_above_four() {
        assert!(matches!(
            DeviceType::from_code(0),
            Err(Error::UnknownDeviceType(0))
        ));
        assert!(DeviceType::from_code(5).is_err());
        assert!(DeviceType::from_code(0xFF).is_err());
    }
}
