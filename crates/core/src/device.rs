//! Power strip driver: lifecycle, outlet control, and telemetry queries.
//!
//! Each operation is one single-byte command write, followed for queries by
//! one fixed-length blocking read. Nothing is retried or cached.

use crate::error::{Error, Result};
use crate::protocol::{self, DeviceType, SocketState};
use crate::safety;
use crate::transport::{HidDeviceTransport, HidSession, HidTransport};
use crate::{PRODUCT_ID, SOCKET_COUNT, VENDOR_ID};
use tracing::{debug, trace, warn};

/// Driver for one PowerUSB strip.
///
/// Holds the transport exclusively. When the device could not be opened the
/// driver is uninitialized and every operation returns
/// [`Error::NotInitialized`] without touching any transport.
pub struct PowerStrip<T: HidTransport> {
    transport: Option<T>,
}

impl<'a> PowerStrip<HidDeviceTransport<'a>> {
    /// Open the first attached PowerUSB strip.
    ///
    /// The driver borrows `session`, which stays open until the driver is
    /// dropped. Check [`is_initialized`](Self::is_initialized) before use.
    pub fn open(session: &'a HidSession) -> Self {
        match session.open(VENDOR_ID, PRODUCT_ID) {
            Ok(transport) => Self::with_transport(transport),
            Err(e) => {
                warn!(error = %e, "PowerUSB device unavailable");
                Self::uninitialized()
            }
        }
    }
}

impl<T: HidTransport> PowerStrip<T> {
    /// Wrap an already opened transport.
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport: Some(transport),
        }
    }

    /// A driver with no device behind it.
    pub fn uninitialized() -> Self {
        Self { transport: None }
    }

    /// Whether a device handle is held.
    pub fn is_initialized(&self) -> bool {
        self.transport.is_some()
    }

    /// Number of switchable outlets. Every PowerUSB model has three.
    pub fn socket_count(&self) -> usize {
        SOCKET_COUNT
    }

    /// Identify the product variant.
    pub fn device_type(&self) -> Result<DeviceType> {
        let [code] = self.query::<{ protocol::DEVICE_TYPE_LEN }>(protocol::GET_DEVICE_TYPE)?;
        let device_type = DeviceType::from_code(code).inspect_err(|_| {
            warn!(code = format_args!("0x{code:02X}"), "Unknown device type code");
        })?;
        debug!(device_type = device_type.label(), "Device identified");
        Ok(device_type)
    }

    /// Switch an outlet on or off immediately.
    pub fn set_socket_state(&self, index: usize, state: SocketState) -> Result<()> {
        let command = protocol::socket_command(index, state)
            .ok_or_else(|| safety::socket_index_error(index))?;
        self.device_write(&[command])?;
        debug!(index, %state, "Socket state set");
        Ok(())
    }

    /// Set the state an outlet takes when the strip itself powers up.
    ///
    /// The hardware persists this across power cycles; the outlet's current
    /// state is not changed.
    pub fn set_default_socket_state(&self, index: usize, state: SocketState) -> Result<()> {
        let command = protocol::default_socket_command(index, state)
            .ok_or_else(|| safety::socket_index_error(index))?;
        self.device_write(&[command])?;
        debug!(index, %state, "Default socket state set");
        Ok(())
    }

    /// Total current through the strip in milliamps, including the
    /// unswitched outlet.
    pub fn instantaneous_current(&self) -> Result<i16> {
        let buf = self.query::<{ protocol::CURRENT_LEN }>(protocol::GET_INSTANTANEOUS_CURRENT)?;
        let milliamps = protocol::decode_current(buf);
        debug!(milliamps, "Instantaneous current");
        Ok(milliamps)
    }

    /// Charge integrated by the strip since the last reset, in
    /// milliamp-minutes.
    pub fn accumulated_charge(&self) -> Result<i32> {
        let buf = self.query::<{ protocol::CHARGE_LEN }>(protocol::GET_ACCUMULATED_CHARGE)?;
        let milliamp_minutes = protocol::decode_charge(buf);
        debug!(milliamp_minutes, "Accumulated charge");
        Ok(milliamp_minutes)
    }

    /// Zero the strip's charge accumulator.
    pub fn reset_charge_accumulator(&self) -> Result<()> {
        self.device_write(&[protocol::RESET_CHARGE_ACCUMULATOR])?;
        debug!("Charge accumulator reset");
        Ok(())
    }

    /// Write `command` and read exactly `N` response bytes.
    fn query<const N: usize>(&self, command: u8) -> Result<[u8; N]> {
        self.device_write(&[command])?;
        let mut buf = [0u8; N];
        self.device_read(&mut buf)?;
        Ok(buf)
    }

    fn device_write(&self, data: &[u8]) -> Result<()> {
        let transport = self.transport.as_ref().ok_or(Error::NotInitialized)?;
        trace!(report_hex = format_args!("{:02X?}", data), "PowerUSB TX");
        // Some backends report the padded output report length.
        let written = transport.write(data)?;
        if written < data.len() {
            return Err(Error::ShortTransfer {
                op: "write",
                expected: data.len(),
                actual: written,
            });
        }
        Ok(())
    }

    fn device_read(&self, buf: &mut [u8]) -> Result<()> {
        let transport = self.transport.as_ref().ok_or(Error::NotInitialized)?;
        let read = transport.read(buf)?;
        if read != buf.len() {
            return Err(Error::ShortTransfer {
                op: "read",
                expected: buf.len(),
                actual: read,
            });
        }
        trace!(report_hex = format_args!("{:02X?}", buf), "PowerUSB RX");
        Ok(())
    }
}

impl<T: HidTransport> Drop for PowerStrip<T> {
    fn drop(&mut self) {
        if self.transport.take().is_some() {
            debug!("PowerUSB device closed");
        }
    }
}
