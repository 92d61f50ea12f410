//! HID transport abstraction for device communication.
//!
//! Provides a trait-based transport layer so that real HID devices and
//! mock devices share the same interface, plus a scoped owner of the
//! process-wide hidapi context.

use crate::error::{Error, Result};
use std::marker::PhantomData;
use tracing::{debug, warn};

/// Abstraction over raw HID read/write.
///
/// Both calls block until the transport completes or fails and return the
/// number of bytes the transport reported moving.
pub trait HidTransport: Send {
    /// Write a raw report.
    fn write(&self, data: &[u8]) -> Result<usize>;

    /// Read a raw report into `buf`.
    fn read(&self, buf: &mut [u8]) -> Result<usize>;
}

/// Scoped owner of the hidapi library context.
///
/// Devices are opened through the session and borrow it, so the context
/// cannot be closed while any device is still open. Closing is idempotent
/// and also happens on drop, so the context is released on every exit path.
///
/// ```compile_fail
/// use pwrusb_core::device::PowerStrip;
/// use pwrusb_core::transport::HidSession;
///
/// let mut session = HidSession::new().unwrap();
/// let strip = PowerStrip::open(&session);
/// session.close();
/// drop(strip);
/// ```
pub struct HidSession {
    api: Option<hidapi::HidApi>,
}

impl HidSession {
    /// Initialize the hidapi context.
    pub fn new() -> Result<Self> {
        let api = hidapi::HidApi::new_without_enumerate()
            .map_err(|e| Error::Hid(format!("hidapi init: {e}")))?;
        debug!("hidapi context initialized");
        Ok(Self { api: Some(api) })
    }

    /// Whether the context is still held.
    pub fn is_open(&self) -> bool {
        self.api.is_some()
    }

    /// Open the first device matching `vid`/`pid`.
    pub fn open(&self, vid: u16, pid: u16) -> Result<HidDeviceTransport<'_>> {
        let api = self.api.as_ref().ok_or(Error::NotInitialized)?;
        let device = api.open(vid, pid).map_err(|e| {
            warn!(
                vid = format_args!("0x{vid:04X}"),
                pid = format_args!("0x{pid:04X}"),
                error = %e,
                "Failed to open HID device"
            );
            Error::DeviceNotFound { vid, pid }
        })?;
        debug!(
            vid = format_args!("0x{vid:04X}"),
            pid = format_args!("0x{pid:04X}"),
            "HID device opened"
        );
        Ok(HidDeviceTransport {
            device,
            _session: PhantomData,
        })
    }

    /// Release the hidapi context. Safe to call more than once.
    pub fn close(&mut self) {
        if self.api.take().is_some() {
            debug!("hidapi context released");
        }
    }
}

impl Drop for HidSession {
    fn drop(&mut self) {
        self.close();
    }
}

/// [`HidTransport`] over an open hidapi device. Dropping it closes the device.
pub struct HidDeviceTransport<'a> {
    device: hidapi::HidDevice,
    _session: PhantomData<&'a ()>,
}

impl HidTransport for HidDeviceTransport<'_> {
    fn write(&self, data: &[u8]) -> Result<usize> {
        self.device
            .write(data)
            .map_err(|e| Error::Hid(format!("write: {e}")))
    }

    fn read(&self, buf: &mut [u8]) -> Result<usize> {
        self.device
            .read(buf)
            .map_err(|e| Error::Hid(format!("read: {e}")))
    }
}

/// A mock HID transport for testing.
///
/// Records every write and serves queued responses in order.
#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Mock transport that returns preconfigured responses.
    pub struct MockTransport {
        responses: Mutex<VecDeque<Vec<u8>>>,
        writes: Mutex<Vec<Vec<u8>>>,
        calls: Mutex<usize>,
        fail_writes: Mutex<bool>,
        fail_reads: Mutex<bool>,
        short_writes: Mutex<bool>,
        report_len: Mutex<Option<usize>>,
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self {
                responses: Mutex::new(VecDeque::new()),
                writes: Mutex::new(Vec::new()),
                calls: Mutex::new(0),
                fail_writes: Mutex::new(false),
                fail_reads: Mutex::new(false),
                short_writes: Mutex::new(false),
                report_len: Mutex::new(None),
            }
        }

        /// Queue a response for the next read.
        pub fn queue_response(&self, response: &[u8]) {
            self.responses.lock().unwrap().push_back(response.to_vec());
        }

        /// All writes seen so far.
        pub fn writes(&self) -> Vec<Vec<u8>> {
            self.writes.lock().unwrap().clone()
        }

        /// Total number of read and write calls.
        pub fn call_count(&self) -> usize {
            *self.calls.lock().unwrap()
        }

        /// Make every write fail.
        pub fn fail_writes(&self) {
            *self.fail_writes.lock().unwrap() = true;
        }

        /// Make every read fail.
        pub fn fail_reads(&self) {
            *self.fail_reads.lock().unwrap() = true;
        }

        /// Report zero bytes written for every write.
        pub fn short_writes(&self) {
            *self.short_writes.lock().unwrap() = true;
        }

        /// Report writes as padded to a fixed output report length, the way
        /// hidapi does on Windows.
        pub fn padded_writes(&self, report_len: usize) {
            *self.report_len.lock().unwrap() = Some(report_len);
        }
    }

    impl HidTransport for MockTransport {
        fn write(&self, data: &[u8]) -> Result<usize> {
            *self.calls.lock().unwrap() += 1;
            if *self.fail_writes.lock().unwrap() {
                return Err(Error::Hid("mock: write failed".to_string()));
            }
            self.writes.lock().unwrap().push(data.to_vec());
            if *self.short_writes.lock().unwrap() {
                return Ok(0);
            }
            if let Some(report_len) = *self.report_len.lock().unwrap() {
                return Ok(data.len().max(report_len));
            }
            Ok(data.len())
        }

        fn read(&self, buf: &mut [u8]) -> Result<usize> {
            *self.calls.lock().unwrap() += 1;
            if *self.fail_reads.lock().unwrap() {
                return Err(Error::Hid("mock: read failed".to_string()));
            }
            let response = self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| Error::Hid("mock: no response queued".to_string()))?;
            let n = response.len().min(buf.len());
            buf[..n].copy_from_slice(&response[..n]);
            Ok(n)
        }
    }

    /// Shared handle so a test can inspect the mock after handing it to a driver.
    impl HidTransport for Arc<MockTransport> {
        fn write(&self, data: &[u8]) -> Result<usize> {
            self.as_ref().write(data)
        }

        fn read(&self, buf: &mut [u8]) -> Result<usize> {
            self.as_ref().read(buf)
        }
    }
}
