//! Disk shared between the USB interrupt handler and the main loop.

use crate::disk::{DriveHandle, Handoff, RamDisk, SessionStatus};
use crate::flash::NorFlash;
use spin::Mutex;

/// [`RamDisk`] behind a spin lock, so the transport callbacks can be
/// registered as plain functions over a `static`.
pub struct SharedRamDisk<F: NorFlash, H: Handoff> {
    inner: Mutex<RamDisk<F, H>>,
}

impl<F: NorFlash, H: Handoff> SharedRamDisk<F, H> {
    pub const fn new(disk: RamDisk<F, H>) -> Self {
        Self {
            inner: Mutex::new(disk),
        }
    }

    pub fn open(&self, drive: u32) -> DriveHandle {
        self.inner.lock().open(drive)
    }

    pub fn close(&self, handle: DriveHandle) {
        self.inner.lock().close(handle)
    }

    pub fn block_count(&self, handle: DriveHandle) -> u32 {
        self.inner.lock().block_count(handle)
    }

    pub fn read(&self, handle: DriveHandle, block: u32, count: u32, out: &mut [u8]) -> u32 {
        self.inner.lock().read(handle, block, count, out)
    }

    pub fn write(&self, handle: DriveHandle, block: u32, data: &[u8], count: u32) -> u32 {
        self.inner.lock().write(handle, block, data, count)
    }

    pub fn status(&self) -> SessionStatus {
        self.inner.lock().status()
    }

    pub fn into_inner(self) -> RamDisk<F, H> {
        self.inner.into_inner()
    }
}
