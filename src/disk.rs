//! Block device façade called by the mass-storage transport.
//!
//! The transport turns SCSI requests from the host into the calls below, one
//! block at a time and never concurrently. Every write reports full success:
//! the fixed-size return value has no way to signal a flash failure, which is
//! instead surfaced through [`RamDisk::status`].
//!
//! Only the first block of a multi-block request is serviced. The transport
//! this was written against always asks for one block per call.

use crate::address_map::{classify, PayloadWindow, Region};
use crate::capture::{CaptureEvent, CaptureState, FirmwareCapture};
use crate::config::{DiskConfig, ReadBack};
use crate::constants::target::READ_DISABLED_PATTERN;
use crate::constants::MAX_DRIVES;
use crate::error::{ConfigError, FlashError};
use crate::fat::boot_sector::stamp_signature;
use crate::flash::{map_flash_error, NorFlash};
use crate::image::VolumeImage;
use log::{info, trace, warn};

/// Leaves the bootloader once the host ejects the volume.
pub trait Handoff {
    /// Shuts down the USB stack.
    fn terminate_transport(&mut self);

    /// Jumps to the user program. On hardware this does not return.
    fn launch_user_program(&mut self);
}

/// Handle returned by [`RamDisk::open`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriveHandle {
    lun: u32,
}

impl DriveHandle {
    pub fn lun(&self) -> u32 {
        self.lun
    }
}

/// Out-of-band view of the update session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionStatus {
    pub state: CaptureState,
    pub start_cluster: u16,
    pub window: PayloadWindow,
    pub blocks_programmed: u32,
    pub closed: bool,
}

impl SessionStatus {
    /// Flash failure that ended the session, if any
    pub fn fault(&self) -> Option<FlashError> {
        match self.state {
            CaptureState::Faulted(e) => Some(e),
            _ => None,
        }
    }
}

/// Virtual FAT12 disk whose single file is the target's program memory.
pub struct RamDisk<F: NorFlash, H: Handoff> {
    config: DiskConfig,
    image: VolumeImage,
    capture: FirmwareCapture,
    flash: F,
    handoff: H,
    closed: bool,
}

impl<F: NorFlash, H: Handoff> RamDisk<F, H> {
    pub fn new(config: DiskConfig, flash: F, handoff: H) -> Result<Self, ConfigError> {
        config.validate()?;
        if F::ERASE_SIZE as u32 != config.target.erase_size {
            return Err(ConfigError::EraseSizeMismatch {
                configured: config.target.erase_size,
                device: F::ERASE_SIZE as u32,
            });
        }
        if config.geometry.block_size % F::WRITE_SIZE != 0 {
            return Err(ConfigError::UnsupportedWriteSize(F::WRITE_SIZE));
        }
        let end = config.target.upload_start + config.target.upload_length;
        if end as usize > flash.capacity() {
            return Err(ConfigError::UploadOutsideFlash {
                end,
                capacity: flash.capacity() as u32,
            });
        }

        Ok(Self {
            image: VolumeImage::new(&config),
            capture: FirmwareCapture::new(config.file.start_cluster),
            config,
            flash,
            handoff,
            closed: false,
        })
    }

    /// Opens the single logical unit; any drive number maps to it.
    pub fn open(&mut self, drive: u32) -> DriveHandle {
        if drive >= MAX_DRIVES {
            warn!("Drive {} requested, serving drive 0", drive);
        }
        info!("Mass storage session opened");
        DriveHandle { lun: 0 }
    }

    /// Ends the session and hands control to the user program.
    pub fn close(&mut self, handle: DriveHandle) {
        info!(
            "Mass storage session on lun {} closed, {} blocks programmed",
            handle.lun,
            self.capture.blocks_programmed()
        );
        self.closed = true;
        self.handoff.terminate_transport();
        self.handoff.launch_user_program();
    }

    pub fn block_count(&self, _handle: DriveHandle) -> u32 {
        self.config.geometry.total_blocks
    }

    /// Fills the first `block_size` bytes of `out` with `block` and returns
    /// the byte count. A buffer shorter than one block is left untouched and
    /// 0 is returned.
    pub fn read(&mut self, handle: DriveHandle, block: u32, count: u32, out: &mut [u8]) -> u32 {
        let block_size = self.config.geometry.block_size;
        trace!("lun {} read {} block(s) at {}", handle.lun, count, block);
        if count > 1 {
            warn!("Read of {} blocks at {}, serving the first only", count, block);
        }
        let len = out.len();
        let Some(buf) = out.get_mut(..block_size) else {
            warn!("Read buffer of {} bytes is shorter than a block", len);
            return 0;
        };

        buf.fill(0);
        match classify(block, &self.config.geometry, &self.window()) {
            Region::Payload { offset } => self.read_payload(offset, buf),
            region => {
                if let Some(stored) = self.image.block(region) {
                    buf.copy_from_slice(stored);
                }
                if region == Region::BootSector {
                    stamp_signature(buf);
                }
            }
        }

        block_size as u32
    }

    /// Accepts `block` from the host and returns the byte count of the whole
    /// request. A buffer shorter than one block is dropped and 0 is returned,
    /// as is a request for no blocks at all.
    pub fn write(&mut self, handle: DriveHandle, block: u32, data: &[u8], count: u32) -> u32 {
        let block_size = self.config.geometry.block_size;
        trace!("lun {} write {} block(s) at {}", handle.lun, count, block);
        if count == 0 {
            return 0;
        }
        if count > 1 {
            warn!("Write of {} blocks at {}, storing the first only", count, block);
        }
        let Some(data) = data.get(..block_size) else {
            warn!("Write buffer of {} bytes is shorter than a block", data.len());
            return 0;
        };

        let region = classify(block, &self.config.geometry, &self.window());
        match region {
            Region::BootSector | Region::Fat | Region::Directory => {
                if let Some(stored) = self.image.block_mut(region) {
                    stored.copy_from_slice(data);
                }
                if region == Region::Directory {
                    self.capture.track_directory(self.image.directory(), &self.config);
                }
            }
            Region::Payload { .. } | Region::Data => {
                let event = self
                    .capture
                    .write_block(block, data, &self.config, &mut self.flash);
                if let CaptureEvent::Faulted(e) = event {
                    warn!("Reporting block {} as written despite {}", block, e);
                }
            }
            Region::Unused => trace!("Discarding write to unused block {}", block),
        }

        block_size as u32 * count
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            state: self.capture.state(),
            start_cluster: self.capture.start_cluster(),
            window: self.window(),
            blocks_programmed: self.capture.blocks_programmed(),
            closed: self.closed,
        }
    }

    pub fn flash(&self) -> &F {
        &self.flash
    }

    pub fn handoff(&self) -> &H {
        &self.handoff
    }

    fn window(&self) -> PayloadWindow {
        self.capture.window(&self.config)
    }

    fn read_payload(&mut self, offset: u32, buf: &mut [u8]) {
        match self.config.read_back {
            ReadBack::Disabled => {
                for (byte, pattern) in buf.iter_mut().zip(READ_DISABLED_PATTERN.iter().cycle()) {
                    *byte = *pattern;
                }
            }
            ReadBack::Flash => {
                let block_size = self.config.geometry.block_size as u32;
                let address = self.config.target.upload_start + offset * block_size;
                if let Err(e) = self.flash.read(address, buf) {
                    warn!("Read-back failed: {}", map_flash_error(e, address));
                    buf.fill(0);
                }
            }
        }
    }
}
