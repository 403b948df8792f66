//! Firmware capture state machine.
//!
//! A host replacing the file does not necessarily write it where the
//! directory originally said, and it writes plenty of blocks that are not
//! file content at all (zero fill, partial clusters, bookkeeping). The
//! machine stays [`CaptureState::Idle`] until a data-area block looks like
//! the start of an image, pins the payload window to that block's cluster,
//! and from then on forwards every in-window block to flash. The first
//! window block triggers an erase of the whole upload region.

use crate::address_map::PayloadWindow;
use crate::config::DiskConfig;
use crate::fat::dir_entry::tracked_start_cluster;
use crate::flash::{map_flash_error, FlashError, NorFlash};
use log::{debug, error, info, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    /// No firmware start seen yet
    Idle,
    /// Forwarding window blocks to flash
    Capturing,
    /// A flash operation failed; nothing more is written this session
    Faulted(FlashError),
}

/// Effect of one data-area write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureEvent {
    /// Accepted without touching flash
    Ignored,
    /// Block programmed at `address`, after a full erase if `erased`
    Programmed { address: u32, erased: bool },
    /// The write hit a flash failure
    Faulted(FlashError),
}

pub struct FirmwareCapture {
    state: CaptureState,
    start_cluster: u16,
    blocks_programmed: u32,
}

impl FirmwareCapture {
    pub fn new(start_cluster: u16) -> Self {
        Self {
            state: CaptureState::Idle,
            start_cluster,
            blocks_programmed: 0,
        }
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn start_cluster(&self) -> u16 {
        self.start_cluster
    }

    pub fn blocks_programmed(&self) -> u32 {
        self.blocks_programmed
    }

    /// Blocks currently backed by the upload region
    pub fn window(&self, config: &DiskConfig) -> PayloadWindow {
        PayloadWindow {
            start: config.geometry.cluster_to_block(self.start_cluster),
            len: config.upload_blocks(),
        }
    }

    /// Follows the host's directory rewrite to the file's new first cluster.
    ///
    /// Ignored once capture has started so the window cannot move under an
    /// upload in progress.
    pub fn track_directory(&mut self, dir_block: &[u8], config: &DiskConfig) {
        if self.state != CaptureState::Idle {
            return;
        }
        let Some(cluster) = tracked_start_cluster(dir_block, &config.file) else {
            return;
        };
        if cluster == self.start_cluster || !self.window_fits(cluster, config) {
            return;
        }

        debug!(
            "Directory moved firmware from cluster {} to {}",
            self.start_cluster, cluster
        );
        self.start_cluster = cluster;
    }

    /// Handles a write to a data-area block. Flash failures end the session
    /// and are reported as [`CaptureEvent::Faulted`]; the host is never told.
    pub fn write_block<F: NorFlash>(
        &mut self,
        block: u32,
        data: &[u8],
        config: &DiskConfig,
        flash: &mut F,
    ) -> CaptureEvent {
        if let CaptureState::Faulted(_) = self.state {
            trace!("Dropping block {} after flash fault", block);
            return CaptureEvent::Ignored;
        }

        match self.step(block, data, config, flash) {
            Ok(event) => event,
            Err(e) => {
                error!("Firmware update aborted at block {}: {}", block, e);
                self.state = CaptureState::Faulted(e);
                CaptureEvent::Faulted(e)
            }
        }
    }

    fn step<F: NorFlash>(
        &mut self,
        block: u32,
        data: &[u8],
        config: &DiskConfig,
        flash: &mut F,
    ) -> Result<CaptureEvent, FlashError> {
        if block < config.geometry.data_region_start() {
            return Ok(CaptureEvent::Ignored);
        }
        if self.state == CaptureState::Idle && config.target.signature.matches(data) {
            self.detect_start(block, config);
        }

        if self.state != CaptureState::Capturing {
            return Ok(CaptureEvent::Ignored);
        }

        let window = self.window(config);
        if !window.contains(block) {
            return Ok(CaptureEvent::Ignored);
        }

        let erased = block == window.start;
        if erased {
            erase_upload_region(config, flash)?;
        }

        let block_size = config.geometry.block_size;
        let address = config.target.upload_start + (block - window.start) * block_size as u32;
        debug!("Writing block {} to flash at {:#010x}", block, address);
        flash
            .write(address, &data[..block_size])
            .map_err(|e| map_flash_error(e, address))?;
        self.blocks_programmed += 1;

        Ok(CaptureEvent::Programmed { address, erased })
    }

    /// Pins the window on the first block that looks like an image.
    fn detect_start(&mut self, block: u32, config: &DiskConfig) {
        let geometry = &config.geometry;
        if block != geometry.cluster_to_block(self.start_cluster) {
            self.start_cluster = geometry.block_to_cluster(block);
        }
        self.state = CaptureState::Capturing;
        info!(
            "New firmware start at block {} (cluster {})",
            block, self.start_cluster
        );
    }

    fn window_fits(&self, cluster: u16, config: &DiskConfig) -> bool {
        let geometry = &config.geometry;
        geometry.cluster_to_block(cluster) + config.upload_blocks() <= geometry.total_blocks
    }
}

/// Erases every erase unit of the upload region, lowest address first.
fn erase_upload_region<F: NorFlash>(config: &DiskConfig, flash: &mut F) -> Result<(), FlashError> {
    let target = &config.target;
    let end = target.upload_start + target.upload_length;
    info!(
        "Erasing {} bytes at {:#010x}",
        target.upload_length, target.upload_start
    );
    for from in (target.upload_start..end).step_by(F::ERASE_SIZE) {
        flash
            .erase(from, from + F::ERASE_SIZE as u32)
            .map_err(|e| map_flash_error(e, from))?;
    }
    Ok(())
}

#[cfg(all(test, feature = "alloc"))]
mod tests {
    use super::*;
    use crate::flash::memory::MemoryFlash;

    const FIRMWARE_HEAD: [u32; 4] = [0x2000_8000, 0x0000_4119, 0x0000_4161, 0x0000_4163];

    fn firmware_block(fill: u8) -> [u8; 512] {
        let mut block = [fill; 512];
        for (i, w) in FIRMWARE_HEAD.iter().enumerate() {
            block[i * 4..i * 4 + 4].copy_from_slice(&w.to_le_bytes());
        }
        block
    }

    fn setup() -> (DiskConfig, MemoryFlash, FirmwareCapture) {
        let config = DiskConfig::default();
        let flash = MemoryFlash::new(
            config.target.upload_start,
            config.target.upload_length as usize,
        );
        let capture = FirmwareCapture::new(config.file.start_cluster);
        (config, flash, capture)
    }

    #[test]
    fn test_zero_block_stays_idle() {
        let (config, mut flash, mut capture) = setup();
        let event = capture.write_block(39, &[0u8; 512], &config, &mut flash);

        assert_eq!(event, CaptureEvent::Ignored);
        assert_eq!(capture.state(), CaptureState::Idle);
        assert_eq!(flash.erase_count(), 0);
        assert_eq!(flash.write_count(), 0);
    }

    #[test]
    fn test_signature_at_default_start_erases_then_programs() {
        let (config, mut flash, mut capture) = setup();
        let event = capture.write_block(39, &firmware_block(0xAB), &config, &mut flash);

        assert_eq!(
            event,
            CaptureEvent::Programmed {
                address: 0x4000,
                erased: true
            }
        );
        assert_eq!(capture.state(), CaptureState::Capturing);
        assert_eq!(flash.erase_count(), 240);
        assert_eq!(&flash.contents()[16..512], &[0xAB; 496][..]);
    }

    #[test]
    fn test_later_blocks_program_without_erase() {
        let (config, mut flash, mut capture) = setup();
        capture.write_block(39, &firmware_block(0), &config, &mut flash);
        let event = capture.write_block(40, &[7u8; 512], &config, &mut flash);

        assert_eq!(
            event,
            CaptureEvent::Programmed {
                address: 0x4200,
                erased: false
            }
        );
        assert_eq!(flash.erase_count(), 240);
        assert_eq!(capture.blocks_programmed(), 2);
    }

    #[test]
    fn test_infers_start_from_relocated_block() {
        let (config, mut flash, mut capture) = setup();
        capture.write_block(39, &[0u8; 512], &config, &mut flash);
        let event = capture.write_block(55, &firmware_block(0), &config, &mut flash);

        assert_eq!(capture.start_cluster(), 7);
        assert_eq!(
            event,
            CaptureEvent::Programmed {
                address: 0x4000,
                erased: true
            }
        );
    }

    #[test]
    fn test_second_signature_does_not_restart() {
        let (config, mut flash, mut capture) = setup();
        capture.write_block(39, &firmware_block(0), &config, &mut flash);
        let event = capture.write_block(43, &firmware_block(1), &config, &mut flash);

        assert_eq!(capture.start_cluster(), 3);
        assert_eq!(
            event,
            CaptureEvent::Programmed {
                address: 0x4800,
                erased: false
            }
        );
        assert_eq!(flash.erase_count(), 240);
    }

    #[test]
    fn test_blocks_outside_window_are_ignored() {
        let (config, mut flash, mut capture) = setup();
        capture.write_block(39, &firmware_block(0), &config, &mut flash);
        let event = capture.write_block(519, &[1u8; 512], &config, &mut flash);

        assert_eq!(event, CaptureEvent::Ignored);
        assert_eq!(flash.write_count(), 1);
    }

    #[test]
    fn test_directory_rewrite_moves_window_while_idle() {
        let (config, _, mut capture) = setup();
        let mut dir = [0u8; 512];
        dir[0..11].copy_from_slice(b"FIRMWAREBIN");
        dir[11] = 0x20;
        dir[26..28].copy_from_slice(&5u16.to_le_bytes());

        capture.track_directory(&dir, &config);
        assert_eq!(capture.start_cluster(), 5);
        assert_eq!(capture.window(&config).start, 47);
    }

    #[test]
    fn test_directory_rewrite_ignored_while_capturing() {
        let (config, mut flash, mut capture) = setup();
        capture.write_block(39, &firmware_block(0), &config, &mut flash);

        let mut dir = [0u8; 512];
        dir[0..11].copy_from_slice(b"FIRMWAREBIN");
        dir[11] = 0x20;
        dir[26..28].copy_from_slice(&9u16.to_le_bytes());
        capture.track_directory(&dir, &config);

        assert_eq!(capture.start_cluster(), 3);
    }

    #[test]
    fn test_directory_cluster_that_overflows_volume_is_ignored() {
        let (config, _, mut capture) = setup();
        let mut dir = [0u8; 512];
        dir[0..11].copy_from_slice(b"FIRMWAREBIN");
        dir[11] = 0x20;
        dir[26..28].copy_from_slice(&200u16.to_le_bytes());

        capture.track_directory(&dir, &config);
        assert_eq!(capture.start_cluster(), 3);
    }

    #[test]
    fn test_flash_failure_faults_session() {
        let (config, mut flash, mut capture) = setup();
        capture.write_block(39, &firmware_block(0), &config, &mut flash);
        // rewriting a programmed block without an erase is refused by NOR flash
        let event = capture.write_block(40, &[0u8; 512], &config, &mut flash);
        assert_eq!(
            event,
            CaptureEvent::Programmed {
                address: 0x4200,
                erased: false
            }
        );
        let event = capture.write_block(40, &[1u8; 512], &config, &mut flash);

        assert_eq!(
            event,
            CaptureEvent::Faulted(FlashError::Device { offset: 0x4200 })
        );
        assert!(matches!(capture.state(), CaptureState::Faulted(_)));

        let event = capture.write_block(41, &[1u8; 512], &config, &mut flash);
        assert_eq!(event, CaptureEvent::Ignored);
        assert_eq!(flash.write_count(), 2);
    }

    #[test]
    fn test_unaligned_region_faults_on_erase() {
        let mut config = DiskConfig::default();
        config.target.upload_start = 0x4200;
        let mut flash = MemoryFlash::new(0x4200, config.target.upload_length as usize);
        let mut capture = FirmwareCapture::new(config.file.start_cluster);

        let event = capture.write_block(39, &firmware_block(0), &config, &mut flash);
        assert_eq!(
            event,
            CaptureEvent::Faulted(FlashError::NotAligned { offset: 0x4200 })
        );
        assert_eq!(flash.erase_count(), 0);
        assert_eq!(capture.blocks_programmed(), 0);
    }
}
