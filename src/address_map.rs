//! Logical block classification.
//!
//! The volume only stores three metadata blocks; everything else is either
//! the firmware file's payload window, backed by flash, or empty space.

use crate::config::VolumeGeometry;

/// Blocks currently holding the tracked file's contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadWindow {
    /// First block of the file
    pub start: u32,
    /// Length of the window in blocks
    pub len: u32,
}

impl PayloadWindow {
    pub fn end(&self) -> u32 {
        self.start + self.len
    }

    pub fn contains(&self, block: u32) -> bool {
        (self.start..self.end()).contains(&block)
    }
}

/// Region a logical block belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    BootSector,
    /// Any FAT copy; all copies share the same buffer
    Fat,
    Directory,
    /// Block `offset` of the firmware file
    Payload { offset: u32 },
    /// Data-area cluster outside the payload window
    Data,
    /// Reserved or root-directory blocks that are never stored, and
    /// anything past the end of the volume
    Unused,
}

/// Classifies `block` against the volume layout and the current window.
pub fn classify(block: u32, geometry: &VolumeGeometry, window: &PayloadWindow) -> Region {
    let fat_start = geometry.fat_start();
    let root_dir_start = geometry.root_dir_start();

    if block == 0 {
        Region::BootSector
    } else if (fat_start..root_dir_start).contains(&block) {
        Region::Fat
    } else if block == root_dir_start {
        Region::Directory
    } else if block >= geometry.total_blocks {
        Region::Unused
    } else if window.contains(block) {
        Region::Payload {
            offset: block - window.start,
        }
    } else if block >= geometry.data_region_start() {
        Region::Data
    } else {
        Region::Unused
    }
}
