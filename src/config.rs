//! Runtime configuration of the virtual disk.
//!
//! Every field defaults to the values in [`crate::constants`]; targets with a
//! different flash layout or vector table build their own [`DiskConfig`] and
//! hand it to [`crate::disk::RamDisk::new`], which validates it first.

use crate::constants::{target::*, volume::*};
use crate::error::ConfigError;
use crate::fat::constants::{DIR_ENTRY_SIZE, FIRST_DATA_CLUSTER, LFN_CHARS_PER_ENTRY};
use crate::fat::fat_table::entries_in;
use crate::fat::FatTimestamp;
use crate::signature::FirmwareSignature;

/// Shape of the FAT12 volume presented to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeGeometry {
    pub block_size: usize,
    pub sectors_per_cluster: u8,
    pub reserved_sectors: u16,
    pub fat_copies: u8,
    pub sectors_per_fat: u16,
    pub root_entries: u16,
    pub total_blocks: u32,
}

impl VolumeGeometry {
    /// First block of the FAT region
    pub fn fat_start(&self) -> u32 {
        self.reserved_sectors as u32
    }

    /// First block of the root directory
    pub fn root_dir_start(&self) -> u32 {
        self.fat_start() + self.fat_copies as u32 * self.sectors_per_fat as u32
    }

    /// First block of cluster 2
    pub fn data_region_start(&self) -> u32 {
        self.root_dir_start()
            + (self.root_entries as usize * DIR_ENTRY_SIZE / self.block_size) as u32
    }

    pub fn cluster_bytes(&self) -> u32 {
        self.sectors_per_cluster as u32 * self.block_size as u32
    }

    /// First block of `cluster`
    pub fn cluster_to_block(&self, cluster: u16) -> u32 {
        self.data_region_start()
            + (cluster - FIRST_DATA_CLUSTER) as u32 * self.sectors_per_cluster as u32
    }

    /// Cluster containing data-area `block`
    pub fn block_to_cluster(&self, block: u32) -> u16 {
        ((block - self.data_region_start()) / self.sectors_per_cluster as u32) as u16
            + FIRST_DATA_CLUSTER
    }
}

impl Default for VolumeGeometry {
    fn default() -> Self {
        Self {
            block_size: BLOCK_SIZE,
            sectors_per_cluster: SECTORS_PER_CLUSTER,
            reserved_sectors: RESERVED_SECTORS,
            fat_copies: FAT_COPIES,
            sectors_per_fat: SECTORS_PER_FAT,
            root_entries: ROOT_ENTRIES,
            total_blocks: TOTAL_BLOCKS,
        }
    }
}

/// Flash layout and image recognition for the target part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetConfig {
    pub upload_start: u32,
    pub upload_length: u32,
    pub erase_size: u32,
    pub signature: FirmwareSignature,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            upload_start: UPLOAD_START,
            upload_length: UPLOAD_LENGTH,
            erase_size: FLASH_ERASE_SIZE,
            signature: FirmwareSignature::cortex_m(),
        }
    }
}

/// The single file shown on the volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileConfig {
    pub name: [u8; 8],
    pub ext: [u8; 3],
    pub long_name: Option<&'static str>,
    pub timestamp: FatTimestamp,
    pub start_cluster: u16,
}

impl FileConfig {
    const STAMP: FatTimestamp = FatTimestamp {
        year: 2017,
        month: 5,
        day: 14,
        hour: 23,
        minute: 15,
        second: 0,
    };

    /// Plain image, `firmware.bin`
    pub const fn firmware_bin() -> Self {
        Self {
            name: *b"FIRMWARE",
            ext: *b"BIN",
            long_name: Some("firmware.bin"),
            timestamp: Self::STAMP,
            start_cluster: FIRMWARE_START_CLUSTER,
        }
    }

    /// Signed image, `firmware.sig`
    pub const fn firmware_sig() -> Self {
        Self {
            name: *b"FIRMWARE",
            ext: *b"SIG",
            long_name: Some("firmware.sig"),
            timestamp: Self::STAMP,
            start_cluster: FIRMWARE_START_CLUSTER,
        }
    }

    pub fn short_name(&self) -> [u8; 11] {
        let mut out = [0u8; 11];
        out[..8].copy_from_slice(&self.name);
        out[8..].copy_from_slice(&self.ext);
        out
    }
}

impl Default for FileConfig {
    fn default() -> Self {
        Self::firmware_bin()
    }
}

/// What the host sees when it reads the payload region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadBack {
    /// Current flash contents
    #[default]
    Flash,
    /// A fixed text pattern, flash is never read
    Disabled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DiskConfig {
    pub geometry: VolumeGeometry,
    pub target: TargetConfig,
    pub file: FileConfig,
    pub read_back: ReadBack,
}

impl DiskConfig {
    /// Blocks covered by the upload window
    pub fn upload_blocks(&self) -> u32 {
        self.target.upload_length / self.geometry.block_size as u32
    }

    /// Clusters the firmware file occupies
    pub fn upload_clusters(&self) -> u16 {
        self.target.upload_length.div_ceil(self.geometry.cluster_bytes()) as u16
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let g = &self.geometry;
        let t = &self.target;

        if g.block_size != BLOCK_SIZE {
            return Err(ConfigError::UnsupportedBlockSize(g.block_size));
        }
        if g.sectors_per_cluster == 0 {
            return Err(ConfigError::ZeroSectorsPerCluster);
        }
        if g.sectors_per_fat != 1 {
            return Err(ConfigError::UnsupportedFatSize(g.sectors_per_fat));
        }
        if t.upload_length == 0 {
            return Err(ConfigError::EmptyUpload);
        }
        if t.upload_length % g.block_size as u32 != 0 {
            return Err(ConfigError::UploadNotBlockAligned);
        }
        if t.erase_size == 0 || t.upload_length % t.erase_size != 0 {
            return Err(ConfigError::UploadNotEraseAligned);
        }
        if t.upload_start % t.erase_size != 0 {
            return Err(ConfigError::UploadStartNotEraseAligned);
        }
        if self.file.start_cluster < FIRST_DATA_CLUSTER {
            return Err(ConfigError::InvalidStartCluster(self.file.start_cluster));
        }

        let last_cluster = self.file.start_cluster as usize + self.upload_clusters() as usize - 1;
        if last_cluster >= entries_in(g.block_size) {
            return Err(ConfigError::ChainDoesNotFitFat);
        }

        let window_end =
            g.cluster_to_block(self.file.start_cluster) as u64 + self.upload_blocks() as u64;
        if g.total_blocks > u16::MAX as u32 || window_end > g.total_blocks as u64 {
            return Err(ConfigError::WindowOutsideVolume);
        }

        if let Some(long_name) = self.file.long_name {
            if !long_name.is_ascii() {
                return Err(ConfigError::LongNameNotAscii);
            }
            if long_name.len() > LFN_CHARS_PER_ENTRY {
                return Err(ConfigError::LongNameTooLong);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout() {
        let g = VolumeGeometry::default();
        assert_eq!(g.root_dir_start(), 3);
        assert_eq!(g.data_region_start(), 35);
        assert_eq!(g.cluster_to_block(3), 39);
        assert_eq!(g.block_to_cluster(39), 3);
        assert_eq!(g.block_to_cluster(42), 3);
        assert_eq!(g.block_to_cluster(43), 4);
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = DiskConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.upload_blocks(), 480);
        assert_eq!(config.upload_clusters(), 120);
    }

    #[test]
    fn test_rejects_unaligned_upload() {
        let mut config = DiskConfig::default();
        config.target.upload_length = 0x3_C200;
        assert_eq!(config.validate(), Err(ConfigError::UploadNotEraseAligned));

        config.target.upload_length = 0x3_C010;
        assert_eq!(config.validate(), Err(ConfigError::UploadNotBlockAligned));
    }

    #[test]
    fn test_rejects_upload_start_inside_erase_unit() {
        let mut config = DiskConfig::default();
        config.target.upload_start = 0x4200;
        assert_eq!(
            config.validate(),
            Err(ConfigError::UploadStartNotEraseAligned)
        );

        config.target.upload_start = 0x4400;
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_rejects_window_past_volume() {
        let mut config = DiskConfig::default();
        config.file.start_cluster = 200;
        assert_eq!(config.validate(), Err(ConfigError::WindowOutsideVolume));
    }

    #[test]
    fn test_rejects_chain_larger_than_fat() {
        let mut config = DiskConfig::default();
        config.geometry.total_blocks = 4096;
        config.geometry.sectors_per_cluster = 1;
        config.target.upload_length = 400 * 512;
        assert_eq!(config.validate(), Err(ConfigError::ChainDoesNotFitFat));
    }

    #[test]
    fn test_rejects_bad_long_name() {
        let mut config = DiskConfig::default();
        config.file.long_name = Some("firmware-image.bin");
        assert_eq!(config.validate(), Err(ConfigError::LongNameTooLong));

        config.file.long_name = Some("fïrmware.bin");
        assert_eq!(config.validate(), Err(ConfigError::LongNameNotAscii));

        config.file.long_name = None;
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_rejects_reserved_start_cluster() {
        let mut config = DiskConfig::default();
        config.file.start_cluster = 1;
        assert_eq!(config.validate(), Err(ConfigError::InvalidStartCluster(1)));
    }
}
