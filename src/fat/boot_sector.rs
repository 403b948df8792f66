//! FAT12 Boot Sector Structure

use super::constants::*;
use crate::config::VolumeGeometry;
use crate::constants::volume::*;

/// BIOS parameter block of the virtual volume
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootSector {
    /// Jump instruction to boot code
    pub jump_boot: [u8; 3],

    /// Name of the system that formatted the volume
    pub oem_name: [u8; 8],

    /// Number of bytes per sector
    pub bytes_per_sector: u16,

    /// Number of sectors per cluster
    pub sectors_per_cluster: u8,

    /// Number of reserved sectors at start of volume, including the boot sector
    pub reserved_sectors: u16,

    /// Number of FAT copies
    pub fat_count: u8,

    /// Maximum number of root directory entries
    pub root_dir_entries: u16,

    /// Total number of sectors (16-bit)
    pub total_sectors_16: u16,

    /// Media type descriptor
    pub media_type: u8,

    /// Size of each FAT copy in sectors
    pub sectors_per_fat: u16,

    /// Sectors per track for interrupt 0x13
    pub sectors_per_track: u16,

    /// Number of heads for interrupt 0x13
    pub head_count: u16,

    /// Number of hidden sectors preceding the partition
    pub hidden_sectors: u32,

    /// Total number of sectors (32-bit), zero when the 16-bit field is used
    pub total_sectors_32: u32,

    /// INT 13h drive number
    pub drive_number: u8,

    /// Reserved byte
    pub reserved1: u8,

    /// Extended boot signature
    pub boot_signature: u8,

    /// Volume serial number
    pub volume_id: u32,

    /// Volume label
    pub volume_label: [u8; 11],

    /// Filesystem type string
    pub fs_type: [u8; 8],
}

impl BootSector {
    /// Parameter block describing `geometry`
    pub fn for_geometry(geometry: &VolumeGeometry) -> Self {
        Self {
            jump_boot: [0xEB, 0x3C, 0x90],
            oem_name: OEM_NAME,
            bytes_per_sector: geometry.block_size as u16,
            sectors_per_cluster: geometry.sectors_per_cluster,
            reserved_sectors: geometry.reserved_sectors,
            fat_count: geometry.fat_copies,
            root_dir_entries: geometry.root_entries,
            total_sectors_16: geometry.total_blocks as u16,
            media_type: MEDIA_FIXED_DISK,
            sectors_per_fat: geometry.sectors_per_fat,
            sectors_per_track: SECTORS_PER_TRACK,
            head_count: HEAD_COUNT,
            hidden_sectors: 0,
            total_sectors_32: 0,
            drive_number: 0,
            reserved1: 0,
            boot_signature: EXTENDED_BOOT_SIGNATURE,
            volume_id: VOLUME_SERIAL,
            volume_label: VOLUME_LABEL,
            fs_type: FS_TYPE,
        }
    }

    /// Serializes the parameter block into the start of `block` and stamps
    /// the end-of-sector signature. `block` must be a full sector.
    pub fn write_to(&self, block: &mut [u8]) {
        block[0..3].copy_from_slice(&self.jump_boot);
        block[3..11].copy_from_slice(&self.oem_name);
        block[11..13].copy_from_slice(&self.bytes_per_sector.to_le_bytes());
        block[13] = self.sectors_per_cluster;
        block[14..16].copy_from_slice(&self.reserved_sectors.to_le_bytes());
        block[16] = self.fat_count;
        block[17..19].copy_from_slice(&self.root_dir_entries.to_le_bytes());
        block[19..21].copy_from_slice(&self.total_sectors_16.to_le_bytes());
        block[21] = self.media_type;
        block[22..24].copy_from_slice(&self.sectors_per_fat.to_le_bytes());
        block[24..26].copy_from_slice(&self.sectors_per_track.to_le_bytes());
        block[26..28].copy_from_slice(&self.head_count.to_le_bytes());
        block[28..32].copy_from_slice(&self.hidden_sectors.to_le_bytes());
        block[32..36].copy_from_slice(&self.total_sectors_32.to_le_bytes());
        block[36] = self.drive_number;
        block[37] = self.reserved1;
        block[38] = self.boot_signature;
        block[39..43].copy_from_slice(&self.volume_id.to_le_bytes());
        block[43..54].copy_from_slice(&self.volume_label);
        block[54..62].copy_from_slice(&self.fs_type);
        stamp_signature(block);
    }
}

/// Forces the `0x55 0xAA` end-of-sector signature.
pub fn stamp_signature(block: &mut [u8]) {
    block[BOOT_SIGNATURE_OFFSET..BOOT_SIGNATURE_OFFSET + 2].copy_from_slice(&BOOT_SIGNATURE);
}
