// 512 KiB FAT12 volume, one FAT sector per copy

pub const BLOCK_SIZE: usize = 512;
pub const SECTORS_PER_CLUSTER: u8 = 4;
pub const RESERVED_SECTORS: u16 = 1;
pub const FAT_COPIES: u8 = 2;
pub const SECTORS_PER_FAT: u16 = 1;
pub const ROOT_ENTRIES: u16 = 512;
pub const TOTAL_BLOCKS: u32 = 1024;

pub const SECTORS_PER_TRACK: u16 = 32;
pub const HEAD_COUNT: u16 = 64;
pub const MEDIA_FIXED_DISK: u8 = 0xF8;
pub const VOLUME_SERIAL: u32 = 0x53AD_1769;
pub const OEM_NAME: [u8; 8] = *b"mkdosfs\0";
pub const VOLUME_LABEL: [u8; 11] = *b"FIRMWARE   ";
pub const FS_TYPE: [u8; 8] = *b"FAT12   ";

/// Cluster the firmware file occupies until the host says otherwise.
pub const FIRMWARE_START_CLUSTER: u16 = 3;
