//! FAT12 on-disk constants

/// Size of a directory entry in bytes
pub const DIR_ENTRY_SIZE: usize = 32;

/// Maximum length of filename excluding extension
pub const MAX_FILENAME_LENGTH: usize = 8;

/// Maximum length of file extension
pub const MAX_EXTENSION_LENGTH: usize = 3;

/// UTF-16 characters held by one long-file-name entry
pub const LFN_CHARS_PER_ENTRY: usize = 13;

/// File attribute: Read-only
pub const ATTR_READ_ONLY: u8 = 0x01;

/// File attribute: Hidden
pub const ATTR_HIDDEN: u8 = 0x02;

/// File attribute: System
pub const ATTR_SYSTEM: u8 = 0x04;

/// File attribute: Volume label
pub const ATTR_VOLUME_ID: u8 = 0x08;

/// File attribute: Directory
pub const ATTR_DIRECTORY: u8 = 0x10;

/// File attribute: Archive
pub const ATTR_ARCHIVE: u8 = 0x20;

/// Attribute combination marking a long-file-name entry
pub const ATTR_LONG_NAME: u8 = ATTR_READ_ONLY | ATTR_HIDDEN | ATTR_SYSTEM | ATTR_VOLUME_ID;

/// Sequence-number flag on the last (first stored) long-name entry
pub const LAST_LONG_ENTRY: u8 = 0x40;

/// Marker for deleted directory entries
pub const DELETED_ENTRY_MARKER: u8 = 0xE5;

/// FAT12 end-of-chain marker
pub const FAT12_END_OF_CHAIN: u16 = 0xFFF;

/// Boot sector signature bytes at offset 510
pub const BOOT_SIGNATURE_OFFSET: usize = 510;
pub const BOOT_SIGNATURE: [u8; 2] = [0x55, 0xAA];

/// Extended boot signature marking the presence of serial/label/type
pub const EXTENDED_BOOT_SIGNATURE: u8 = 0x29;

/// First cluster number that maps to the data area
pub const FIRST_DATA_CLUSTER: u16 = 2;
