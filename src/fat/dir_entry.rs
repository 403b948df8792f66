//! FAT12 directory entry structures and the tracked-file lookup

use super::constants::*;
use crate::config::FileConfig;
use arrayvec::ArrayVec;

/// Packed FAT date/time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FatTimestamp {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl FatTimestamp {
    /// Date word: years since 1980 in bits 9..16, month 5..9, day 0..5
    pub const fn date(&self) -> u16 {
        ((self.year - 1980) << 9) | ((self.month as u16) << 5) | self.day as u16
    }

    /// Time word: hour in bits 11..16, minute 5..11, seconds / 2 in 0..5
    pub const fn time(&self) -> u16 {
        ((self.hour as u16) << 11) | ((self.minute as u16) << 5) | (self.second as u16 >> 1)
    }
}

/// 8.3 format directory entry (32 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirEntry83 {
    /// 8 character filename
    pub name: [u8; MAX_FILENAME_LENGTH],

    /// 3 character extension
    pub ext: [u8; MAX_EXTENSION_LENGTH],

    /// File attributes (read-only, directory, etc)
    pub attributes: u8,

    /// Reserved for Windows NT
    pub reserved: u8,

    /// Creation time, 10 ms units
    pub creation_ms: u8,

    /// Creation time
    pub creation_time: u16,

    /// Creation date
    pub creation_date: u16,

    /// Last access date
    pub access_date: u16,

    /// High half of the first cluster, always zero on FAT12
    pub cluster_high: u16,

    /// Modification time
    pub time: u16,

    /// Modification date
    pub date: u16,

    /// First cluster number
    pub start_cluster: u16,

    /// File size in bytes
    pub file_size: u32,
}

impl DirEntry83 {
    /// Creates an archive file entry stamped with `stamp` for every date field
    pub fn new_file(
        name: [u8; MAX_FILENAME_LENGTH],
        ext: [u8; MAX_EXTENSION_LENGTH],
        start_cluster: u16,
        file_size: u32,
        stamp: FatTimestamp,
    ) -> Self {
        Self {
            name,
            ext,
            attributes: ATTR_ARCHIVE,
            reserved: 0,
            creation_ms: 0,
            creation_time: stamp.time(),
            creation_date: stamp.date(),
            access_date: stamp.date(),
            cluster_high: 0,
            time: stamp.time(),
            date: stamp.date(),
            start_cluster,
            file_size,
        }
    }

    pub fn parse(raw: &[u8; DIR_ENTRY_SIZE]) -> Self {
        let word = |at: usize| u16::from_le_bytes([raw[at], raw[at + 1]]);
        let mut name = [0u8; MAX_FILENAME_LENGTH];
        name.copy_from_slice(&raw[0..8]);
        let mut ext = [0u8; MAX_EXTENSION_LENGTH];
        ext.copy_from_slice(&raw[8..11]);

        Self {
            name,
            ext,
            attributes: raw[11],
            reserved: raw[12],
            creation_ms: raw[13],
            creation_time: word(14),
            creation_date: word(16),
            access_date: word(18),
            cluster_high: word(20),
            time: word(22),
            date: word(24),
            start_cluster: word(26),
            file_size: u32::from_le_bytes([raw[28], raw[29], raw[30], raw[31]]),
        }
    }

    pub fn to_bytes(&self) -> [u8; DIR_ENTRY_SIZE] {
        let mut raw = [0u8; DIR_ENTRY_SIZE];
        raw[0..8].copy_from_slice(&self.name);
        raw[8..11].copy_from_slice(&self.ext);
        raw[11] = self.attributes;
        raw[12] = self.reserved;
        raw[13] = self.creation_ms;
        raw[14..16].copy_from_slice(&self.creation_time.to_le_bytes());
        raw[16..18].copy_from_slice(&self.creation_date.to_le_bytes());
        raw[18..20].copy_from_slice(&self.access_date.to_le_bytes());
        raw[20..22].copy_from_slice(&self.cluster_high.to_le_bytes());
        raw[22..24].copy_from_slice(&self.time.to_le_bytes());
        raw[24..26].copy_from_slice(&self.date.to_le_bytes());
        raw[26..28].copy_from_slice(&self.start_cluster.to_le_bytes());
        raw[28..32].copy_from_slice(&self.file_size.to_le_bytes());
        raw
    }

    /// Name and extension as stored on disk, space padded
    pub fn short_name(&self) -> [u8; 11] {
        let mut out = [0u8; 11];
        out[..8].copy_from_slice(&self.name);
        out[8..].copy_from_slice(&self.ext);
        out
    }

    /// Returns true if entry is marked as deleted
    pub fn is_deleted(&self) -> bool {
        self.name[0] == DELETED_ENTRY_MARKER
    }

    /// Returns true if entry is empty/unused
    pub fn is_free(&self) -> bool {
        self.name[0] == 0x00
    }

    /// Returns true if entry is one slot of a long file name
    pub fn is_long_name(&self) -> bool {
        self.attributes & ATTR_LONG_NAME == ATTR_LONG_NAME
    }

    /// Returns true for a live entry describing a plain file
    pub fn is_regular_file(&self) -> bool {
        !self.is_free()
            && !self.is_deleted()
            && !self.is_long_name()
            && self.attributes & (ATTR_DIRECTORY | ATTR_VOLUME_ID) == 0
    }
}

/// Checksum of an 8.3 name, stored in each of its long-name entries
pub fn lfn_checksum(short_name: &[u8; 11]) -> u8 {
    short_name
        .iter()
        .fold(0u8, |sum, &c| sum.rotate_right(1).wrapping_add(c))
}

/// Builds the single long-name entry preceding an 8.3 entry.
///
/// Names longer than [`LFN_CHARS_PER_ENTRY`] are truncated; configuration
/// validation rejects them before they get here.
pub fn long_name_entry(long_name: &str, checksum: u8) -> [u8; DIR_ENTRY_SIZE] {
    let mut units: ArrayVec<u16, LFN_CHARS_PER_ENTRY> = long_name
        .bytes()
        .take(LFN_CHARS_PER_ENTRY)
        .map(u16::from)
        .collect();
    if !units.is_full() {
        units.push(0x0000);
    }
    while !units.is_full() {
        units.push(0xFFFF);
    }

    // UTF-16 slots are split 5 / 6 / 2 around the fixed fields
    const SLOTS: [usize; LFN_CHARS_PER_ENTRY] = [1, 3, 5, 7, 9, 14, 16, 18, 20, 22, 24, 28, 30];

    let mut raw = [0u8; DIR_ENTRY_SIZE];
    raw[0] = LAST_LONG_ENTRY | 1;
    raw[11] = ATTR_LONG_NAME;
    raw[12] = 0;
    raw[13] = checksum;
    for (unit, at) in units.iter().zip(SLOTS) {
        raw[at..at + 2].copy_from_slice(&unit.to_le_bytes());
    }
    raw
}

/// Finds the starting cluster of the tracked file in a root directory block.
///
/// Prefers the entry carrying the configured 8.3 name; when the host has
/// replaced the file under a different name, falls back to the first live
/// regular file that owns a cluster.
pub fn tracked_start_cluster(dir_block: &[u8], file: &FileConfig) -> Option<u16> {
    let mut fallback = None;

    for raw in dir_block.chunks_exact(DIR_ENTRY_SIZE) {
        let mut slot = [0u8; DIR_ENTRY_SIZE];
        slot.copy_from_slice(raw);
        let entry = DirEntry83::parse(&slot);

        if entry.is_free() {
            break;
        }
        if !entry.is_regular_file() || entry.start_cluster < FIRST_DATA_CLUSTER {
            continue;
        }
        if entry.short_name() == file.short_name() {
            return Some(entry.start_cluster);
        }
        fallback.get_or_insert(entry.start_cluster);
    }

    fallback
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stamp() -> FatTimestamp {
        FatTimestamp {
            year: 2017,
            month: 5,
            day: 14,
            hour: 23,
            minute: 15,
            second: 0,
        }
    }

    #[test]
    fn test_timestamp_packing() {
        let packed = ((stamp().date() as u32) << 16) | stamp().time() as u32;
        let expected =
            ((2017 - 1980) << 25) | (5 << 21) | (14 << 16) | (23 << 11) | (15 << 5);
        assert_eq!(packed, expected);
    }

    #[test]
    fn test_lfn_checksum_matches_known_names() {
        assert_eq!(lfn_checksum(b"FIRMWAREBIN"), 0x57);
        assert_eq!(lfn_checksum(b"FIRMWARESIG"), 0x14);
    }

    #[test]
    fn test_long_name_entry_layout() {
        let raw = long_name_entry("firmware.bin", 0x57);
        assert_eq!(raw[0], 0x41);
        assert_eq!(&raw[1..11], b"f\0i\0r\0m\0w\0");
        assert_eq!(raw[11], ATTR_LONG_NAME);
        assert_eq!(raw[13], 0x57);
        assert_eq!(&raw[14..26], b"a\0r\0e\0.\0b\0i\0");
        assert_eq!(&raw[26..28], &[0, 0]);
        assert_eq!(&raw[28..32], b"n\0\0\0");
    }

    #[test]
    fn test_long_name_entry_pads_after_terminator() {
        let raw = long_name_entry("a.b", 0);
        assert_eq!(&raw[1..9], b"a\0.\0b\0\0\0");
        assert_eq!(&raw[9..11], &[0xFF, 0xFF]);
        assert_eq!(&raw[30..32], &[0xFF, 0xFF]);
    }

    #[test]
    fn test_entry_bytes_roundtrip_fields() {
        let entry = DirEntry83::new_file(*b"FIRMWARE", *b"BIN", 3, 0x3_C000, stamp());
        let raw = entry.to_bytes();
        assert_eq!(&raw[0..11], b"FIRMWAREBIN");
        assert_eq!(raw[11], ATTR_ARCHIVE);
        assert_eq!(&raw[26..28], &3u16.to_le_bytes());
        assert_eq!(&raw[28..32], &0x3_C000u32.to_le_bytes());
        assert_eq!(DirEntry83::parse(&raw), entry);
    }

    #[test]
    fn test_tracked_cluster_skips_long_name_and_deleted() {
        let file = FileConfig::firmware_bin();
        let mut block = [0u8; 512];
        block[0..32].copy_from_slice(&long_name_entry("firmware.bin", 0x57));
        let mut old = DirEntry83::new_file(*b"FIRMWARE", *b"BIN", 3, 10, stamp());
        old.name[0] = DELETED_ENTRY_MARKER;
        block[32..64].copy_from_slice(&old.to_bytes());
        let new = DirEntry83::new_file(*b"FIRMWARE", *b"BIN", 9, 10, stamp());
        block[64..96].copy_from_slice(&new.to_bytes());

        assert_eq!(tracked_start_cluster(&block, &file), Some(9));
    }

    #[test]
    fn test_tracked_cluster_prefers_configured_name() {
        let file = FileConfig::firmware_bin();
        let mut block = [0u8; 512];
        let other = DirEntry83::new_file(*b"README  ", *b"TXT", 40, 10, stamp());
        block[0..32].copy_from_slice(&other.to_bytes());
        let ours = DirEntry83::new_file(*b"FIRMWARE", *b"BIN", 5, 10, stamp());
        block[32..64].copy_from_slice(&ours.to_bytes());

        assert_eq!(tracked_start_cluster(&block, &file), Some(5));
    }

    #[test]
    fn test_tracked_cluster_falls_back_to_renamed_file() {
        let file = FileConfig::firmware_bin();
        let mut block = [0u8; 512];
        let renamed = DirEntry83::new_file(*b"APP     ", *b"BIN", 12, 10, stamp());
        block[0..32].copy_from_slice(&renamed.to_bytes());

        assert_eq!(tracked_start_cluster(&block, &file), Some(12));
    }

    #[test]
    fn test_tracked_cluster_ignores_empty_files() {
        let file = FileConfig::firmware_bin();
        let mut block = [0u8; 512];
        let empty = DirEntry83::new_file(*b"FIRMWARE", *b"BIN", 0, 0, stamp());
        block[0..32].copy_from_slice(&empty.to_bytes());

        assert_eq!(tracked_start_cluster(&block, &file), None);
    }
}
