//! FAT12 allocation table entries

use super::constants::*;

/// Represents a 12-bit FAT entry pointing to the next cluster in a chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FatEntry {
    /// Cluster number or special value (0=free, >=0xFF8=end)
    pub cluster: u16,
}

impl FatEntry {
    pub const END_OF_CHAIN: FatEntry = FatEntry {
        cluster: FAT12_END_OF_CHAIN,
    };

    /// Returns true if this entry marks the end of a cluster chain
    pub fn is_end_of_chain(&self) -> bool {
        self.cluster >= 0xFF8
    }

    /// Returns true if this cluster is unused/free
    pub fn is_free(&self) -> bool {
        self.cluster == 0
    }
}

/// Number of FAT12 entries that fit in `bytes` of table.
pub fn entries_in(bytes: usize) -> usize {
    bytes * 2 / 3
}

/// Reads entry `cluster` from a packed FAT12 table.
pub fn read_entry(table: &[u8], cluster: u16) -> FatEntry {
    let idx = cluster as usize * 3 / 2;
    let word = u16::from_le_bytes([table[idx], table[idx + 1]]);
    let value = if cluster % 2 == 0 {
        word & 0x0FFF
    } else {
        word >> 4
    };
    FatEntry { cluster: value }
}

/// Writes entry `cluster` into a packed FAT12 table, keeping the neighbouring nibble.
pub fn write_entry(table: &mut [u8], cluster: u16, entry: FatEntry) {
    let idx = cluster as usize * 3 / 2;
    let mut word = u16::from_le_bytes([table[idx], table[idx + 1]]);
    let value = entry.cluster & 0x0FFF;
    if cluster % 2 == 0 {
        word = (word & 0xF000) | value;
    } else {
        word = (word & 0x000F) | (value << 4);
    }
    table[idx..idx + 2].copy_from_slice(&word.to_le_bytes());
}

/// Fills `table` with the reserved media entries and one contiguous chain
/// `start -> start + 1 -> ... -> EOF` covering `clusters` clusters.
pub fn write_contiguous_chain(table: &mut [u8], media_type: u8, start: u16, clusters: u16) {
    table.fill(0);
    let media = FatEntry {
        cluster: 0xF00 | media_type as u16,
    };
    write_entry(table, 0, media);
    write_entry(table, 1, FatEntry::END_OF_CHAIN);

    let last = start + clusters - 1;
    for cluster in start..last {
        write_entry(table, cluster, FatEntry { cluster: cluster + 1 });
    }
    write_entry(table, last, FatEntry::END_OF_CHAIN);
}
