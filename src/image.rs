//! The three stored metadata blocks of the volume.

use crate::address_map::Region;
use crate::config::DiskConfig;
use crate::constants::volume::{BLOCK_SIZE, MEDIA_FIXED_DISK};
use crate::fat::constants::DIR_ENTRY_SIZE;
use crate::fat::dir_entry::{lfn_checksum, long_name_entry, DirEntry83};
use crate::fat::{fat_table, BootSector};

type Block = [u8; BLOCK_SIZE];

/// Boot sector, FAT and root directory block as last written.
///
/// Generated from the configuration at start-up, then replaced verbatim by
/// whatever the host writes.
pub struct VolumeImage {
    boot_sector: Block,
    fat: Block,
    directory: Block,
}

impl VolumeImage {
    pub fn new(config: &DiskConfig) -> Self {
        let mut boot_sector = [0u8; BLOCK_SIZE];
        BootSector::for_geometry(&config.geometry).write_to(&mut boot_sector);

        let mut fat = [0u8; BLOCK_SIZE];
        fat_table::write_contiguous_chain(
            &mut fat,
            MEDIA_FIXED_DISK,
            config.file.start_cluster,
            config.upload_clusters(),
        );

        let mut directory = [0u8; BLOCK_SIZE];
        let file = &config.file;
        let entry = DirEntry83::new_file(
            file.name,
            file.ext,
            file.start_cluster,
            config.target.upload_length,
            file.timestamp,
        );
        let mut slot = 0;
        if let Some(long_name) = file.long_name {
            let checksum = lfn_checksum(&entry.short_name());
            directory[..DIR_ENTRY_SIZE].copy_from_slice(&long_name_entry(long_name, checksum));
            slot = DIR_ENTRY_SIZE;
        }
        directory[slot..slot + DIR_ENTRY_SIZE].copy_from_slice(&entry.to_bytes());

        Self {
            boot_sector,
            fat,
            directory,
        }
    }

    /// Stored block for a metadata region, `None` for everything else
    pub fn block(&self, region: Region) -> Option<&Block> {
        match region {
            Region::BootSector => Some(&self.boot_sector),
            Region::Fat => Some(&self.fat),
            Region::Directory => Some(&self.directory),
            _ => None,
        }
    }

    pub fn block_mut(&mut self, region: Region) -> Option<&mut Block> {
        match region {
            Region::BootSector => Some(&mut self.boot_sector),
            Region::Fat => Some(&mut self.fat),
            Region::Directory => Some(&mut self.directory),
            _ => None,
        }
    }

    pub fn directory(&self) -> &Block {
        &self.directory
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FileConfig;
    use crate::fat::dir_entry::tracked_start_cluster;
    use crate::fat::fat_table::read_entry;

    #[test]
    fn test_directory_holds_long_and_short_entry() {
        let image = VolumeImage::new(&DiskConfig::default());
        let dir = image.directory();

        assert_eq!(dir[0], 0x41);
        assert_eq!(dir[11], 0x0F);
        assert_eq!(dir[13], 0x57);
        assert_eq!(&dir[32..43], b"FIRMWAREBIN");
        assert_eq!(dir[43], 0x20);
        assert_eq!(&dir[58..60], &3u16.to_le_bytes());
        assert_eq!(&dir[60..64], &0x3_C000u32.to_le_bytes());
        assert!(dir[64..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_signed_variant_directory() {
        let config = DiskConfig {
            file: FileConfig::firmware_sig(),
            ..DiskConfig::default()
        };
        let image = VolumeImage::new(&config);
        let dir = image.directory();

        assert_eq!(dir[13], 0x14);
        assert_eq!(&dir[32..43], b"FIRMWARESIG");
        assert_eq!(tracked_start_cluster(dir, &config.file), Some(3));
    }

    #[test]
    fn test_short_name_only() {
        let mut config = DiskConfig::default();
        config.file.long_name = None;
        let image = VolumeImage::new(&config);
        assert_eq!(&image.directory()[0..11], b"FIRMWAREBIN");
    }

    #[test]
    fn test_fat_describes_whole_upload() {
        let image = VolumeImage::new(&DiskConfig::default());
        let fat = image.block(Region::Fat).unwrap();
        assert_eq!(read_entry(fat, 3).cluster, 4);
        assert!(read_entry(fat, 122).is_end_of_chain());
    }

    #[test]
    fn test_only_metadata_regions_are_stored() {
        let mut image = VolumeImage::new(&DiskConfig::default());
        assert!(image.block(Region::Payload { offset: 0 }).is_none());
        assert!(image.block_mut(Region::Data).is_none());
        assert!(image.block(Region::Unused).is_none());
    }
}
