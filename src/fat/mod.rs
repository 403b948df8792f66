//! Minimal FAT12 structures backing the virtual volume

pub mod boot_sector;
pub mod constants;
pub mod dir_entry;
pub mod fat_table;

pub use boot_sector::BootSector;
pub use dir_entry::{DirEntry83, FatTimestamp};
pub use fat_table::FatEntry;
