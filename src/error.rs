/// Flash failure that ended an update session.
///
/// Carries the device offset of the failed call along with the driver's
/// [`embedded_storage::nor_flash::NorFlashErrorKind`], narrowed to the kinds
/// the session distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashError {
    /// Offset or length not on a write or erase unit boundary
    NotAligned { offset: u32 },
    /// Range past the end of the device or into protected memory
    OutOfBounds { offset: u32 },
    /// Any other driver failure, such as programming unerased cells
    Device { offset: u32 },
}

impl core::fmt::Display for FlashError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            FlashError::NotAligned { offset } => {
                write!(f, "flash access at {offset:#010x} not aligned")
            }
            FlashError::OutOfBounds { offset } => {
                write!(f, "flash access at {offset:#010x} out of bounds")
            }
            FlashError::Device { offset } => write!(f, "flash driver failed at {offset:#010x}"),
        }
    }
}

/// Rejected disk configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    UnsupportedBlockSize(usize),
    ZeroSectorsPerCluster,
    UnsupportedFatSize(u16),
    EmptyUpload,
    UploadStartNotEraseAligned,
    UploadNotBlockAligned,
    UploadNotEraseAligned,
    WindowOutsideVolume,
    ChainDoesNotFitFat,
    InvalidStartCluster(u16),
    LongNameTooLong,
    LongNameNotAscii,
    /// Flash driver erases in different units than configured
    EraseSizeMismatch { configured: u32, device: u32 },
    /// A block cannot be programmed in whole write units
    UnsupportedWriteSize(usize),
    /// Upload region ends past the flash device
    UploadOutsideFlash { end: u32, capacity: u32 },
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::UnsupportedBlockSize(size) => write!(f, "Unsupported block size {size}"),
            ConfigError::ZeroSectorsPerCluster => write!(f, "Sectors per cluster must be non-zero"),
            ConfigError::UnsupportedFatSize(n) => {
                write!(f, "Only single-sector FATs are supported, got {n}")
            }
            ConfigError::EmptyUpload => write!(f, "Upload length must be non-zero"),
            ConfigError::UploadStartNotEraseAligned => {
                write!(f, "Upload start is not on an erase unit boundary")
            }
            ConfigError::UploadNotBlockAligned => {
                write!(f, "Upload length is not a multiple of the block size")
            }
            ConfigError::UploadNotEraseAligned => {
                write!(f, "Upload length is not a multiple of the erase unit")
            }
            ConfigError::WindowOutsideVolume => {
                write!(f, "Upload window extends past the end of the volume")
            }
            ConfigError::ChainDoesNotFitFat => write!(f, "Cluster chain does not fit in the FAT"),
            ConfigError::InvalidStartCluster(c) => write!(f, "Invalid start cluster {c}"),
            ConfigError::LongNameTooLong => write!(f, "Long file name exceeds 13 characters"),
            ConfigError::LongNameNotAscii => write!(f, "Long file name must be ASCII"),
            ConfigError::EraseSizeMismatch { configured, device } => write!(
                f,
                "Configured erase unit {configured} does not match flash erase unit {device}"
            ),
            ConfigError::UnsupportedWriteSize(size) => {
                write!(f, "Flash write unit {size} does not divide the block size")
            }
            ConfigError::UploadOutsideFlash { end, capacity } => write!(
                f,
                "Upload region ends at {end:#010x}, flash holds {capacity:#010x} bytes"
            ),
        }
    }
}
