#![cfg_attr(not(test), no_std)]
#![cfg_attr(feature = "strict", deny(warnings))]
#[cfg(feature = "alloc")]
extern crate alloc;

pub mod address_map;
pub mod capture;
pub mod config;
pub mod constants;
pub mod disk;
pub mod error;
pub mod fat;
pub mod flash;
pub mod image;
pub mod logging;
pub mod shared;
pub mod signature;

pub use capture::CaptureState;
pub use config::{DiskConfig, FileConfig, ReadBack, TargetConfig, VolumeGeometry};
pub use disk::{DriveHandle, Handoff, RamDisk, SessionStatus};
pub use error::{ConfigError, FlashError};
pub use flash::NorFlash;
pub use shared::SharedRamDisk;
pub use signature::FirmwareSignature;

#[cfg(feature = "alloc")]
pub use flash::memory::MemoryFlash;
