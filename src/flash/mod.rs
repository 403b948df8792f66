//! Non-volatile program memory the captured image is written to.
//!
//! The target's driver is any [`NorFlash`] whose offsets count from the start
//! of the flash device, so the configured upload start is used as-is. Calls
//! are blocking and cannot be cancelled.

#[cfg(feature = "alloc")]
pub mod memory;

pub use crate::error::FlashError;
pub use embedded_storage::nor_flash::{
    ErrorType, NorFlash, NorFlashError, NorFlashErrorKind, ReadNorFlash,
};

/// Narrows a driver error at `offset` to the session's fault.
pub fn map_flash_error<E: NorFlashError>(error: E, offset: u32) -> FlashError {
    match error.kind() {
        NorFlashErrorKind::NotAligned => FlashError::NotAligned { offset },
        NorFlashErrorKind::OutOfBounds => FlashError::OutOfBounds { offset },
        _ => FlashError::Device { offset },
    }
}
