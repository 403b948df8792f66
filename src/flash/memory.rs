//! In-memory flash with NOR semantics, for host builds and tests

use crate::constants::target::{ERASED_BYTE, FLASH_ERASE_SIZE};
use alloc::vec;
use alloc::vec::Vec;
use core::result::Result;
use embedded_storage::nor_flash::{
    check_erase, check_read, check_write, ErrorType, NorFlash, NorFlashErrorKind, ReadNorFlash,
};

const DEFAULT_ERASE_SIZE: usize = FLASH_ERASE_SIZE as usize;

/// Flash device whose cells from `base` upwards are held in memory.
///
/// Offsets below `base` belong to the bootloader and are out of bounds.
pub struct MemoryFlash<const E: usize = DEFAULT_ERASE_SIZE> {
    /// Device offset of the first cell
    base: u32,

    /// Cell contents
    cells: Vec<u8>,

    /// Erase calls served so far
    erase_count: usize,

    /// Write calls served so far
    write_count: usize,
}

impl MemoryFlash {
    /// Creates an erased region of `len` bytes at device offset `base`,
    /// with the default erase unit
    pub fn new(base: u32, len: usize) -> Self {
        Self::with_region(base, len)
    }
}

impl<const E: usize> MemoryFlash<E> {
    /// Creates an erased region of `len` bytes at device offset `base`
    pub fn with_region(base: u32, len: usize) -> Self {
        Self {
            base,
            cells: vec![ERASED_BYTE; len],
            erase_count: 0,
            write_count: 0,
        }
    }

    /// Region contents, starting at `base`
    pub fn contents(&self) -> &[u8] {
        &self.cells
    }

    pub fn erase_count(&self) -> usize {
        self.erase_count
    }

    pub fn write_count(&self) -> usize {
        self.write_count
    }

    /// Maps a checked device range onto cell indices
    fn cells_for(
        &self,
        offset: u32,
        len: usize,
    ) -> Result<core::ops::Range<usize>, NorFlashErrorKind> {
        let start = offset
            .checked_sub(self.base)
            .ok_or(NorFlashErrorKind::OutOfBounds)? as usize;
        Ok(start..start + len)
    }
}

impl<const E: usize> ErrorType for MemoryFlash<E> {
    type Error = NorFlashErrorKind;
}

impl<const E: usize> ReadNorFlash for MemoryFlash<E> {
    const READ_SIZE: usize = 1;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        check_read(self, offset, bytes.len())?;
        let range = self.cells_for(offset, bytes.len())?;
        bytes.copy_from_slice(&self.cells[range]);
        Ok(())
    }

    fn capacity(&self) -> usize {
        self.base as usize + self.cells.len()
    }
}

impl<const E: usize> NorFlash for MemoryFlash<E> {
    const WRITE_SIZE: usize = 4;
    const ERASE_SIZE: usize = E;

    fn erase(&mut self, from: u32, to: u32) -> Result<(), Self::Error> {
        check_erase(self, from, to)?;
        let range = self.cells_for(from, (to - from) as usize)?;
        self.cells[range].fill(ERASED_BYTE);
        self.erase_count += 1;
        Ok(())
    }

    /// Writes into erased cells only
    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
        check_write(self, offset, bytes.len())?;
        let range = self.cells_for(offset, bytes.len())?;
        let cells = &mut self.cells[range];
        if cells.iter().any(|&b| b != ERASED_BYTE) {
            return Err(NorFlashErrorKind::Other);
        }
        cells.copy_from_slice(bytes);
        self.write_count += 1;
        Ok(())
    }
}
