//! Firmware start detection.
//!
//! A compiled image for the target begins with its vector table. The first
//! four words (initial stack pointer, reset, NMI and HardFault handlers) have
//! bit patterns distinctive enough to tell a real image apart from the zero
//! fill and bookkeeping blocks a host writes while copying a file. This is a
//! heuristic: an image whose handlers live above the masked range is missed,
//! and arbitrary data can match by accident. Both outcomes are accepted.

use crate::constants::target::VECTOR_TABLE_MASKS;

/// Number of bytes the heuristic inspects.
pub const SIGNATURE_LEN: usize = 16;

/// One masked comparison: `word & mask == expected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordMatch {
    pub mask: u32,
    pub expected: u32,
}

impl WordMatch {
    pub const fn new(mask: u32, expected: u32) -> Self {
        Self { mask, expected }
    }

    pub fn matches(&self, word: u32) -> bool {
        word & self.mask == self.expected
    }
}

/// Per-target vector table pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FirmwareSignature {
    pub words: [WordMatch; 4],
}

impl FirmwareSignature {
    pub const fn new(words: [WordMatch; 4]) -> Self {
        Self { words }
    }

    /// Cortex-M layout used by the reference target.
    pub const fn cortex_m() -> Self {
        let m = VECTOR_TABLE_MASKS;
        Self::new([
            WordMatch::new(m[0].0, m[0].1),
            WordMatch::new(m[1].0, m[1].1),
            WordMatch::new(m[2].0, m[2].1),
            WordMatch::new(m[3].0, m[3].1),
        ])
    }

    /// Returns true if `block` starts like a firmware image.
    ///
    /// Blocks shorter than [`SIGNATURE_LEN`] never match.
    pub fn matches(&self, block: &[u8]) -> bool {
        let Some(head) = block.get(..SIGNATURE_LEN) else {
            return false;
        };

        head.chunks_exact(4)
            .map(|w| u32::from_le_bytes([w[0], w[1], w[2], w[3]]))
            .zip(self.words.iter())
            .all(|(word, pattern)| pattern.matches(word))
    }
}

impl Default for FirmwareSignature {
    fn default() -> Self {
        Self::cortex_m()
    }
}
