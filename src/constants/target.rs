//! Flash layout of the reference target (256 KiB part, 16 KiB bootloader).

/// First byte of flash available to the user program.
pub const UPLOAD_START: u32 = 0x4000;

/// Bytes of flash reserved for the user program.
pub const UPLOAD_LENGTH: u32 = 0x3_C000;

/// Smallest region a single erase clears.
pub const FLASH_ERASE_SIZE: u32 = 1024;

/// Value of an erased flash cell.
pub const ERASED_BYTE: u8 = 0xFF;

/// Cortex-M vector table: initial SP in SRAM, then reset/NMI/HardFault
/// handlers below 64 KiB with the Thumb bit set.
pub const VECTOR_TABLE_MASKS: [(u32, u32); 4] = [
    (0xFFFC_0000, 0x2000_0000),
    (0xFFFF_000F, 0x0000_0009),
    (0xFFFF_000F, 0x0000_0001),
    (0xFFFF_000F, 0x0000_0003),
];

/// Pattern served over the payload region when read-back is disabled.
pub const READ_DISABLED_PATTERN: &[u8; 16] = b"READ DISABLED  \n";
