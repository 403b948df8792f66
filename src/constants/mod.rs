//! Build-time defaults for the virtual volume and the flash target.

pub mod target;
pub mod volume;

/// Number of logical units exposed to the transport.
pub const MAX_DRIVES: u32 = 1;
