//! Reference device constants.
//!
//! Values for the ISSI 64 MB x16 part clocked at 20 MHz. They seed the
//! configuration defaults; the controller itself only reads the validated
//! configuration.

/// Cycles of NOP held after reset (~50 us at 20 MHz).
pub const INIT_DELAY: u32 = 0x3FF;

/// Cycles between refresh-debt increments.
pub const REFRESH_COUNT: u32 = 200;

/// Width of the refresh-debt counter in bits.
pub const REFRESH_DEBT_BITS: u32 = 4;

/// Largest refresh debt representable by the debt counter.
pub const REFRESH_DEBT_MAX: u8 = (1 << REFRESH_DEBT_BITS) - 1;

/// Mode register: burst length 2, sequential, CAS latency 2.
pub const MODE_ONE_BURST: u16 = 0x0021;

/// Width of the mode register in bits.
pub const MODE_REGISTER_BITS: u32 = 13;

/// Addressable 16-bit words, as a bit width (64 MB).
pub const ADDR_BITS: u32 = 25;

/// Row address bits of the reference part.
pub const ROW_BITS: u32 = 13;

/// Bank address bits of the reference part.
pub const BANK_BITS: u32 = 2;

/// Column address bits of the reference part.
pub const COL_BITS: u32 = 10;

/// Maximum number of blocks in a single front-end burst.
pub const MAX_BURST_BLOCKS: u32 = 16;

/// Front-end words per block.
pub const WORDS_PER_BLOCK: u32 = 16;

/// Front-end data word width in bits.
pub const WORD_BITS: u32 = 32;

/// Device data bus width in bits.
pub const DEVICE_WIDTH: u32 = 16;

/// Address line that selects all banks on PRECHARGE.
pub const A10_ALL_BANKS: u16 = 1 << 10;
