//! Device Address Decomposition.
//!
//! Front-end addresses are flat indices of 16-bit device words. The controller
//! splits them row-bank-column, most significant first, so that contiguous
//! addresses walk along the columns of one open row.

use super::error::RejectReason;

/// A flat address split into its device coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct DeviceAddr {
    /// Bank select.
    pub bank: u8,
    /// Row within the bank.
    pub row: u16,
    /// Column within the row.
    pub col: u16,
}

/// Bit layout of the flat address space.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AddressMap {
    row_bits: u32,
    bank_bits: u32,
    col_bits: u32,
}

impl AddressMap {
    /// Creates a new address map.
    ///
    /// # Arguments
    ///
    /// * `row_bits` - Width of the row field.
    /// * `bank_bits` - Width of the bank field.
    /// * `col_bits` - Width of the column field.
    pub fn new(row_bits: u32, bank_bits: u32, col_bits: u32) -> Self {
        Self {
            row_bits,
            bank_bits,
            col_bits,
        }
    }

    /// Total width of the flat address.
    pub fn width(&self) -> u32 {
        self.row_bits + self.bank_bits + self.col_bits
    }

    /// First address past the end of the device.
    pub fn limit(&self) -> u64 {
        1u64 << self.width()
    }

    /// Number of columns in one row.
    pub fn columns_per_row(&self) -> u32 {
        1 << self.col_bits
    }

    /// Number of banks on the device.
    pub fn banks(&self) -> u32 {
        1 << self.bank_bits
    }

    /// Splits a flat address into bank, row and column.
    ///
    /// # Returns
    ///
    /// The decomposed address, or `RejectReason::AddressOutOfRange` when the
    /// address does not fit in the configured width.
    pub fn decompose(&self, addr: u32) -> Result<DeviceAddr, RejectReason> {
        if u64::from(addr) >= self.limit() {
            return Err(RejectReason::AddressOutOfRange {
                addr,
                limit: self.limit(),
            });
        }

        let col_mask = (1u32 << self.col_bits) - 1;
        let bank_mask = (1u32 << self.bank_bits) - 1;

        Ok(DeviceAddr {
            col: (addr & col_mask) as u16,
            bank: ((addr >> self.col_bits) & bank_mask) as u8,
            row: (addr >> (self.col_bits + self.bank_bits)) as u16,
        })
    }

    /// Rebuilds the flat address of a device coordinate.
    pub fn compose(&self, at: DeviceAddr) -> u32 {
        (u32::from(at.row) << (self.col_bits + self.bank_bits))
            | (u32::from(at.bank) << self.col_bits)
            | u32::from(at.col)
    }
}
