//! Command Bus Definitions.
//!
//! One `Command` is driven per clock cycle. It is never stored past the cycle
//! that issues it, other than in traces.

use serde::Serialize;

/// 4-bit command code sampled by the device (CS#, RAS#, CAS#, WE#).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum Opcode {
    /// Load mode register.
    Mode = 0b0000,
    /// Auto refresh.
    Refresh = 0b0001,
    /// Precharge one bank, or all banks with A10 high.
    Precharge = 0b0010,
    /// Open a row.
    Activate = 0b0011,
    /// Column write.
    Write = 0b0100,
    /// Column read.
    Read = 0b0101,
    /// No operation.
    Nop = 0b0111,
}

impl Opcode {
    /// Returns the 4-bit wire encoding.
    pub fn bits(self) -> u8 {
        self as u8
    }

    /// Decodes a 4-bit wire value.
    ///
    /// Returns `None` for encodings the controller never drives.
    pub fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0b0000 => Some(Opcode::Mode),
            0b0001 => Some(Opcode::Refresh),
            0b0010 => Some(Opcode::Precharge),
            0b0011 => Some(Opcode::Activate),
            0b0100 => Some(Opcode::Write),
            0b0101 => Some(Opcode::Read),
            0b0111 => Some(Opcode::Nop),
            _ => None,
        }
    }

    /// Returns `true` for commands that carry a column address.
    pub fn is_column(&self) -> bool {
        matches!(self, Opcode::Read | Opcode::Write)
    }

    /// Returns the datasheet mnemonic.
    pub fn name(&self) -> &'static str {
        match self {
            Opcode::Mode => "MODE",
            Opcode::Refresh => "REFRESH",
            Opcode::Precharge => "PRECHARGE",
            Opcode::Activate => "ACTIVATE",
            Opcode::Write => "WRITE",
            Opcode::Read => "READ",
            Opcode::Nop => "NOP",
        }
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Everything driven onto the command bus in one cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Command {
    /// Command code.
    pub opcode: Opcode,
    /// Bank address lines (BA).
    pub bank: u8,
    /// Address lines (A): row for ACTIVATE, column for READ/WRITE,
    /// mode value for MODE, A10 for PRECHARGE.
    pub addr: u16,
    /// Word driven on the data lines, over `burst_length` beats, for WRITE.
    pub data: Option<u32>,
    /// Cycles until the next command may be issued.
    pub hold: u32,
}

impl Command {
    /// A NOP cycle.
    pub const NOP: Command = Command {
        opcode: Opcode::Nop,
        bank: 0,
        addr: 0,
        data: None,
        hold: 1,
    };

    /// Returns `true` for NOP cycles.
    pub fn is_nop(&self) -> bool {
        self.opcode == Opcode::Nop
    }
}

impl Default for Command {
    fn default() -> Self {
        Self::NOP
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.opcode {
            Opcode::Nop | Opcode::Refresh => write!(f, "{}", self.opcode),
            Opcode::Mode => write!(f, "MODE({:#06x})", self.addr),
            Opcode::Precharge if self.addr & crate::common::constants::A10_ALL_BANKS != 0 => {
                write!(f, "PRECHARGE(all)")
            }
            Opcode::Precharge => write!(f, "PRECHARGE(bank {})", self.bank),
            Opcode::Activate => write!(f, "ACTIVATE(bank {}, row {:#x})", self.bank, self.addr),
            Opcode::Read => write!(f, "READ(bank {}, col {:#x})", self.bank, self.addr),
            Opcode::Write => write!(
                f,
                "WRITE(bank {}, col {:#x}, {:#010x})",
                self.bank,
                self.addr,
                self.data.unwrap_or(0)
            ),
        }
    }
}
