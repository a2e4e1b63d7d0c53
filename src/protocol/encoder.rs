//! Protocol Encoder.
//!
//! Converts a logical `Intent` into the `Command` driven on the bus. The
//! encoder holds no state besides its hold-time table, so encoding the same
//! intent always yields the same command.

use crate::common::constants::A10_ALL_BANKS;
use crate::config::TimingConfig;

use super::command::{Command, Opcode};

/// A logical operation the sequencer wants on the bus.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Intent {
    /// Open `row` in `bank`.
    ActivateRow { bank: u8, row: u16 },
    /// Close one bank, or every bank when `bank` is `None`.
    Precharge { bank: Option<u8> },
    /// Write one word starting at `col` of the open row.
    Write { bank: u8, col: u16, data: u32 },
    /// Read one word starting at `col` of the open row.
    Read { bank: u8, col: u16 },
    /// Load the mode register.
    SetMode(u16),
    /// Auto refresh.
    Refresh,
    /// Idle cycle.
    NoOp,
}

/// Minimum cycles from each command to the next one.
///
/// Indexed by opcode; derived from the configured device timing so a change
/// of part or clock only touches the configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HoldTable {
    pub mode: u32,
    pub refresh: u32,
    pub precharge: u32,
    pub activate: u32,
    pub write: u32,
    pub read: u32,
}

impl HoldTable {
    /// Builds the table from device timing.
    pub fn from_timing(timing: &TimingConfig) -> Self {
        Self {
            mode: timing.t_mrd,
            refresh: timing.t_rfc,
            precharge: timing.t_rp,
            activate: timing.t_rcd,
            write: timing.t_write,
            read: timing.t_read,
        }
    }

    /// Hold time after a command with the given opcode.
    pub fn hold(&self, opcode: Opcode) -> u32 {
        match opcode {
            Opcode::Mode => self.mode,
            Opcode::Refresh => self.refresh,
            Opcode::Precharge => self.precharge,
            Opcode::Activate => self.activate,
            Opcode::Write => self.write,
            Opcode::Read => self.read,
            Opcode::Nop => 1,
        }
    }
}

/// Stateless intent-to-command mapping.
#[derive(Clone, Copy, Debug)]
pub struct ProtocolEncoder {
    holds: HoldTable,
}

impl ProtocolEncoder {
    /// Creates a new encoder.
    ///
    /// # Arguments
    ///
    /// * `holds` - Per-opcode hold times in cycles.
    pub fn new(holds: HoldTable) -> Self {
        Self { holds }
    }

    /// Returns the hold-time table.
    pub fn holds(&self) -> &HoldTable {
        &self.holds
    }

    /// Encodes an intent into the command for this cycle.
    pub fn encode(&self, intent: Intent) -> Command {
        let (opcode, bank, addr, data) = match intent {
            Intent::ActivateRow { bank, row } => (Opcode::Activate, bank, row, None),
            Intent::Precharge { bank: Some(bank) } => (Opcode::Precharge, bank, 0, None),
            Intent::Precharge { bank: None } => (Opcode::Precharge, 0, A10_ALL_BANKS, None),
            Intent::Write { bank, col, data } => (Opcode::Write, bank, col, Some(data)),
            Intent::Read { bank, col } => (Opcode::Read, bank, col, None),
            Intent::SetMode(value) => (Opcode::Mode, 0, value, None),
            Intent::Refresh => (Opcode::Refresh, 0, 0, None),
            Intent::NoOp => (Opcode::Nop, 0, 0, None),
        };

        Command {
            opcode,
            bank,
            addr,
            data,
            hold: self.holds.hold(opcode),
        }
    }
}
