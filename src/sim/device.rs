//! Behavioural SDRAM Device Model.
//!
//! Stands in for the physical part on the far side of the command bus. It
//! stores 16-bit cells, returns read data after the CAS latency and checks
//! every command against the protocol: hold times from its own timing table,
//! initialization order, and the open/closed state of each bank.

use std::collections::{HashMap, VecDeque};

use crate::common::addr::{AddressMap, DeviceAddr};
use crate::common::constants::{A10_ALL_BANKS, DEVICE_WIDTH};
use crate::common::error::ProtocolViolation;
use crate::config::Config;
use crate::protocol::{Command, HoldTable, Opcode};

/// A device attached to the controller's command bus.
pub trait SdramDevice {
    /// Returns the user-friendly name of the device.
    fn name(&self) -> &str;

    /// Samples one bus cycle.
    ///
    /// # Returns
    ///
    /// The word the device drives on the data lines this cycle, if a READ
    /// issued `cas_latency` cycles earlier is due, or the violation if the
    /// command breaks the protocol.
    fn clock(&mut self, cmd: &Command) -> Result<Option<u32>, ProtocolViolation>;

    /// Downcasts to the behavioural model if applicable.
    ///
    /// Used by tests and the simulator to inspect stored data.
    fn as_model(&self) -> Option<&SdramModel> {
        None
    }
}

/// In-memory SDRAM with protocol checking.
pub struct SdramModel {
    map: AddressMap,
    holds: HoldTable,
    cas_latency: u32,
    burst_length: u32,

    cycle: u64,
    last: Option<(u64, Opcode)>,
    mode: Option<u16>,
    open_rows: Vec<Option<u16>>,
    cells: HashMap<DeviceAddr, u16>,
    read_pipeline: VecDeque<(u64, u32)>,
    refreshes: u64,
}

impl SdramModel {
    /// Creates a powered-up, uninitialized device.
    pub fn new(config: &Config) -> Self {
        let map = config.geometry.address_map();
        Self {
            holds: HoldTable::from_timing(&config.timing),
            cas_latency: config.timing.cas_latency,
            burst_length: config.geometry.burst_length,
            cycle: 0,
            last: None,
            mode: None,
            open_rows: vec![None; map.banks() as usize],
            cells: HashMap::new(),
            read_pipeline: VecDeque::new(),
            refreshes: 0,
            map,
        }
    }

    /// The mode register value, once loaded.
    pub fn mode(&self) -> Option<u16> {
        self.mode
    }

    /// Row currently open in `bank`.
    pub fn open_row(&self, bank: u8) -> Option<u16> {
        self.open_rows.get(bank as usize).copied().flatten()
    }

    /// REFRESH commands received so far.
    pub fn refreshes(&self) -> u64 {
        self.refreshes
    }

    /// Reads the 16-bit cell at a flat address; unwritten cells read as zero.
    pub fn cell(&self, addr: u32) -> u16 {
        self.map
            .decompose(addr)
            .ok()
            .and_then(|at| self.cells.get(&at).copied())
            .unwrap_or(0)
    }

    /// Reads the 32-bit word whose low half is at `addr`.
    pub fn word(&self, addr: u32) -> u32 {
        u32::from(self.cell(addr)) | (u32::from(self.cell(addr + 1)) << DEVICE_WIDTH)
    }

    fn open_row_for(&self, opcode: Opcode, bank: u8, cycle: u64) -> Result<u16, ProtocolViolation> {
        self.open_row(bank)
            .ok_or(ProtocolViolation::NoOpenRow { opcode, bank, cycle })
    }

    fn require_idle_banks(&self, opcode: Opcode, cycle: u64) -> Result<(), ProtocolViolation> {
        match self.open_rows.iter().position(Option::is_some) {
            Some(bank) => Err(ProtocolViolation::BankNotIdle {
                opcode,
                bank: bank as u8,
                cycle,
            }),
            None => Ok(()),
        }
    }

    fn execute(&mut self, cmd: &Command, cycle: u64) -> Result<(), ProtocolViolation> {
        let opcode = cmd.opcode;

        if let Some((at, prev)) = self.last {
            let elapsed = cycle - at;
            let required = self.holds.hold(prev);
            if elapsed < u64::from(required) {
                return Err(ProtocolViolation::HoldNotElapsed {
                    opcode,
                    cycle,
                    elapsed,
                    required,
                });
            }
        }

        if self.mode.is_none() && !matches!(opcode, Opcode::Precharge | Opcode::Mode) {
            return Err(ProtocolViolation::NotInitialized { opcode, cycle });
        }

        match opcode {
            Opcode::Precharge => {
                if cmd.addr & A10_ALL_BANKS != 0 {
                    self.open_rows.iter_mut().for_each(|r| *r = None);
                } else if let Some(row) = self.open_rows.get_mut(cmd.bank as usize) {
                    *row = None;
                }
            }
            Opcode::Mode => {
                self.require_idle_banks(opcode, cycle)?;
                self.mode = Some(cmd.addr);
            }
            Opcode::Refresh => {
                self.require_idle_banks(opcode, cycle)?;
                self.refreshes += 1;
            }
            Opcode::Activate => {
                if let Some(open) = self.open_row(cmd.bank) {
                    return Err(ProtocolViolation::BankAlreadyOpen {
                        bank: cmd.bank,
                        row: cmd.addr,
                        open,
                        cycle,
                    });
                }
                if let Some(row) = self.open_rows.get_mut(cmd.bank as usize) {
                    *row = Some(cmd.addr);
                }
            }
            Opcode::Write => {
                let row = self.open_row_for(opcode, cmd.bank, cycle)?;
                let data = cmd
                    .data
                    .ok_or(ProtocolViolation::MissingWriteData { cycle })?;
                for beat in 0..self.burst_length {
                    let at = DeviceAddr {
                        bank: cmd.bank,
                        row,
                        col: cmd.addr + beat as u16,
                    };
                    self.cells.insert(at, (data >> (beat * DEVICE_WIDTH)) as u16);
                }
            }
            Opcode::Read => {
                let row = self.open_row_for(opcode, cmd.bank, cycle)?;
                let mut word = 0u32;
                for beat in 0..self.burst_length {
                    let at = DeviceAddr {
                        bank: cmd.bank,
                        row,
                        col: cmd.addr + beat as u16,
                    };
                    let cell = self.cells.get(&at).copied().unwrap_or(0);
                    word |= u32::from(cell) << (beat * DEVICE_WIDTH);
                }
                self.read_pipeline
                    .push_back((cycle + u64::from(self.cas_latency), word));
            }
            Opcode::Nop => {}
        }

        Ok(())
    }
}

impl SdramDevice for SdramModel {
    fn name(&self) -> &str {
        "sdram-model"
    }

    fn clock(&mut self, cmd: &Command) -> Result<Option<u32>, ProtocolViolation> {
        let cycle = self.cycle;
        self.cycle += 1;

        if !cmd.is_nop() {
            self.execute(cmd, cycle)?;
            self.last = Some((cycle, cmd.opcode));
        }

        match self.read_pipeline.front() {
            Some(&(due, word)) if due <= cycle => {
                self.read_pipeline.pop_front();
                Ok(Some(word))
            }
            _ => Ok(None),
        }
    }

    fn as_model(&self) -> Option<&SdramModel> {
        Some(self)
    }
}
