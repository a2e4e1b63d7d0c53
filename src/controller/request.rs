//! Front-end requests and their in-flight transfers.

use crate::common::addr::{AddressMap, DeviceAddr};
use crate::common::data::Operation;
use crate::common::error::RejectReason;
use crate::config::GeometryConfig;

/// A block-granularity request from the front-end.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Request {
    /// Transfer direction.
    pub op: Operation,
    /// Flat address of the first 16-bit device word.
    pub addr: u32,
    /// Number of blocks to move.
    pub blocks: u32,
    /// Write payload, `blocks * block_words` words; empty for reads.
    pub data: Vec<u32>,
}

impl Request {
    /// Builds a read request.
    pub fn read(addr: u32, blocks: u32) -> Self {
        Self {
            op: Operation::Read,
            addr,
            blocks,
            data: Vec::new(),
        }
    }

    /// Builds a write request.
    pub fn write(addr: u32, blocks: u32, data: Vec<u32>) -> Self {
        Self {
            op: Operation::Write,
            addr,
            blocks,
            data,
        }
    }
}

/// A finished request as reported to the front-end.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Completion {
    /// Identifier returned by `submit`.
    pub id: u64,
    pub op: Operation,
    pub addr: u32,
    pub blocks: u32,
    /// Words read back; empty for writes.
    pub data: Vec<u32>,
    /// Cycle on which the request was accepted.
    pub submitted_at: u64,
    /// Cycle on which the closing PRECHARGE hold elapsed.
    pub completed_at: u64,
    /// Times the transfer was cut short for an urgent refresh.
    pub drains: u32,
}

impl Completion {
    /// Cycles from acceptance to completion.
    pub fn latency(&self) -> u64 {
        self.completed_at - self.submitted_at
    }
}

/// An accepted request and its progress through the column commands.
#[derive(Clone, Debug)]
pub(crate) struct Transfer {
    pub id: u64,
    pub op: Operation,
    pub addr: u32,
    pub at: DeviceAddr,
    pub blocks: u32,
    /// Column commands needed for the whole request.
    pub total: u32,
    /// Index of the next column command to issue.
    pub next: u32,
    pub burst_length: u32,
    pub data: Vec<u32>,
    pub read_buf: Vec<u32>,
    pub submitted_at: u64,
    pub drains: u32,
}

impl Transfer {
    /// Validates a request against the device geometry.
    ///
    /// No state is touched on failure, so a rejected request leaves the
    /// controller exactly as it was.
    pub fn validate(
        req: Request,
        geometry: &GeometryConfig,
        map: &AddressMap,
        id: u64,
        cycle: u64,
    ) -> Result<Self, RejectReason> {
        if req.blocks == 0 || req.blocks > geometry.max_blocks {
            return Err(RejectReason::BlockCount {
                count: req.blocks,
                max: geometry.max_blocks,
            });
        }

        let at = map.decompose(req.addr)?;

        let words = (req.blocks * geometry.block_words) as usize;
        match req.op {
            Operation::Write if req.data.len() != words => {
                return Err(RejectReason::PayloadLength {
                    expected: words,
                    actual: req.data.len(),
                })
            }
            Operation::Read if !req.data.is_empty() => {
                return Err(RejectReason::UnexpectedPayload(req.data.len()))
            }
            _ => {}
        }

        if u32::from(at.col) % geometry.burst_length != 0 {
            return Err(RejectReason::Misaligned {
                col: at.col,
                burst_length: geometry.burst_length,
            });
        }

        let columns = req.blocks * geometry.columns_per_block();
        if u32::from(at.col) + columns > map.columns_per_row() {
            return Err(RejectReason::CrossesRow {
                col: at.col,
                columns,
            });
        }

        let total = req.blocks * geometry.commands_per_block();
        Ok(Self {
            id,
            op: req.op,
            addr: req.addr,
            at,
            blocks: req.blocks,
            total,
            next: 0,
            burst_length: geometry.burst_length,
            data: req.data,
            read_buf: Vec::with_capacity(if req.op == Operation::Read { words } else { 0 }),
            submitted_at: cycle,
            drains: 0,
        })
    }

    /// Column addressed by the `index`-th command.
    pub fn column(&self, index: u32) -> u16 {
        (u32::from(self.at.col) + index * self.burst_length) as u16
    }

    /// Returns `true` once every column command has been issued.
    pub fn issued_all(&self) -> bool {
        self.next >= self.total
    }

    /// Returns `true` once a read has received every word.
    pub fn data_complete(&self) -> bool {
        match self.op {
            Operation::Read => self.read_buf.len() >= self.total as usize,
            Operation::Write => true,
        }
    }

    /// Converts the finished transfer into a completion record.
    pub fn finish(self, cycle: u64) -> Completion {
        Completion {
            id: self.id,
            op: self.op,
            addr: self.addr,
            blocks: self.blocks,
            data: self.read_buf,
            submitted_at: self.submitted_at,
            completed_at: cycle,
            drains: self.drains,
        }
    }
}
