//! Error types for the controller, device model and configuration loader.
//!
//! Four classes are kept apart: recoverable request rejections, the fatal
//! refresh-debt saturation, protocol violations (defects caught by the device
//! model) and configuration errors.

use thiserror::Error;

use crate::protocol::Opcode;

/// Why a front-end request was refused.
///
/// Rejections are synchronous and issue no command. The caller may fix the
/// request and resubmit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RejectReason {
    #[error("address {addr:#x} is outside the {limit:#x}-word device")]
    AddressOutOfRange { addr: u32, limit: u64 },

    #[error("block count {count} is outside 1..={max}")]
    BlockCount { count: u32, max: u32 },

    #[error("write payload holds {actual} words, expected {expected}")]
    PayloadLength { expected: usize, actual: usize },

    #[error("read request carries a {0}-word payload")]
    UnexpectedPayload(usize),

    /// Controller policy rather than a device limit: every column command
    /// moves one whole burst, so a transfer must start on a burst boundary.
    #[error("start column {col} is not aligned to the burst length {burst_length}")]
    Misaligned { col: u16, burst_length: u32 },

    /// Controller policy rather than a device limit: a transfer is served by
    /// a single ACTIVATE, so it must fit in the row it starts in. The address
    /// and block count may both be in range.
    #[error("transfer of {columns} columns from column {col} crosses the row boundary")]
    CrossesRow { col: u16, columns: u32 },
}

/// Result of a refused submission.
///
/// `Busy` is back-pressure and the request can simply be retried later;
/// only `Rejected` means the request itself must change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("controller busy")]
    Busy,

    #[error("request rejected: {0}")]
    Rejected(#[from] RejectReason),

    #[error("controller halted after a fatal timing violation")]
    Faulted,
}

/// Fatal conditions raised by the controller state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ControllerError {
    #[error("refresh debt saturated at {debt} on cycle {cycle}; retention is no longer guaranteed")]
    RefreshDebtSaturated { debt: u8, cycle: u64 },
}

/// A command sequence the SDRAM device would not accept.
///
/// The controller makes these impossible by construction, so any occurrence
/// is a controller defect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ProtocolViolation {
    #[error("{opcode:?} on cycle {cycle} issued {elapsed} cycles after the previous command, {required} required")]
    HoldNotElapsed {
        opcode: Opcode,
        cycle: u64,
        elapsed: u64,
        required: u32,
    },

    #[error("{opcode:?} on cycle {cycle} before the mode register was set")]
    NotInitialized { opcode: Opcode, cycle: u64 },

    #[error("{opcode:?} to bank {bank} on cycle {cycle} with no open row")]
    NoOpenRow { opcode: Opcode, bank: u8, cycle: u64 },

    #[error("ACTIVATE of row {row} on cycle {cycle} while bank {bank} has row {open} open")]
    BankAlreadyOpen {
        bank: u8,
        row: u16,
        open: u16,
        cycle: u64,
    },

    #[error("{opcode:?} on cycle {cycle} while bank {bank} is open")]
    BankNotIdle { opcode: Opcode, bank: u8, cycle: u64 },

    #[error("WRITE on cycle {cycle} without data")]
    MissingWriteData { cycle: u64 },
}

/// Errors raised while loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Errors raised by the simulation harness.
#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Controller(#[from] ControllerError),

    #[error("protocol violation: {0}")]
    Protocol(#[from] ProtocolViolation),

    #[error(transparent)]
    Submit(#[from] SubmitError),

    #[error("cycle budget of {0} exhausted")]
    Timeout(u64),

    #[error("failed to load request script: {0}")]
    Script(String),
}
