//! SDRAM command protocol.
//!
//! Maps logical intents (activate a row, read a column, refresh, ...) to the
//! wire-level command the device samples on the command bus, together with the
//! number of cycles that must elapse before the next command.

/// Opcodes and bus-cycle commands.
pub mod command;

/// Pure intent-to-command encoder with a table of hold times.
pub mod encoder;

pub use command::{Command, Opcode};
pub use encoder::{HoldTable, Intent, ProtocolEncoder};
