//! Common utilities and types used throughout the SDRAM controller model.
//!
//! This module provides the fundamental types for device addresses, transfer
//! direction, error handling and the fixed device constants that are shared
//! across the encoder, arbiter and controller state machine.

/// Device address decomposition (bank, row, column).
pub mod addr;

/// Constants describing the reference ISSI device and front-end geometry.
pub mod constants;

/// Transfer direction definitions.
pub mod data;

/// Error types and rejection reasons.
pub mod error;

pub use addr::{AddressMap, DeviceAddr};
pub use data::Operation;
pub use error::{
    ConfigError, ControllerError, ProtocolViolation, RejectReason, SimError, SubmitError,
};
