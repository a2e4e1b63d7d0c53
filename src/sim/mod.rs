//! Simulation harness: device model, clocked system and request scripts.

/// Behavioural SDRAM device with protocol checking.
pub mod device;

/// JSON request scripts for the command-line simulator.
pub mod script;

/// Controller plus device, clocked together.
pub mod system;

pub use device::{SdramDevice, SdramModel};
pub use system::{System, TraceEntry};
