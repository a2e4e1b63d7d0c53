//! SDRAM Controller Core Library.
//!
//! This crate implements a cycle-accurate model of a memory controller that
//! drives a commodity SDRAM device through its command protocol: power-on
//! initialization, row activation, read/write column bursts, precharge and
//! periodic auto refresh. Block-granularity front-end requests are turned into
//! correctly sequenced and timed commands while refresh obligations are
//! tracked and enforced.
//!
//! # Architecture
//!
//! * **Refresh Counter**: accumulates refresh debt every refresh interval.
//! * **Protocol Encoder**: maps logical intents to opcodes and hold times.
//! * **Command Arbiter**: chooses between refresh, traffic and idle.
//! * **Controller State Machine**: initialization and per-request sequencing.
//!
//! # Modules
//!
//! * `common`: Shared types, constants, and error handling.
//! * `config`: Configuration loading and validation.
//! * `controller`: The state machine, arbiter and refresh counter.
//! * `protocol`: Command codes and the protocol encoder.
//! * `sim`: Device model, system harness and request scripts.
//! * `stats`: Statistics collection.

/// Shared types, constants and error handling.
///
/// Provides address decomposition, transfer direction, the reference device
/// constants and the error taxonomy used throughout the crate.
pub mod common;

/// Configuration for device timing, geometry and refresh policy.
///
/// Loads and validates TOML configuration files. Configuration is fixed once
/// a controller has been built.
pub mod config;

/// Controller state machine, command arbiter and refresh counter.
pub mod controller;

/// SDRAM command codes and the protocol encoder.
pub mod protocol;

/// Simulation harness.
///
/// A behavioural SDRAM device that checks protocol compliance, a system that
/// clocks it together with the controller, and JSON request scripts.
pub mod sim;

/// Statistics collection and reporting.
pub mod stats;

pub use config::Config;
pub use controller::request::{Completion, Request};
pub use controller::{Controller, Status};
