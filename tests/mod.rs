//! Test module organization.
//!
//! This module organizes all integration tests for the SDRAM controller.


/// Address decomposition and error type tests.
mod common_tests;


/// Controller state machine tests.
mod controller_tests;

/// Behavioural device model protocol-checking tests.
mod device_tests;
