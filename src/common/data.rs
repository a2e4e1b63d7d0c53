//! Transfer Direction Types.
//!
//! This module defines the classification of front-end transfers. The
//! direction selects between WRITE and READ column commands once the target
//! row has been activated.

use serde::{Deserialize, Serialize};

/// Direction of a front-end burst transfer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// Data read transfer.
    ///
    /// Issues READ column commands and samples the data lines
    /// `cas_latency` cycles after each command.
    Read,

    /// Data write transfer.
    ///
    /// Issues WRITE column commands carrying the request payload.
    Write,
}

impl Operation {
    /// Returns the lowercase name of the operation.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Read => "read",
            Operation::Write => "write",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
