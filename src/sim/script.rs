//! Request Script Loader.
//!
//! Scripts are JSON arrays of requests for the command-line simulator:
//!
//! ```json
//! [
//!   { "op": "write", "addr": 0, "blocks": 1 },
//!   { "op": "read",  "addr": 0, "blocks": 1 }
//! ]
//! ```
//!
//! A write without `data` is filled with a pattern derived from its address.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::common::data::Operation;
use crate::common::error::SimError;
use crate::config::GeometryConfig;
use crate::controller::request::Request;

/// One request in a script.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct ScriptEntry {
    pub op: Operation,
    pub addr: u32,
    pub blocks: u32,
    #[serde(default)]
    pub data: Option<Vec<u32>>,
}

impl ScriptEntry {
    /// Converts the entry into a front-end request.
    ///
    /// A write without explicit data gets a generated payload sized from the
    /// geometry. Entries with a block count outside `1..=max_blocks` get no
    /// payload, so the controller rejects them by block count.
    pub fn to_request(&self, geometry: &GeometryConfig) -> Request {
        match self.op {
            Operation::Read => Request::read(self.addr, self.blocks),
            Operation::Write => {
                let data = match &self.data {
                    Some(data) => data.clone(),
                    None if (1..=geometry.max_blocks).contains(&self.blocks) => {
                        pattern(self.addr, (self.blocks * geometry.block_words) as usize)
                    }
                    None => Vec::new(),
                };
                Request::write(self.addr, self.blocks, data)
            }
        }
    }
}

/// Deterministic write payload for a transfer starting at `addr`.
pub fn pattern(addr: u32, words: usize) -> Vec<u32> {
    (0..words as u32)
        .map(|i| (addr.wrapping_add(i) << 8) ^ 0xA5A5_0000 ^ i)
        .collect()
}

/// Parses a script from JSON text.
pub fn parse_script(json: &str) -> Result<Vec<ScriptEntry>, SimError> {
    serde_json::from_str(json).map_err(|e| SimError::Script(e.to_string()))
}

/// Reads and parses a script file.
pub fn load_script(path: impl AsRef<Path>) -> Result<Vec<ScriptEntry>, SimError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .map_err(|e| SimError::Script(format!("{}: {}", path.display(), e)))?;
    parse_script(&text)
}
