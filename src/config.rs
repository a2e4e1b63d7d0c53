//! Controller Configuration.
//!
//! All configuration is fixed when the controller is built. It is loaded from
//! a TOML document whose fields all have defaults matching the reference
//! 20 MHz ISSI part, so an empty document is a valid configuration.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::common::addr::AddressMap;
use crate::common::constants::*;
use crate::common::error::ConfigError;

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub init: InitConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
    #[serde(default)]
    pub geometry: GeometryConfig,
    #[serde(default)]
    pub timing: TimingConfig,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct GeneralConfig {
    #[serde(default)]
    pub trace_commands: bool,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct InitConfig {
    #[serde(default = "default_init_delay")]
    pub init_delay: u32,

    #[serde(default = "default_mode_register")]
    pub mode_register: u16,
}

impl Default for InitConfig {
    fn default() -> Self {
        Self {
            init_delay: default_init_delay(),
            mode_register: default_mode_register(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct RefreshConfig {
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: u32,

    #[serde(default = "default_debt_ceiling")]
    pub debt_ceiling: u8,

    #[serde(default = "default_drain_threshold")]
    pub drain_threshold: u8,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            refresh_interval: default_refresh_interval(),
            debt_ceiling: default_debt_ceiling(),
            drain_threshold: default_drain_threshold(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct GeometryConfig {
    #[serde(default = "default_addr_width")]
    pub addr_width: u32,

    #[serde(default = "default_row_bits")]
    pub row_bits: u32,

    #[serde(default = "default_bank_bits")]
    pub bank_bits: u32,

    #[serde(default = "default_col_bits")]
    pub col_bits: u32,

    #[serde(default = "default_burst_length")]
    pub burst_length: u32,

    #[serde(default = "default_block_words")]
    pub block_words: u32,

    #[serde(default = "default_max_blocks")]
    pub max_blocks: u32,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            addr_width: default_addr_width(),
            row_bits: default_row_bits(),
            bank_bits: default_bank_bits(),
            col_bits: default_col_bits(),
            burst_length: default_burst_length(),
            block_words: default_block_words(),
            max_blocks: default_max_blocks(),
        }
    }
}

impl GeometryConfig {
    /// Address layout described by the row, bank and column widths.
    pub fn address_map(&self) -> AddressMap {
        AddressMap::new(self.row_bits, self.bank_bits, self.col_bits)
    }

    /// Device columns covered by one front-end block.
    pub fn columns_per_block(&self) -> u32 {
        self.block_words * (WORD_BITS / DEVICE_WIDTH)
    }

    /// Column commands needed to move one front-end block.
    pub fn commands_per_block(&self) -> u32 {
        self.columns_per_block() / self.burst_length
    }
}

/// Hold times, in cycles, from each command to the next one.
///
/// A hold of `n` means the next command may be issued `n` cycles after this
/// one; the cycles in between drive NOP.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct TimingConfig {
    #[serde(default = "default_t_rp")]
    pub t_rp: u32,

    #[serde(default = "default_t_mrd")]
    pub t_mrd: u32,

    #[serde(default = "default_t_rcd")]
    pub t_rcd: u32,

    #[serde(default = "default_t_rfc")]
    pub t_rfc: u32,

    #[serde(default = "default_t_write")]
    pub t_write: u32,

    #[serde(default = "default_t_read")]
    pub t_read: u32,

    #[serde(default = "default_cas_latency")]
    pub cas_latency: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            t_rp: default_t_rp(),
            t_mrd: default_t_mrd(),
            t_rcd: default_t_rcd(),
            t_rfc: default_t_rfc(),
            t_write: default_t_write(),
            t_read: default_t_read(),
            cas_latency: default_cas_latency(),
        }
    }
}

impl Config {
    /// Loads and validates a configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parses and validates a TOML configuration document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the configuration describes a device this controller can drive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let g = &self.geometry;
        let r = &self.refresh;
        let t = &self.timing;

        if g.row_bits + g.bank_bits + g.col_bits != g.addr_width {
            return Err(invalid(format!(
                "row ({}) + bank ({}) + column ({}) bits must equal addr_width ({})",
                g.row_bits, g.bank_bits, g.col_bits, g.addr_width
            )));
        }
        if g.addr_width == 0 || g.addr_width > 32 {
            return Err(invalid(format!("addr_width {} is outside 1..=32", g.addr_width)));
        }
        if g.row_bits > 16 || g.col_bits > 16 || g.bank_bits > 8 {
            return Err(invalid("row, column or bank field too wide for the command bus".into()));
        }
        if g.burst_length * DEVICE_WIDTH != WORD_BITS {
            return Err(invalid(format!(
                "burst_length {} does not move one {}-bit word per command on the {}-bit device",
                g.burst_length, WORD_BITS, DEVICE_WIDTH
            )));
        }
        if g.block_words == 0 || g.max_blocks == 0 {
            return Err(invalid("block_words and max_blocks must be non-zero".into()));
        }
        if u64::from(g.columns_per_block()) * u64::from(g.max_blocks) > 1u64 << g.col_bits {
            return Err(invalid(format!(
                "a {}-block burst does not fit in a {}-column row",
                g.max_blocks,
                1u64 << g.col_bits
            )));
        }

        if r.refresh_interval == 0 {
            return Err(invalid("refresh_interval must be non-zero".into()));
        }
        if r.debt_ceiling == 0 || r.debt_ceiling > REFRESH_DEBT_MAX {
            return Err(invalid(format!(
                "debt_ceiling {} is outside 1..={}",
                r.debt_ceiling, REFRESH_DEBT_MAX
            )));
        }
        if r.drain_threshold == 0 || r.drain_threshold > r.debt_ceiling {
            return Err(invalid(format!(
                "drain_threshold {} is outside 1..={}",
                r.drain_threshold, r.debt_ceiling
            )));
        }

        // Debt accrued before MODE is loaded cannot be paid until Idle.
        let init_cycles = u64::from(self.init.init_delay)
            + u64::from(t.t_rp)
            + u64::from(t.t_mrd)
            + 1;
        if init_cycles / u64::from(r.refresh_interval) >= u64::from(r.debt_ceiling) {
            return Err(invalid(format!(
                "refresh_interval {} saturates the refresh debt during the {}-cycle initialization",
                r.refresh_interval, init_cycles
            )));
        }

        let holds = [
            ("t_rp", t.t_rp),
            ("t_mrd", t.t_mrd),
            ("t_rcd", t.t_rcd),
            ("t_rfc", t.t_rfc),
            ("t_write", t.t_write),
            ("t_read", t.t_read),
        ];
        if let Some((name, _)) = holds.iter().find(|(_, v)| *v == 0) {
            return Err(invalid(format!("{} must be at least one cycle", name)));
        }
        if r.refresh_interval <= t.t_rfc {
            return Err(invalid(format!(
                "refresh_interval {} leaves no time to pay refresh debt with t_rfc {}",
                r.refresh_interval, t.t_rfc
            )));
        }
        if t.t_read < t.cas_latency {
            return Err(invalid(format!(
                "t_read {} is shorter than the CAS latency {}",
                t.t_read, t.cas_latency
            )));
        }

        let mode = self.init.mode_register;
        if u32::from(mode) >= 1 << MODE_REGISTER_BITS {
            return Err(invalid(format!("mode_register {:#x} exceeds 13 bits", mode)));
        }
        match mode_burst_length(mode) {
            Some(bl) if bl == g.burst_length => {}
            _ => {
                return Err(invalid(format!(
                    "mode_register {:#x} does not program burst length {}",
                    mode, g.burst_length
                )))
            }
        }
        if mode_cas_latency(mode) != t.cas_latency {
            return Err(invalid(format!(
                "mode_register {:#x} programs CAS latency {}, timing says {}",
                mode,
                mode_cas_latency(mode),
                t.cas_latency
            )));
        }

        Ok(())
    }
}

/// Burst length programmed by a mode register value, if it is a fixed length.
pub fn mode_burst_length(mode: u16) -> Option<u32> {
    match mode & 0x7 {
        code @ 0..=3 => Some(1 << code),
        _ => None,
    }
}

/// CAS latency programmed by a mode register value.
pub fn mode_cas_latency(mode: u16) -> u32 {
    u32::from((mode >> 4) & 0x7)
}

fn invalid(msg: String) -> ConfigError {
    ConfigError::Invalid(msg)
}

fn default_init_delay() -> u32 {
    INIT_DELAY
}

fn default_mode_register() -> u16 {
    MODE_ONE_BURST
}

fn default_refresh_interval() -> u32 {
    REFRESH_COUNT
}

fn default_debt_ceiling() -> u8 {
    REFRESH_DEBT_MAX
}

fn default_drain_threshold() -> u8 {
    REFRESH_DEBT_MAX - 1
}

fn default_addr_width() -> u32 {
    ADDR_BITS
}

fn default_row_bits() -> u32 {
    ROW_BITS
}

fn default_bank_bits() -> u32 {
    BANK_BITS
}

fn default_col_bits() -> u32 {
    COL_BITS
}

fn default_burst_length() -> u32 {
    WORD_BITS / DEVICE_WIDTH
}

fn default_block_words() -> u32 {
    WORDS_PER_BLOCK
}

fn default_max_blocks() -> u32 {
    MAX_BURST_BLOCKS
}

fn default_t_rp() -> u32 {
    1
}

fn default_t_mrd() -> u32 {
    2
}

fn default_t_rcd() -> u32 {
    1
}

fn default_t_rfc() -> u32 {
    2
}

fn default_t_write() -> u32 {
    2
}

fn default_t_read() -> u32 {
    2
}

fn default_cas_latency() -> u32 {
    2
}
