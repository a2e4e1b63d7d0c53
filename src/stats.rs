//! Controller statistics collection and reporting.
//!
//! Tracks command mix, refresh behaviour, request throughput and latency
//! during a simulation run.

use std::time::Instant;

use crate::common::data::Operation;
use crate::controller::request::Completion;
use crate::protocol::{Command, Opcode};

/// Counters maintained by the controller as it runs.
pub struct ControllerStats {
    start_time: Instant,
    pub cycles: u64,

    pub cmd_nop: u64,
    pub cmd_activate: u64,
    pub cmd_precharge: u64,
    pub cmd_write: u64,
    pub cmd_read: u64,
    pub cmd_mode: u64,
    pub cmd_refresh: u64,

    pub forced_drains: u64,
    pub peak_debt: u8,

    pub reads_completed: u64,
    pub writes_completed: u64,
    pub words_read: u64,
    pub words_written: u64,
    pub total_latency: u64,
    pub max_latency: u64,

    pub rejected: u64,
    pub busy: u64,
}

impl Default for ControllerStats {
    fn default() -> Self {
        Self {
            start_time: Instant::now(),
            cycles: 0,
            cmd_nop: 0,
            cmd_activate: 0,
            cmd_precharge: 0,
            cmd_write: 0,
            cmd_read: 0,
            cmd_mode: 0,
            cmd_refresh: 0,
            forced_drains: 0,
            peak_debt: 0,
            reads_completed: 0,
            writes_completed: 0,
            words_read: 0,
            words_written: 0,
            total_latency: 0,
            max_latency: 0,
            rejected: 0,
            busy: 0,
        }
    }
}

impl ControllerStats {
    /// Counts one bus cycle.
    pub fn record_command(&mut self, cmd: &Command) {
        let counter = match cmd.opcode {
            Opcode::Nop => &mut self.cmd_nop,
            Opcode::Activate => &mut self.cmd_activate,
            Opcode::Precharge => &mut self.cmd_precharge,
            Opcode::Write => &mut self.cmd_write,
            Opcode::Read => &mut self.cmd_read,
            Opcode::Mode => &mut self.cmd_mode,
            Opcode::Refresh => &mut self.cmd_refresh,
        };
        *counter += 1;
    }

    /// Counts one finished request.
    pub fn record_completion(&mut self, done: &Completion, words: u64) {
        match done.op {
            Operation::Read => {
                self.reads_completed += 1;
                self.words_read += words;
            }
            Operation::Write => {
                self.writes_completed += 1;
                self.words_written += words;
            }
        }
        let latency = done.latency();
        self.total_latency += latency;
        self.max_latency = self.max_latency.max(latency);
    }

    /// Total non-NOP commands issued.
    pub fn commands_issued(&self) -> u64 {
        self.cmd_activate
            + self.cmd_precharge
            + self.cmd_write
            + self.cmd_read
            + self.cmd_mode
            + self.cmd_refresh
    }

    /// Prints a formatted summary of the run.
    pub fn print(&self) {
        let duration = self.start_time.elapsed();
        let seconds = duration.as_secs_f64();

        let cyc = if self.cycles == 0 { 1 } else { self.cycles };
        let completed = self.reads_completed + self.writes_completed;
        let avg_latency = if completed > 0 {
            self.total_latency as f64 / completed as f64
        } else {
            0.0
        };
        let khz = (self.cycles as f64 / seconds) / 1000.0;
        let pct = |n: u64| (n as f64 / cyc as f64) * 100.0;

        println!("\n==========================================================");
        println!("SDRAM CONTROLLER SIMULATION STATISTICS");
        println!("==========================================================");
        println!("host_seconds             {:.4} s", seconds);
        println!("sim_cycles               {}", self.cycles);
        println!("sim_freq                 {:.2} kHz", khz);
        println!("----------------------------------------------------------");
        println!("COMMAND MIX");
        println!("  cmd.nop                {} ({:.2}%)", self.cmd_nop, pct(self.cmd_nop));
        println!("  cmd.activate           {} ({:.2}%)", self.cmd_activate, pct(self.cmd_activate));
        println!("  cmd.precharge          {} ({:.2}%)", self.cmd_precharge, pct(self.cmd_precharge));
        println!("  cmd.write              {} ({:.2}%)", self.cmd_write, pct(self.cmd_write));
        println!("  cmd.read               {} ({:.2}%)", self.cmd_read, pct(self.cmd_read));
        println!("  cmd.mode               {} ({:.2}%)", self.cmd_mode, pct(self.cmd_mode));
        println!("  cmd.refresh            {} ({:.2}%)", self.cmd_refresh, pct(self.cmd_refresh));
        println!("----------------------------------------------------------");
        println!("REFRESH");
        println!("  refresh.peak_debt      {}", self.peak_debt);
        println!("  refresh.forced_drains  {}", self.forced_drains);
        println!("----------------------------------------------------------");
        println!("REQUESTS");
        println!("  req.reads              {} ({} words)", self.reads_completed, self.words_read);
        println!("  req.writes             {} ({} words)", self.writes_completed, self.words_written);
        println!("  req.rejected           {}", self.rejected);
        println!("  req.busy               {}", self.busy);
        println!("  req.avg_latency        {:.2} cycles", avg_latency);
        println!("  req.max_latency        {} cycles", self.max_latency);
        println!("==========================================================");
    }
}
