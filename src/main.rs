//! SDRAM Controller Simulator CLI.
//!
//! Loads a configuration, brings the controller out of reset against the
//! behavioural device model, then runs a script of front-end requests to
//! completion.
//!
//! # Usage
//!
//! Without `--script` the simulator writes one block at address zero and
//! reads it back. `--trace` writes every non-NOP command as JSON.

use std::{fs, process};

use clap::Parser;
use log::{info, warn};

extern crate sdram_controller;

use sdram_controller::common::error::{SimError, SubmitError};
use sdram_controller::common::Operation;
use sdram_controller::config::Config;
use sdram_controller::sim::script::{self, ScriptEntry};
use sdram_controller::sim::System;

/// Command-line arguments for the SDRAM controller simulator.
#[derive(Parser, Debug)]
#[command(author, version, about = "Cycle-Accurate SDRAM Controller Simulator")]
struct Args {
    #[arg(short, long, default_value = "configs/default.toml")]
    config: String,

    #[arg(short, long)]
    script: Option<String>,

    #[arg(long, default_value_t = 1_000_000)]
    max_cycles: u64,

    #[arg(long)]
    trace: Option<String>,

    /// Idle cycles to run after the last request.
    #[arg(long, default_value_t = 0)]
    settle: u64,
}

/// Main entry point for the SDRAM controller simulator.
///
/// # Behavior
///
/// 1. **Configuration**: Parses command-line arguments and loads the TOML configuration file.
/// 2. **Initialization**: Builds the controller and device, and clocks through power-on.
/// 3. **Requests**: Runs each script entry to completion; rejected entries are reported
///    and skipped.
/// 4. **Teardown**: Writes the trace if requested, prints statistics and exits non-zero on
///    any fatal condition.
fn main() {
    pretty_env_logger::init();
    let args = Args::parse();

    let config = Config::from_file(&args.config).unwrap_or_else(|e| {
        eprintln!("\n[!] FATAL: {}: {}", args.config, e);
        process::exit(1);
    });

    print_config(&config);

    let entries = match args.script {
        Some(ref path) => script::load_script(path).unwrap_or_else(|e| {
            eprintln!("\n[!] FATAL: {}", e);
            process::exit(1);
        }),
        None => vec![
            ScriptEntry {
                op: Operation::Write,
                addr: 0,
                blocks: 1,
                data: None,
            },
            ScriptEntry {
                op: Operation::Read,
                addr: 0,
                blocks: 1,
                data: None,
            },
        ],
    };

    let mut system = System::new(&config);
    system.record_trace(args.trace.is_some());

    let code = match run(&mut system, &config, &entries, &args) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("\n[!] FATAL: {}", e);
            1
        }
    };

    if let Some(path) = args.trace {
        match serde_json::to_string_pretty(system.trace()) {
            Ok(json) => {
                if let Err(e) = fs::write(&path, json) {
                    eprintln!("[!] Could not write trace '{}': {}", path, e);
                }
            }
            Err(e) => eprintln!("[!] Could not serialize trace: {}", e),
        }
    }

    system.controller.stats.print();
    process::exit(code);
}

fn run(
    system: &mut System,
    config: &Config,
    entries: &[ScriptEntry],
    args: &Args,
) -> Result<(), SimError> {
    let booted = system.wait_ready(args.max_cycles)?;
    info!("controller ready after {} cycles", booted);

    for (i, entry) in entries.iter().enumerate() {
        let req = entry.to_request(&config.geometry);
        match system.execute(req, args.max_cycles) {
            Ok(done) => {
                println!(
                    "[{}] {} {:#09x} x{} blocks: {} cycles{}",
                    i,
                    done.op,
                    done.addr,
                    done.blocks,
                    done.latency(),
                    if done.drains > 0 {
                        format!(" ({} refresh drains)", done.drains)
                    } else {
                        String::new()
                    }
                );
                if done.op == Operation::Read {
                    let preview: Vec<String> =
                        done.data.iter().take(4).map(|w| format!("{:#010x}", w)).collect();
                    println!("     data: {} ...", preview.join(" "));
                }
            }
            Err(SimError::Submit(SubmitError::Rejected(reason))) => {
                warn!("entry {} rejected", i);
                println!("[{}] rejected: {}", i, reason);
            }
            Err(e) => return Err(e),
        }
    }

    system.run_for(args.settle)?;
    Ok(())
}

fn print_config(config: &Config) {
    println!("Global Configuration");
    println!("--------------------");
    println!("Init:");
    println!("  Init Delay:         {} cycles", config.init.init_delay);
    println!("  Mode Register:      {:#06x}", config.init.mode_register);
    println!("Refresh:");
    println!("  Interval:           {} cycles", config.refresh.refresh_interval);
    println!("  Debt Ceiling:       {}", config.refresh.debt_ceiling);
    println!("  Drain Threshold:    {}", config.refresh.drain_threshold);
    println!("Geometry:");
    println!(
        "  Address:            {} bits ({} row / {} bank / {} col)",
        config.geometry.addr_width,
        config.geometry.row_bits,
        config.geometry.bank_bits,
        config.geometry.col_bits
    );
    println!("  Burst Length:       {}", config.geometry.burst_length);
    println!(
        "  Block:              {} words, max {} per burst",
        config.geometry.block_words, config.geometry.max_blocks
    );
    println!("Timing:");
    println!(
        "  tRP/tMRD/tRCD/tRFC: {}/{}/{}/{}",
        config.timing.t_rp, config.timing.t_mrd, config.timing.t_rcd, config.timing.t_rfc
    );
    println!(
        "  Write/Read/CL:      {}/{}/{}",
        config.timing.t_write, config.timing.t_read, config.timing.cas_latency
    );
    println!("--------------------");
}
