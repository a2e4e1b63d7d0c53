//! Controller State Machine.
//!
//! The top-level sequencer. After reset it holds NOP for the power-on delay,
//! precharges all banks and loads the mode register. From then on every free
//! command slot is offered to the arbiter, which picks between refresh and the
//! accepted front-end request; requests run ACTIVATE, column commands in
//! ascending order, then an explicit PRECHARGE.
//!
//! Each `tick` is one clock cycle and runs in two phases: the autonomous
//! refresh counter advances first, from reset onwards, then the sequencer
//! consumes its new value. REFRESH is only issued once MODE has been loaded.
//! A wait counter loaded from the encoder's hold time gates every transition,
//! so no command can be issued before the previous one's hold has elapsed.

/// Refresh-versus-traffic decision function.
pub mod arbiter;

/// Refresh interval counter and debt accumulator.
pub mod refresh;

/// Front-end requests, completions and in-flight transfers.
pub mod request;

/// Sequencer states.
pub mod state;

use std::collections::VecDeque;

use log::{debug, error, info, trace, warn};

use crate::common::addr::AddressMap;
use crate::common::data::Operation;
use crate::common::error::{ControllerError, RejectReason, SubmitError};
use crate::config::Config;
use crate::protocol::{Command, HoldTable, Intent, ProtocolEncoder};
use crate::stats::ControllerStats;

use self::arbiter::{Arbiter, Decision, Snapshot};
use self::refresh::RefreshCounter;
use self::request::{Completion, Request, Transfer};
use self::state::State;

/// Status lines exposed to the front-end.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Status {
    /// A new request would be accepted.
    pub ready: bool,
    /// Refreshes currently owed.
    pub refresh_debt: u8,
    /// Refresh debt has saturated; never cleared once set.
    pub fatal_timing_violation: bool,
    /// Reason the most recent submission was rejected, if it was.
    pub last_rejection: Option<RejectReason>,
}

/// Cycle-accurate SDRAM protocol and timing state machine.
pub struct Controller {
    config: Config,
    map: AddressMap,
    encoder: ProtocolEncoder,
    arbiter: Arbiter,
    refresh: RefreshCounter,

    state: State,
    /// NOP cycles left in the power-on delay.
    init_remaining: u32,
    /// NOP cycles left before the next command slot.
    wait: u32,
    cycle: u64,

    next_id: u64,
    active: Option<Transfer>,
    completions: VecDeque<Completion>,

    fault: Option<ControllerError>,
    last_rejection: Option<RejectReason>,

    trace: bool,
    pub stats: ControllerStats,
}

impl Controller {
    /// Creates a controller in its reset state.
    ///
    /// The configuration is taken as already validated; see
    /// `Config::validate`.
    pub fn new(config: &Config) -> Self {
        debug_assert!(
            config.validate().is_ok(),
            "controller built from an invalid configuration: {:?}",
            config.validate()
        );
        Self {
            map: config.geometry.address_map(),
            encoder: ProtocolEncoder::new(HoldTable::from_timing(&config.timing)),
            arbiter: Arbiter::new(config.refresh.drain_threshold),
            refresh: RefreshCounter::from_config(&config.refresh),
            state: State::PowerOnWait,
            init_remaining: config.init.init_delay,
            wait: 0,
            cycle: 0,
            next_id: 0,
            active: None,
            completions: VecDeque::new(),
            fault: None,
            last_rejection: None,
            trace: config.general.trace_commands || cfg!(feature = "always-trace"),
            stats: ControllerStats::default(),
            config: config.clone(),
        }
    }

    /// Advances the controller by one clock cycle.
    ///
    /// # Returns
    ///
    /// The command driven on the bus this cycle, or the fatal error once the
    /// refresh debt has saturated. The error is returned on every later cycle
    /// as well, and the bus is left driving NOP.
    pub fn tick(&mut self) -> Result<Command, ControllerError> {
        let cycle = self.cycle;
        self.cycle += 1;
        self.stats.cycles += 1;

        if let Some(err) = self.fault {
            self.stats.record_command(&Command::NOP);
            return Err(err);
        }

        // The counter runs from reset; debt accrued during initialization is
        // paid off as soon as the sequencer reaches Idle.
        if let Err(sat) = self.refresh.tick() {
            let err = ControllerError::RefreshDebtSaturated {
                debt: sat.debt,
                cycle,
            };
            error!("[{}] {}", cycle, err);
            self.fault = Some(err);
            self.state = State::Faulted;
            self.stats.peak_debt = self.stats.peak_debt.max(sat.debt);
            self.stats.record_command(&Command::NOP);
            return Err(err);
        }
        self.stats.peak_debt = self.stats.peak_debt.max(self.refresh.debt());

        let cmd = if self.wait > 0 {
            self.wait -= 1;
            Command::NOP
        } else {
            let cmd = self.step(cycle);
            self.wait = cmd.hold.saturating_sub(1);
            cmd
        };

        if !cmd.is_nop() {
            if self.trace {
                info!("[{}] {}", cycle, cmd);
            } else {
                trace!("[{}] {}", cycle, cmd);
            }
        }
        self.stats.record_command(&cmd);
        Ok(cmd)
    }

    /// Offers a request to the controller.
    ///
    /// # Returns
    ///
    /// The request identifier, `SubmitError::Busy` while a transfer or
    /// refresh owns the controller, `SubmitError::Rejected` for a malformed
    /// request, or `SubmitError::Faulted` after a fatal violation. A rejected
    /// request issues no command and leaves the controller ready.
    pub fn submit(&mut self, req: Request) -> Result<u64, SubmitError> {
        if self.fault.is_some() {
            return Err(SubmitError::Faulted);
        }
        if !self.ready() {
            self.stats.busy += 1;
            return Err(SubmitError::Busy);
        }

        let id = self.next_id;
        match Transfer::validate(req, &self.config.geometry, &self.map, id, self.cycle) {
            Ok(transfer) => {
                debug!(
                    "[{}] accepted request {}: {} {} blocks at {:#x} (bank {}, row {:#x}, col {:#x})",
                    self.cycle,
                    id,
                    transfer.op,
                    transfer.blocks,
                    transfer.addr,
                    transfer.at.bank,
                    transfer.at.row,
                    transfer.at.col
                );
                self.next_id += 1;
                self.active = Some(transfer);
                self.last_rejection = None;
                Ok(id)
            }
            Err(reason) => {
                warn!("[{}] rejected request: {}", self.cycle, reason);
                self.stats.rejected += 1;
                self.last_rejection = Some(reason);
                Err(SubmitError::Rejected(reason))
            }
        }
    }

    /// Samples one word from the data lines.
    ///
    /// Called by the PHY with the data of a READ, `cas_latency` cycles after
    /// the command was driven.
    pub fn sample_dq(&mut self, word: u32) {
        match self.active.as_mut() {
            Some(t) if t.op == Operation::Read => t.read_buf.push(word),
            _ => warn!("[{}] unexpected read data {:#010x}", self.cycle, word),
        }
    }

    /// Takes the oldest unreported completion.
    pub fn take_completion(&mut self) -> Option<Completion> {
        self.completions.pop_front()
    }

    /// Returns `true` when a new request would be accepted.
    pub fn ready(&self) -> bool {
        self.state == State::Idle && self.active.is_none() && self.fault.is_none()
    }

    /// Status lines for the front-end.
    pub fn status(&self) -> Status {
        Status {
            ready: self.ready(),
            refresh_debt: self.refresh.debt(),
            fatal_timing_violation: self.fault.is_some(),
            last_rejection: self.last_rejection,
        }
    }

    /// The latched fatal error, if any.
    pub fn fault(&self) -> Option<ControllerError> {
        self.fault
    }

    /// Current sequencer state.
    pub fn state(&self) -> State {
        self.state
    }

    /// Cycles elapsed since reset.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Refreshes currently owed.
    pub fn refresh_debt(&self) -> u8 {
        self.refresh.debt()
    }

    /// The configuration the controller was built with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The address layout in use.
    pub fn address_map(&self) -> &AddressMap {
        &self.map
    }

    /// Returns `true` while a request is accepted but not yet completed.
    pub fn has_active_request(&self) -> bool {
        self.active.is_some()
    }

    fn enter(&mut self, next: State) {
        if next != self.state {
            trace!("[{}] {} -> {}", self.cycle, self.state, next);
        }
        self.state = next;
    }

    /// Picks and encodes the command for a free slot.
    fn step(&mut self, cycle: u64) -> Command {
        match self.state {
            State::PowerOnWait => {
                if self.init_remaining > 0 {
                    self.init_remaining -= 1;
                    return self.encoder.encode(Intent::NoOp);
                }
                info!("[{}] power-on delay elapsed, precharging all banks", cycle);
                self.enter(State::PrechargeAll);
                self.encoder.encode(Intent::Precharge { bank: None })
            }
            State::PrechargeAll => {
                let mode = self.config.init.mode_register;
                info!("[{}] loading mode register {:#06x}", cycle, mode);
                self.enter(State::ModeSet);
                self.encoder.encode(Intent::SetMode(mode))
            }
            State::ModeSet => {
                info!("[{}] initialization complete, controller ready", cycle);
                self.enter(State::Idle);
                self.dispatch(cycle)
            }
            State::Idle | State::Refreshing => self.dispatch(cycle),
            State::Precharging { drain: true } => self.dispatch(cycle),
            State::Precharging { drain: false } => {
                let read_pending = self.active.as_ref().is_some_and(|t| !t.data_complete());
                if read_pending {
                    // The row is already closed, so owed refresh may run
                    // while the last read data is still in flight.
                    return self.refresh_while_waiting();
                }
                if let Some(done) = self.active.take() {
                    let words = u64::from(done.blocks * self.config.geometry.block_words);
                    let done = done.finish(cycle);
                    debug!(
                        "[{}] completed request {} in {} cycles ({} drains)",
                        cycle,
                        done.id,
                        done.latency(),
                        done.drains
                    );
                    self.stats.record_completion(&done, words);
                    self.completions.push_back(done);
                }
                self.dispatch(cycle)
            }
            State::Activating | State::Transferring => self.continue_transfer(cycle),
            State::Faulted => Command::NOP,
        }
    }

    /// Arbitrates a slot while no row is open.
    fn dispatch(&mut self, cycle: u64) -> Command {
        let snap = Snapshot {
            refresh_debt: self.refresh.debt(),
            burst_in_flight: false,
            request_pending: self.active.is_some(),
        };

        match self.arbiter.decide(&snap) {
            Decision::Refresh => {
                self.refresh.on_refresh_issued();
                self.enter(State::Refreshing);
                self.encoder.encode(Intent::Refresh)
            }
            Decision::Proceed => {
                let Some(t) = self.active.as_ref() else {
                    self.enter(State::Idle);
                    return self.encoder.encode(Intent::NoOp);
                };
                let intent = Intent::ActivateRow {
                    bank: t.at.bank,
                    row: t.at.row,
                };
                if t.next > 0 {
                    debug!("[{}] resuming request {} at command {}", cycle, t.id, t.next);
                }
                self.enter(State::Activating);
                self.encoder.encode(intent)
            }
            Decision::Drain | Decision::Idle => {
                self.enter(State::Idle);
                self.encoder.encode(Intent::NoOp)
            }
        }
    }

    /// Offers a slot to refresh only, without starting or resuming a transfer.
    fn refresh_while_waiting(&mut self) -> Command {
        let snap = Snapshot {
            refresh_debt: self.refresh.debt(),
            burst_in_flight: false,
            request_pending: false,
        };
        match self.arbiter.decide(&snap) {
            Decision::Refresh => {
                self.refresh.on_refresh_issued();
                self.encoder.encode(Intent::Refresh)
            }
            _ => self.encoder.encode(Intent::NoOp),
        }
    }

    /// Arbitrates a slot while the current transfer's row is open.
    fn continue_transfer(&mut self, cycle: u64) -> Command {
        let snap = Snapshot {
            refresh_debt: self.refresh.debt(),
            burst_in_flight: true,
            request_pending: true,
        };
        let decision = self.arbiter.decide(&snap);

        let Some(t) = self.active.as_mut() else {
            self.enter(State::Idle);
            return self.encoder.encode(Intent::NoOp);
        };
        let bank = t.at.bank;

        if t.issued_all() {
            self.enter(State::Precharging { drain: false });
            return self.encoder.encode(Intent::Precharge { bank: Some(bank) });
        }

        if decision == Decision::Drain {
            t.drains += 1;
            warn!(
                "[{}] refresh debt {} reached drain threshold, suspending request {} after {} of {} commands",
                cycle,
                snap.refresh_debt,
                t.id,
                t.next,
                t.total
            );
            self.stats.forced_drains += 1;
            self.enter(State::Precharging { drain: true });
            return self.encoder.encode(Intent::Precharge { bank: Some(bank) });
        }

        let index = t.next;
        let col = t.column(index);
        let intent = match t.op {
            Operation::Write => Intent::Write {
                bank,
                col,
                data: t.data[index as usize],
            },
            Operation::Read => Intent::Read { bank, col },
        };
        t.next += 1;
        self.enter(State::Transferring);
        self.encoder.encode(intent)
    }
}
