//! Clocked System Harness.
//!
//! Wires a `Controller` to an `SdramDevice` and clocks both once per cycle:
//! the controller drives its command, the device samples it, and any read
//! data the device returns is handed back to the controller's data-line
//! sampler in the same cycle.

use serde::Serialize;

use crate::common::error::{SimError, SubmitError};
use crate::config::Config;
use crate::controller::request::{Completion, Request};
use crate::controller::Controller;
use crate::protocol::Command;

use super::device::{SdramDevice, SdramModel};

/// One non-NOP command in the recorded trace.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct TraceEntry {
    pub cycle: u64,
    #[serde(flatten)]
    pub command: Command,
}

/// A controller and the device on its bus.
pub struct System {
    pub controller: Controller,
    pub device: Box<dyn SdramDevice>,
    trace: Option<Vec<TraceEntry>>,
}

impl System {
    /// Builds a controller attached to the behavioural device model.
    pub fn new(config: &Config) -> Self {
        Self::with_device(config, Box::new(SdramModel::new(config)))
    }

    /// Builds a controller attached to an arbitrary device.
    pub fn with_device(config: &Config, device: Box<dyn SdramDevice>) -> Self {
        Self {
            controller: Controller::new(config),
            device,
            trace: None,
        }
    }

    /// Starts or stops recording non-NOP commands.
    pub fn record_trace(&mut self, enabled: bool) {
        self.trace = if enabled { Some(Vec::new()) } else { None };
    }

    /// Commands recorded so far.
    pub fn trace(&self) -> &[TraceEntry] {
        self.trace.as_deref().unwrap_or(&[])
    }

    /// The behavioural model, when that is the attached device.
    pub fn model(&self) -> Option<&SdramModel> {
        self.device.as_model()
    }

    /// Clocks the controller and device through one cycle.
    pub fn step(&mut self) -> Result<Command, SimError> {
        let cycle = self.controller.cycle();
        let cmd = self.controller.tick()?;

        if let Some(word) = self.device.clock(&cmd)? {
            self.controller.sample_dq(word);
        }

        if let Some(trace) = self.trace.as_mut() {
            if !cmd.is_nop() {
                trace.push(TraceEntry { cycle, command: cmd });
            }
        }
        Ok(cmd)
    }

    /// Runs `cycles` cycles and returns the commands driven.
    pub fn run_for(&mut self, cycles: u64) -> Result<Vec<Command>, SimError> {
        (0..cycles).map(|_| self.step()).collect()
    }

    /// Runs until the controller accepts requests.
    ///
    /// # Returns
    ///
    /// The number of cycles run, or `SimError::Timeout` once `max_cycles`
    /// have passed.
    pub fn wait_ready(&mut self, max_cycles: u64) -> Result<u64, SimError> {
        let mut ran = 0;
        while !self.controller.ready() {
            if ran >= max_cycles {
                return Err(SimError::Timeout(max_cycles));
            }
            self.step()?;
            ran += 1;
        }
        Ok(ran)
    }

    /// Submits a request as soon as the controller is ready and runs it to
    /// completion.
    pub fn execute(&mut self, req: Request, max_cycles: u64) -> Result<Completion, SimError> {
        let start = self.controller.cycle();
        let budget_left =
            |sys: &System| sys.controller.cycle().saturating_sub(start) < max_cycles;

        let id = loop {
            match self.controller.submit(req.clone()) {
                Ok(id) => break id,
                Err(SubmitError::Busy) if budget_left(self) => {
                    self.step()?;
                }
                Err(SubmitError::Busy) => return Err(SimError::Timeout(max_cycles)),
                Err(e) => return Err(e.into()),
            }
        };

        loop {
            while let Some(done) = self.controller.take_completion() {
                if done.id == id {
                    return Ok(done);
                }
            }
            if !budget_left(self) {
                return Err(SimError::Timeout(max_cycles));
            }
            self.step()?;
        }
    }
}
