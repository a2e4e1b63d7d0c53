//! Refresh Counter.
//!
//! Counts clock cycles and turns every elapsed refresh interval into one unit
//! of refresh debt. The debt is paid down by REFRESH commands. Reaching the
//! debt ceiling is a retention failure: the counter latches it and reports it
//! on every later tick.

use crate::config::RefreshConfig;

/// The debt counter reached its ceiling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DebtSaturated {
    /// Debt at the moment of saturation.
    pub debt: u8,
}

/// Autonomous refresh-interval counter and debt accumulator.
#[derive(Clone, Debug)]
pub struct RefreshCounter {
    /// Cycles since the last debt increment.
    elapsed: u32,
    /// Cycles between debt increments.
    interval: u32,
    /// Refreshes owed but not yet issued.
    debt: u8,
    /// Debt at which retention is no longer guaranteed.
    ceiling: u8,
    /// Largest debt seen so far.
    peak: u8,
    /// Sticky saturation flag.
    saturated: bool,
}

impl RefreshCounter {
    /// Creates a new counter with no debt.
    ///
    /// # Arguments
    ///
    /// * `interval` - Cycles between debt increments.
    /// * `ceiling` - Debt that counts as a fatal violation.
    pub fn new(interval: u32, ceiling: u8) -> Self {
        Self {
            elapsed: 0,
            interval,
            debt: 0,
            ceiling,
            peak: 0,
            saturated: false,
        }
    }

    /// Creates a counter from the refresh configuration.
    pub fn from_config(config: &RefreshConfig) -> Self {
        Self::new(config.refresh_interval, config.debt_ceiling)
    }

    /// Advances the counter by one clock cycle.
    ///
    /// # Returns
    ///
    /// `Err(DebtSaturated)` once the debt has reached the ceiling, on that
    /// tick and on every tick after it.
    pub fn tick(&mut self) -> Result<(), DebtSaturated> {
        self.elapsed += 1;
        if self.elapsed >= self.interval {
            self.elapsed = 0;
            self.debt = self.debt.saturating_add(1).min(self.ceiling);
            self.peak = self.peak.max(self.debt);
            if self.debt >= self.ceiling {
                self.saturated = true;
            }
        }

        if self.saturated {
            Err(DebtSaturated { debt: self.debt })
        } else {
            Ok(())
        }
    }

    /// Records that a REFRESH command went out.
    pub fn on_refresh_issued(&mut self) {
        self.debt = self.debt.saturating_sub(1);
    }

    /// Returns `true` while at least one refresh is owed.
    pub fn owed(&self) -> bool {
        self.debt > 0
    }

    /// Refreshes currently owed.
    pub fn debt(&self) -> u8 {
        self.debt
    }

    /// Largest debt observed since reset.
    pub fn peak(&self) -> u8 {
        self.peak
    }

    /// Returns `true` once the debt has ever reached the ceiling.
    pub fn saturated(&self) -> bool {
        self.saturated
    }

    /// Cycles since the last debt increment.
    pub fn elapsed(&self) -> u32 {
        self.elapsed
    }
}
