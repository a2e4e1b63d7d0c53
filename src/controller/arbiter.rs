//! Command Arbiter.
//!
//! Decides, at every command boundary, who owns the bus next: mandatory
//! refresh, the application transfer, or nobody. The decision is a pure
//! function of a `Snapshot`, so priority rules can be checked without a
//! running controller.

/// State visible to the arbiter on one cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Snapshot {
    /// Refreshes currently owed.
    pub refresh_debt: u8,
    /// A row is open for an application transfer that has not finished.
    pub burst_in_flight: bool,
    /// An accepted application request is waiting for (or resuming) its transfer.
    pub request_pending: bool,
}

/// What the sequencer should do with the free bus.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    /// Issue REFRESH.
    Refresh,
    /// Close the open row early so refresh can run next.
    Drain,
    /// Issue the next command of the application transfer.
    Proceed,
    /// Issue NOP.
    Idle,
}

/// Refresh-versus-traffic priority policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Arbiter {
    drain_threshold: u8,
}

impl Arbiter {
    /// Creates a new arbiter.
    ///
    /// # Arguments
    ///
    /// * `drain_threshold` - Debt at which an in-flight burst is cut short.
    pub fn new(drain_threshold: u8) -> Self {
        Self { drain_threshold }
    }

    /// Debt at which an in-flight burst is drained.
    pub fn drain_threshold(&self) -> u8 {
        self.drain_threshold
    }

    /// Chooses the owner of the next command slot.
    ///
    /// * **Burst in flight:** bursts are not preemptible, so the transfer
    ///   proceeds unless the debt has reached the drain threshold. With no
    ///   debt there is nothing to drain for, whatever the threshold.
    /// * **Between transfers:** any debt is serviced first; refresh wins a tie
    ///   with a waiting request.
    /// * **Nothing pending:** idle.
    pub fn decide(&self, snap: &Snapshot) -> Decision {
        if snap.burst_in_flight {
            if snap.refresh_debt > 0 && snap.refresh_debt >= self.drain_threshold {
                Decision::Drain
            } else {
                Decision::Proceed
            }
        } else if snap.refresh_debt > 0 {
            Decision::Refresh
        } else if snap.request_pending {
            Decision::Proceed
        } else {
            Decision::Idle
        }
    }
}
