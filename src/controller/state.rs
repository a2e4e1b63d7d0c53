//! Controller sequencer states.

/// Phase of the controller state machine.
///
/// Each state names the command most recently issued (or the wait being
/// held); the transition out of it happens on the first cycle after its hold
/// time has elapsed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum State {
    /// Driving NOP for the power-on delay.
    PowerOnWait,
    /// PRECHARGE of all banks issued.
    PrechargeAll,
    /// MODE issued.
    ModeSet,
    /// Ready with the bus free.
    Idle,
    /// ACTIVATE issued for the current transfer.
    Activating,
    /// Column commands of the current transfer in progress.
    Transferring,
    /// PRECHARGE of the transfer's bank issued; `drain` is set when the
    /// transfer was cut short and will resume.
    Precharging { drain: bool },
    /// REFRESH issued.
    Refreshing,
    /// Refresh debt saturated; the controller no longer issues commands.
    Faulted,
}

impl State {
    /// Returns the state name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            State::PowerOnWait => "PowerOnWait",
            State::PrechargeAll => "PrechargeAll",
            State::ModeSet => "ModeSet",
            State::Idle => "Idle",
            State::Activating => "Activating",
            State::Transferring => "Transferring",
            State::Precharging { .. } => "Precharging",
            State::Refreshing => "Refreshing",
            State::Faulted => "Faulted",
        }
    }
}

impl std::fmt::Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
