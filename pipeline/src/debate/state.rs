//! Debate state machine: phases, stop reasons, and the append-only log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::muhasabah::GateFailure;
use super::roles::{AgentOutput, DebateRole};

/// Why a debate stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StopReason {
    /// All declared positions agree and the arbiter has no open challenges.
    Consensus,
    /// Positions did not move between two consecutive rounds.
    StableDissent,
    /// Round ceiling reached.
    MaxRounds,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Consensus => write!(f, "CONSENSUS"),
            Self::StableDissent => write!(f, "STABLE_DISSENT"),
            Self::MaxRounds => write!(f, "MAX_ROUNDS"),
        }
    }
}

/// Phase of a debate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DebatePhase {
    /// Round `n` is the next to run (1-indexed).
    Round(u32),
    /// Terminal.
    Stopped(StopReason),
}

impl DebatePhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Stopped(_))
    }
}

impl std::fmt::Display for DebatePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Round(n) => write!(f, "round_{}", n),
            Self::Stopped(reason) => write!(f, "stopped({})", reason),
        }
    }
}

/// An agent output as recorded in the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggedOutput {
    /// Round that produced the output (1-indexed).
    pub round: u32,
    pub output: AgentOutput,
    /// Whether the output's Muhasabah record passed the gate.
    pub muhasabah_passed: bool,
}

/// A phase transition record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebateTransition {
    pub from: DebatePhase,
    pub to: DebatePhase,
    pub timestamp: DateTime<Utc>,
}

/// State of one debate. The output log only ever grows, and once a stop
/// reason is set the state is terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebateState {
    debate_id: String,
    /// Rounds completed so far.
    round_number: u32,
    agent_outputs: Vec<LoggedOutput>,
    stop_reason: Option<StopReason>,
    gate_failures: Vec<GateFailure>,
    transitions: Vec<DebateTransition>,
    created_at: DateTime<Utc>,
}

impl DebateState {
    /// A fresh debate about to run round 1.
    pub fn new(debate_id: &str) -> Self {
        Self {
            debate_id: debate_id.to_string(),
            round_number: 0,
            agent_outputs: Vec::new(),
            stop_reason: None,
            gate_failures: Vec::new(),
            transitions: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn debate_id(&self) -> &str {
        &self.debate_id
    }

    /// Number of completed rounds.
    pub fn round_number(&self) -> u32 {
        self.round_number
    }

    pub fn stop_reason(&self) -> Option<StopReason> {
        self.stop_reason
    }

    pub fn is_stopped(&self) -> bool {
        self.stop_reason.is_some()
    }

    pub fn phase(&self) -> DebatePhase {
        match self.stop_reason {
            Some(reason) => DebatePhase::Stopped(reason),
            None => DebatePhase::Round(self.round_number + 1),
        }
    }

    /// Full output log in the order produced.
    pub fn agent_outputs(&self) -> &[LoggedOutput] {
        &self.agent_outputs
    }

    /// Outputs produced in round `round`.
    pub fn outputs_in_round(&self, round: u32) -> impl Iterator<Item = &LoggedOutput> {
        self.agent_outputs.iter().filter(move |o| o.round == round)
    }

    /// The output a role produced in a given round, if any.
    pub fn output_of(&self, round: u32, role: DebateRole) -> Option<&AgentOutput> {
        self.outputs_in_round(round)
            .find(|o| o.output.role == role)
            .map(|o| &o.output)
    }

    /// Every recorded Muhasabah failure, in order.
    pub fn gate_failures(&self) -> &[GateFailure] {
        &self.gate_failures
    }

    /// The first Muhasabah failure, if any.
    pub fn gate_failure(&self) -> Option<&GateFailure> {
        self.gate_failures.first()
    }

    pub fn muhasabah_passed(&self) -> bool {
        self.gate_failures.is_empty()
    }

    pub fn transitions(&self) -> &[DebateTransition] {
        &self.transitions
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub(crate) fn record_output(&mut self, logged: LoggedOutput) {
        self.agent_outputs.push(logged);
    }

    pub(crate) fn record_gate_failure(&mut self, failure: GateFailure) {
        self.gate_failures.push(failure);
    }

    /// Close the current round and move to the next phase.
    pub(crate) fn complete_round(&mut self, stop: Option<StopReason>) {
        let from = self.phase();
        self.round_number += 1;
        self.stop_reason = stop;
        let to = self.phase();
        self.transitions.push(DebateTransition {
            from,
            to,
            timestamp: Utc::now(),
        });
    }

    #[cfg(test)]
    pub(crate) fn at_round(debate_id: &str, round: u32) -> Self {
        Self {
            round_number: round.saturating_sub(1),
            ..Self::new(debate_id)
        }
    }
}
