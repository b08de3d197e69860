//! Debate roles, agent outputs, and the runner capability.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::muhasabah::MuhasabahRecord;
use super::state::DebateState;

/// Fixed set of debate roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DebateRole {
    /// Argues for the claims under review.
    Advocate,
    /// Attacks the evidence chains.
    SanadBreaker,
    /// Hunts for contradictions between claims and sources.
    ContradictionFinder,
    /// Weighs downside exposure.
    RiskOfficer,
    /// Rules on open challenges; speaks last.
    Arbiter,
}

impl DebateRole {
    /// Order in which roles speak within a round.
    pub const ORDER: [DebateRole; 5] = [
        Self::Advocate,
        Self::SanadBreaker,
        Self::ContradictionFinder,
        Self::RiskOfficer,
        Self::Arbiter,
    ];
}

impl std::fmt::Display for DebateRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Advocate => write!(f, "ADVOCATE"),
            Self::SanadBreaker => write!(f, "SANAD_BREAKER"),
            Self::ContradictionFinder => write!(f, "CONTRADICTION_FINDER"),
            Self::RiskOfficer => write!(f, "RISK_OFFICER"),
            Self::Arbiter => write!(f, "ARBITER"),
        }
    }
}

/// Structured body of an agent output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentContent {
    pub summary: String,
    /// The role's stance label, e.g. `"INVEST"` or `"PASS"`.
    #[serde(default)]
    pub position: Option<String>,
    /// Challenges still open. Only the arbiter's list decides consensus.
    #[serde(default)]
    pub unresolved_challenges: Vec<String>,
    #[serde(default)]
    pub details: serde_json::Value,
}

/// One role's contribution to a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentOutput {
    pub role: DebateRole,
    pub output_type: String,
    pub content: AgentContent,
    pub muhasabah: MuhasabahRecord,
}

impl AgentOutput {
    pub fn new(
        role: DebateRole,
        output_type: &str,
        content: AgentContent,
        muhasabah: MuhasabahRecord,
    ) -> Self {
        Self {
            role,
            output_type: output_type.to_string(),
            content,
            muhasabah,
        }
    }

    pub fn position(&self) -> Option<&str> {
        self.content.position.as_deref()
    }
}

/// What the debate is about.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DebateContext {
    pub debate_id: String,
    pub subject: String,
    /// Claims under debate.
    #[serde(default)]
    pub claim_ids: Vec<String>,
    #[serde(default)]
    pub details: serde_json::Value,
}

impl DebateContext {
    pub fn new(debate_id: &str, subject: &str) -> Self {
        Self {
            debate_id: debate_id.to_string(),
            subject: subject.to_string(),
            ..Default::default()
        }
    }
}

/// A role runner failed to produce output.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{role} failed in round {round}: {message}")]
pub struct RoleRunnerError {
    pub role: DebateRole,
    pub round: u32,
    pub message: String,
}

/// Produces a role's output for the round about to run.
pub trait RoleRunner {
    /// `state` holds every output from earlier rounds and any earlier role
    /// of the current round.
    fn produce(
        &mut self,
        role: DebateRole,
        context: &DebateContext,
        state: &DebateState,
    ) -> Result<AgentOutput, RoleRunnerError>;
}

/// Deterministic runner replaying per-role scripts.
///
/// Round `n` plays the role's `n`th scripted output; once a script runs
/// out its last output repeats.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRunner {
    scripts: HashMap<DebateRole, Vec<AgentOutput>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an output to a role's script.
    pub fn push(&mut self, output: AgentOutput) -> &mut Self {
        self.scripts.entry(output.role).or_default().push(output);
        self
    }

    /// Builder form of [`ScriptedRunner::push`].
    pub fn with(mut self, output: AgentOutput) -> Self {
        self.push(output);
        self
    }

    /// Load from a JSON array of agent outputs, in round order per role.
    pub fn from_outputs(outputs: Vec<AgentOutput>) -> Self {
        outputs.into_iter().fold(Self::new(), Self::with)
    }
}

impl RoleRunner for ScriptedRunner {
    fn produce(
        &mut self,
        role: DebateRole,
        _context: &DebateContext,
        state: &DebateState,
    ) -> Result<AgentOutput, RoleRunnerError> {
        let round = state.round_number() + 1;
        let script = self.scripts.get(&role).filter(|s| !s.is_empty()).ok_or_else(|| {
            RoleRunnerError {
                role,
                round,
                message: "no scripted output".to_string(),
            }
        })?;
        let index = (round as usize - 1).min(script.len() - 1);
        Ok(script[index].clone())
    }
}
