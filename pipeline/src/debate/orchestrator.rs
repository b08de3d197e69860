//! Debate orchestrator: runs roles round by round until a stop condition.
//!
//! Ties together the role runner, the Muhasabah gate, and stop detection.
//! Rounds are strictly sequential; a runner error aborts the debate.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::consensus::detect_stop;
use super::muhasabah::{GateFailure, MuhasabahPolicy};
use super::roles::{DebateContext, DebateRole, RoleRunner, RoleRunnerError};
use super::state::{DebateState, LoggedOutput, StopReason};

/// Configuration for the debate orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebateConfig {
    /// Round ceiling; reaching it stops the debate with `MAX_ROUNDS`.
    pub max_rounds: u32,
    pub muhasabah: MuhasabahPolicy,
}

impl Default for DebateConfig {
    fn default() -> Self {
        Self {
            max_rounds: 5,
            muhasabah: MuhasabahPolicy::default(),
        }
    }
}

/// Error from the debate orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DebateError {
    #[error("role runner failed: {0}")]
    RoleRunner(#[from] RoleRunnerError),

    #[error("debate already stopped ({0})")]
    AlreadyStopped(StopReason),

    #[error("runner answered as {got} when asked for {expected} in round {round}")]
    RoleMismatch {
        expected: DebateRole,
        got: DebateRole,
        round: u32,
    },
}

/// Outcome of a finished (or abandoned) debate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebateOutcome {
    pub stop_reason: Option<StopReason>,
    pub rounds_completed: u32,
    pub muhasabah_passed: bool,
    pub gate_failure: Option<GateFailure>,
    /// Final state snapshot.
    pub state: DebateState,
}

impl DebateOutcome {
    pub fn from_state(state: DebateState) -> Self {
        Self {
            stop_reason: state.stop_reason(),
            rounds_completed: state.round_number(),
            muhasabah_passed: state.muhasabah_passed(),
            gate_failure: state.gate_failure().cloned(),
            state,
        }
    }

    /// Compact summary line.
    pub fn summary_line(&self) -> String {
        let stop = self
            .stop_reason
            .map(|r| r.to_string())
            .unwrap_or_else(|| "RUNNING".to_string());
        let gate = if self.muhasabah_passed { "ok" } else { "FAILED" };
        format!(
            "[{}] {} rounds | muhasabah={} | debate={}",
            stop,
            self.rounds_completed,
            gate,
            self.state.debate_id()
        )
    }
}

/// A debate result may not feed a deliverable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeliverableBlocked {
    #[error("debate has not stopped after {rounds} round(s)")]
    NotStopped { rounds: u32 },

    #[error("muhasabah gate failed: {0}")]
    MuhasabahFailed(GateFailure),
}

/// Allow a deliverable only from a stopped debate whose outputs all passed
/// the Muhasabah gate.
pub fn require_deliverable_ready(outcome: &DebateOutcome) -> Result<(), DeliverableBlocked> {
    if outcome.stop_reason.is_none() {
        return Err(DeliverableBlocked::NotStopped {
            rounds: outcome.rounds_completed,
        });
    }
    if let Some(failure) = &outcome.gate_failure {
        return Err(DeliverableBlocked::MuhasabahFailed(failure.clone()));
    }
    Ok(())
}

/// Drives a debate over a [`RoleRunner`].
///
/// Usage:
/// 1. Create with `new()` or `with_config()`
/// 2. Call `run()` with a fresh `DebateState`, or `step()` for one round
/// 3. Wrap the final state in `DebateOutcome::from_state()`
pub struct DebateOrchestrator<R> {
    runner: R,
    context: DebateContext,
    config: DebateConfig,
}

impl<R: RoleRunner> DebateOrchestrator<R> {
    /// Create an orchestrator with default config.
    pub fn new(runner: R, context: DebateContext) -> Self {
        Self::with_config(runner, context, DebateConfig::default())
    }

    pub fn with_config(runner: R, context: DebateContext, config: DebateConfig) -> Self {
        Self {
            runner,
            context,
            config,
        }
    }

    pub fn config(&self) -> &DebateConfig {
        &self.config
    }

    pub fn context(&self) -> &DebateContext {
        &self.context
    }

    /// Give back the runner.
    pub fn into_runner(self) -> R {
        self.runner
    }

    /// Run rounds until the debate stops.
    pub fn run(&mut self, mut state: DebateState) -> Result<DebateState, DebateError> {
        while !state.is_stopped() {
            state = self.step(state)?;
        }
        Ok(state)
    }

    /// `run()` followed by `DebateOutcome::from_state()`.
    pub fn run_to_outcome(&mut self, state: DebateState) -> Result<DebateOutcome, DebateError> {
        self.run(state).map(DebateOutcome::from_state)
    }

    /// Execute exactly one round: every role in order, then stop detection.
    pub fn step(&mut self, mut state: DebateState) -> Result<DebateState, DebateError> {
        if let Some(reason) = state.stop_reason() {
            return Err(DebateError::AlreadyStopped(reason));
        }
        let round = state.round_number() + 1;

        for role in DebateRole::ORDER {
            let output = self.runner.produce(role, &self.context, &state)?;
            if output.role != role {
                warn!(
                    debate_id = %self.context.debate_id,
                    round,
                    expected = %role,
                    got = %output.role,
                    "role runner returned another role's output"
                );
                return Err(DebateError::RoleMismatch {
                    expected: role,
                    got: output.role,
                    round,
                });
            }
            let violations = self.config.muhasabah.check(&output.muhasabah);
            let passed = violations.is_empty();
            if !passed {
                warn!(
                    debate_id = %self.context.debate_id,
                    round,
                    %role,
                    confidence = %output.muhasabah.confidence,
                    ?violations,
                    "muhasabah gate failed"
                );
                state.record_gate_failure(GateFailure {
                    round,
                    role,
                    confidence: output.muhasabah.confidence,
                    violations,
                });
            }
            state.record_output(LoggedOutput {
                round,
                output,
                muhasabah_passed: passed,
            });
        }

        let stop = detect_stop(&state, round, self.config.max_rounds);
        state.complete_round(stop);

        match stop {
            Some(reason) => info!(
                debate_id = %self.context.debate_id,
                round,
                stop_reason = %reason,
                muhasabah_passed = state.muhasabah_passed(),
                "debate stopped"
            ),
            None => info!(
                debate_id = %self.context.debate_id,
                round,
                "debate round complete"
            ),
        }
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debate::muhasabah::{MuhasabahRecord, MuhasabahViolation};
    use crate::debate::roles::{AgentContent, AgentOutput, ScriptedRunner};
    use rust_decimal::Decimal;

    fn out(role: DebateRole, position: Option<&str>, open: &[&str]) -> AgentOutput {
        AgentOutput::new(
            role,
            "argument",
            AgentContent {
                summary: format!("{} speaks", role),
                position: position.map(str::to_string),
                unresolved_challenges: open.iter().map(|s| s.to_string()).collect(),
                details: serde_json::Value::Null,
            },
            MuhasabahRecord::new(Decimal::new(6, 1)).supporting("claim-1"),
        )
    }

    fn unanimous(position: &str) -> ScriptedRunner {
        DebateRole::ORDER
            .iter()
            .fold(ScriptedRunner::new(), |r, role| {
                r.with(out(*role, Some(position), &[]))
            })
    }

    fn orchestrator(runner: ScriptedRunner) -> DebateOrchestrator<ScriptedRunner> {
        DebateOrchestrator::new(runner, DebateContext::new("d-1", "Series A memo"))
    }

    #[test]
    fn test_consensus_in_first_round() {
        let mut orch = orchestrator(unanimous("INVEST"));
        let outcome = orch.run_to_outcome(DebateState::new("d-1")).unwrap();
        assert_eq!(outcome.stop_reason, Some(StopReason::Consensus));
        assert_eq!(outcome.rounds_completed, 1);
        assert_eq!(outcome.state.agent_outputs().len(), 5);
        assert!(require_deliverable_ready(&outcome).is_ok());
    }

    #[test]
    fn test_roles_run_in_fixed_order() {
        let mut orch = orchestrator(unanimous("INVEST"));
        let state = orch.step(DebateState::new("d-1")).unwrap();
        let roles: Vec<DebateRole> = state.agent_outputs().iter().map(|o| o.output.role).collect();
        assert_eq!(roles, DebateRole::ORDER.to_vec());
    }

    #[test]
    fn test_stable_dissent_after_two_rounds() {
        let runner = ScriptedRunner::new()
            .with(out(DebateRole::Advocate, Some("INVEST"), &[]))
            .with(out(DebateRole::SanadBreaker, None, &[]))
            .with(out(DebateRole::ContradictionFinder, None, &[]))
            .with(out(DebateRole::RiskOfficer, Some("PASS"), &[]))
            .with(out(DebateRole::Arbiter, None, &["valuation unresolved"]));
        let mut orch = orchestrator(runner);

        let state = orch.step(DebateState::new("d-1")).unwrap();
        assert!(!state.is_stopped());
        let state = orch.step(state).unwrap();
        assert_eq!(state.stop_reason(), Some(StopReason::StableDissent));
        assert_eq!(state.round_number(), 2);
    }

    #[test]
    fn test_max_rounds() {
        let mut runner = ScriptedRunner::new();
        for position in ["A", "B", "C"] {
            runner.push(out(DebateRole::Advocate, Some(position), &[]));
        }
        for role in &DebateRole::ORDER[1..] {
            runner.push(out(*role, None, &["open"]));
        }
        let config = DebateConfig {
            max_rounds: 3,
            ..Default::default()
        };
        let mut orch =
            DebateOrchestrator::with_config(runner, DebateContext::new("d-1", "memo"), config);
        let state = orch.run(DebateState::new("d-1")).unwrap();
        assert_eq!(state.stop_reason(), Some(StopReason::MaxRounds));
        assert_eq!(state.round_number(), 3);
        assert_eq!(state.agent_outputs().len(), 15);
    }

    #[test]
    fn test_step_after_stop_is_an_error() {
        let mut orch = orchestrator(unanimous("PASS"));
        let state = orch.run(DebateState::new("d-1")).unwrap();
        let err = orch.step(state).unwrap_err();
        assert_eq!(err, DebateError::AlreadyStopped(StopReason::Consensus));
    }

    #[test]
    fn test_runner_error_aborts() {
        let runner = ScriptedRunner::new().with(out(DebateRole::Advocate, Some("INVEST"), &[]));
        let mut orch = orchestrator(runner);
        let err = orch.run(DebateState::new("d-1")).unwrap_err();
        match err {
            DebateError::RoleRunner(e) => assert_eq!(e.role, DebateRole::SanadBreaker),
            other => panic!("unexpected error: {other}"),
        }
    }

    /// Answers every request as the arbiter.
    struct ImpersonatingRunner;

    impl RoleRunner for ImpersonatingRunner {
        fn produce(
            &mut self,
            _role: DebateRole,
            _context: &DebateContext,
            _state: &DebateState,
        ) -> Result<AgentOutput, RoleRunnerError> {
            Ok(out(DebateRole::Arbiter, Some("INVEST"), &[]))
        }
    }

    #[test]
    fn test_output_for_wrong_role_aborts() {
        let mut orch =
            DebateOrchestrator::new(ImpersonatingRunner, DebateContext::new("d-1", "memo"));
        let err = orch.run(DebateState::new("d-1")).unwrap_err();
        assert_eq!(
            err,
            DebateError::RoleMismatch {
                expected: DebateRole::Advocate,
                got: DebateRole::Arbiter,
                round: 1,
            }
        );
    }

    #[test]
    fn test_gate_failure_recorded_without_aborting() {
        let runner = DebateRole::ORDER.iter().fold(ScriptedRunner::new(), |r, role| {
            let mut output = out(*role, Some("INVEST"), &[]);
            if *role == DebateRole::RiskOfficer {
                output.muhasabah.confidence = Decimal::new(95, 2);
            }
            r.with(output)
        });
        let mut orch = orchestrator(runner);

        let outcome = orch.run_to_outcome(DebateState::new("d-1")).unwrap();
        assert_eq!(outcome.stop_reason, Some(StopReason::Consensus));
        assert!(!outcome.muhasabah_passed);
        let failure = outcome.gate_failure.clone().unwrap();
        assert_eq!(failure.role, DebateRole::RiskOfficer);
        assert_eq!(
            failure.violations,
            vec![MuhasabahViolation::OverconfidentWithoutUncertainty]
        );
        assert!(matches!(
            require_deliverable_ready(&outcome),
            Err(DeliverableBlocked::MuhasabahFailed(_))
        ));
    }

    #[test]
    fn test_unstopped_outcome_blocks_deliverable() {
        let mut runner = ScriptedRunner::new();
        for role in DebateRole::ORDER {
            runner.push(out(role, None, &["open"]));
        }
        let mut orch = orchestrator(runner);
        let state = orch.step(DebateState::new("d-1")).unwrap();
        let outcome = DebateOutcome::from_state(state);
        assert_eq!(
            require_deliverable_ready(&outcome),
            Err(DeliverableBlocked::NotStopped { rounds: 1 })
        );
    }
}
