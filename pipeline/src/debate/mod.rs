//! Adversarial debate over a set of claims.
//!
//! Five fixed roles speak in order each round. Every output passes through
//! the Muhasabah gate; failures are recorded on the state but never stop
//! the round. After each round the stop conditions are checked in priority
//! order.
//!
//! # Debate Flow
//!
//! ```text
//! Round(1) → ADVOCATE → SANAD_BREAKER → CONTRADICTION_FINDER → RISK_OFFICER → ARBITER
//!    ▲                                                                          │
//!    │                                                              [stop condition?]
//!    │                                                                          │
//!    └──────────── none: Round(n+1) ◄───────────────────────────────────────────┤
//!                                                                               ├─ CONSENSUS
//!                                                                               ├─ STABLE_DISSENT
//!                                                                               └─ MAX_ROUNDS
//!                                                                                    │
//!                                                                                    ▼
//!                                                                            Stopped(reason)
//! ```

pub mod consensus;
pub mod muhasabah;
pub mod orchestrator;
pub mod roles;
pub mod state;

pub use consensus::{detect_stop, positions_in_round, PositionMap};
pub use muhasabah::{
    GateFailure, MuhasabahPolicy, MuhasabahRecord, MuhasabahViolation, DEFAULT_CONFIDENCE_CEILING,
};
pub use orchestrator::{
    require_deliverable_ready, DebateConfig, DebateError, DebateOrchestrator, DebateOutcome,
    DeliverableBlocked,
};
pub use roles::{
    AgentContent, AgentOutput, DebateContext, DebateRole, RoleRunner, RoleRunnerError,
    ScriptedRunner,
};
pub use state::{DebatePhase, DebateState, DebateTransition, LoggedOutput, StopReason};
