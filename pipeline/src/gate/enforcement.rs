//! All-or-nothing gate enforcement for calculation inputs.
//!
//! A calculation may only run when every one of its inputs clears the
//! extraction gate. The whole batch is judged before anything is decided;
//! a single block rejects the calculation and surfaces every blocked input.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::decision::{BlockReason, ExtractionGateDecision, GateInput};
use super::ExtractionGate;
use crate::model::{Grade, VerificationMethod};

/// Grade and gate information the calc engine supplies per input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputGradeInfo {
    /// Name of the calculation input (e.g. `arr_q4`).
    pub input_name: String,
    pub claim_id: String,
    #[serde(default)]
    pub extraction_confidence: Option<Decimal>,
    #[serde(default)]
    pub dhabt_score: Option<Decimal>,
    #[serde(default)]
    pub is_human_verified: bool,
    #[serde(default)]
    pub verification_method: Option<VerificationMethod>,
    /// Grade of the sanad backing the input, if graded.
    #[serde(default)]
    pub sanad_grade: Option<Grade>,
}

impl InputGradeInfo {
    fn gate_input(&self) -> GateInput {
        GateInput {
            claim_id: self.claim_id.clone(),
            extraction_confidence: self.extraction_confidence,
            dhabt_score: self.dhabt_score,
            is_human_verified: self.is_human_verified,
            verification_method: self.verification_method,
        }
    }
}

/// One input the gate refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockedInput {
    pub input_name: String,
    pub claim_id: String,
    pub reason: BlockReason,
}

impl std::fmt::Display for BlockedInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (claim {}): {}", self.input_name, self.claim_id, self.reason)
    }
}

/// Calculation rejected: at least one input failed the extraction gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("extraction gate blocked {} of {total_inputs} calculation inputs: {}", .blocked.len(), format_blocked(.blocked))]
pub struct ExtractionGateBlocked {
    pub total_inputs: usize,
    pub blocked: Vec<BlockedInput>,
}

fn format_blocked(blocked: &[BlockedInput]) -> String {
    blocked
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Every input cleared the gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateClearance {
    pub decisions: Vec<ExtractionGateDecision>,
    /// Weakest sanad grade among graded inputs; the calc output inherits it.
    pub weakest_grade: Option<Grade>,
}

/// Enforce the gate over a calculation's full input set.
pub fn enforce_extraction_gate(
    gate: &ExtractionGate,
    inputs: &[InputGradeInfo],
) -> Result<GateClearance, ExtractionGateBlocked> {
    let mut decisions = Vec::with_capacity(inputs.len());
    let mut blocked = Vec::new();

    for info in inputs {
        let decision = gate.evaluate(&info.gate_input());
        if let Some(reason) = decision.reason() {
            blocked.push(BlockedInput {
                input_name: info.input_name.clone(),
                claim_id: info.claim_id.clone(),
                reason,
            });
        }
        decisions.push(decision);
    }

    if !blocked.is_empty() {
        warn!(
            total = inputs.len(),
            blocked = blocked.len(),
            "calculation rejected by extraction gate"
        );
        return Err(ExtractionGateBlocked {
            total_inputs: inputs.len(),
            blocked,
        });
    }

    let weakest_grade = inputs.iter().filter_map(|i| i.sanad_grade).max();
    Ok(GateClearance {
        decisions,
        weakest_grade,
    })
}
