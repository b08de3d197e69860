//! Extraction Confidence Gate: fail-closed admission of extracted values.
//!
//! No extracted value may feed a calculation unless it clears this gate.
//! Evaluation short-circuits in a fixed order:
//!
//! ```text
//! human verified? ──yes──► ALLOW (bypass)
//!      │ no
//!      ▼
//! confidence missing → dhabt missing → confidence ∉ [0,1] → dhabt ∉ [0,1]
//!      → confidence < min → dhabt < min → ALLOW
//! ```
//!
//! Thresholds are inclusive and compared as exact decimals.

pub mod decision;
pub mod enforcement;

pub use decision::{
    BlockReason, DecisionRecord, ExtractionGateDecision, GateInput, GateVerdict,
    MIN_DHABT_SCORE, MIN_EXTRACTION_CONFIDENCE,
};
pub use enforcement::{
    enforce_extraction_gate, BlockedInput, ExtractionGateBlocked, GateClearance, InputGradeInfo,
};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::GateConfig;

/// Stateless gate over configured thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionGate {
    min_confidence: Decimal,
    min_dhabt: Decimal,
}

impl Default for ExtractionGate {
    fn default() -> Self {
        Self {
            min_confidence: MIN_EXTRACTION_CONFIDENCE,
            min_dhabt: MIN_DHABT_SCORE,
        }
    }
}

/// Decisions from a batch, split by outcome. Order within each side is preserved.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchDecision {
    pub allowed: Vec<ExtractionGateDecision>,
    pub blocked: Vec<ExtractionGateDecision>,
}

impl BatchDecision {
    pub fn all_allowed(&self) -> bool {
        self.blocked.is_empty()
    }

    pub fn total(&self) -> usize {
        self.allowed.len() + self.blocked.len()
    }
}

fn in_unit_interval(value: Decimal) -> bool {
    value >= Decimal::ZERO && value <= Decimal::ONE
}

impl ExtractionGate {
    /// Gate with thresholds from configuration.
    pub fn new(config: &GateConfig) -> Self {
        Self {
            min_confidence: config.min_confidence,
            min_dhabt: config.min_dhabt,
        }
    }

    pub fn min_confidence(&self) -> Decimal {
        self.min_confidence
    }

    pub fn min_dhabt(&self) -> Decimal {
        self.min_dhabt
    }

    /// Judge one input.
    pub fn evaluate(&self, input: &GateInput) -> ExtractionGateDecision {
        let verdict = self.verdict_for(input);
        if let GateVerdict::Blocked(reason) = verdict {
            debug!(
                claim_id = %input.claim_id,
                reason = %reason,
                confidence = ?input.extraction_confidence,
                dhabt = ?input.dhabt_score,
                "extraction gate blocked claim"
            );
        }
        ExtractionGateDecision::new(input, verdict)
    }

    fn verdict_for(&self, input: &GateInput) -> GateVerdict {
        if input.has_human_verification() {
            return GateVerdict::Allowed {
                bypassed_by_human_verification: true,
            };
        }

        let Some(confidence) = input.extraction_confidence else {
            return GateVerdict::Blocked(BlockReason::MissingConfidence);
        };
        let Some(dhabt) = input.dhabt_score else {
            return GateVerdict::Blocked(BlockReason::MissingDhabt);
        };

        if !in_unit_interval(confidence) {
            return GateVerdict::Blocked(BlockReason::InvalidConfidence);
        }
        if !in_unit_interval(dhabt) {
            return GateVerdict::Blocked(BlockReason::InvalidDhabt);
        }
        if confidence < self.min_confidence {
            return GateVerdict::Blocked(BlockReason::LowConfidence);
        }
        if dhabt < self.min_dhabt {
            return GateVerdict::Blocked(BlockReason::LowDhabt);
        }

        GateVerdict::Allowed {
            bypassed_by_human_verification: false,
        }
    }

    /// Judge every input independently and partition the results.
    pub fn evaluate_batch(&self, inputs: &[GateInput]) -> BatchDecision {
        let mut batch = BatchDecision::default();
        for input in inputs {
            let decision = self.evaluate(input);
            if decision.allowed() {
                batch.allowed.push(decision);
            } else {
                batch.blocked.push(decision);
            }
        }
        batch
    }
}

/// Judge one input with the default thresholds.
pub fn evaluate(input: &GateInput) -> ExtractionGateDecision {
    ExtractionGate::default().evaluate(input)
}

/// Judge a batch with the default thresholds.
pub fn evaluate_batch(inputs: &[GateInput]) -> BatchDecision {
    ExtractionGate::default().evaluate_batch(inputs)
}
