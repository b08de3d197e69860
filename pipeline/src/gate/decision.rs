//! Extraction gate decisions: the allow/block outcome for one claim draft.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::model::{ClaimDraft, VerificationMethod};

/// Minimum extraction confidence that passes the gate (inclusive).
pub const MIN_EXTRACTION_CONFIDENCE: Decimal = Decimal::from_parts(95, 0, 0, false, 2);

/// Minimum dhabt score that passes the gate (inclusive).
pub const MIN_DHABT_SCORE: Decimal = Decimal::from_parts(90, 0, 0, false, 2);

/// Why the gate refused a claim draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlockReason {
    MissingConfidence,
    MissingDhabt,
    InvalidConfidence,
    InvalidDhabt,
    LowConfidence,
    LowDhabt,
}

impl BlockReason {
    /// Suggested remediation for this block.
    pub fn suggested_action(self) -> &'static str {
        match self {
            Self::MissingConfidence | Self::MissingDhabt => {
                "re-run extraction with scoring enabled"
            }
            Self::InvalidConfidence | Self::InvalidDhabt => {
                "fix the extractor: scores must lie in [0, 1]"
            }
            Self::LowConfidence | Self::LowDhabt => "route to human verification",
        }
    }
}

impl std::fmt::Display for BlockReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingConfidence => write!(f, "MISSING_CONFIDENCE"),
            Self::MissingDhabt => write!(f, "MISSING_DHABT"),
            Self::InvalidConfidence => write!(f, "INVALID_CONFIDENCE"),
            Self::InvalidDhabt => write!(f, "INVALID_DHABT"),
            Self::LowConfidence => write!(f, "LOW_CONFIDENCE"),
            Self::LowDhabt => write!(f, "LOW_DHABT"),
        }
    }
}

/// What the gate is asked to judge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateInput {
    pub claim_id: String,
    #[serde(default)]
    pub extraction_confidence: Option<Decimal>,
    #[serde(default)]
    pub dhabt_score: Option<Decimal>,
    #[serde(default)]
    pub is_human_verified: bool,
    #[serde(default)]
    pub verification_method: Option<VerificationMethod>,
}

impl GateInput {
    /// Input with both scores set and no human verification.
    pub fn scored(claim_id: &str, confidence: Decimal, dhabt: Decimal) -> Self {
        Self {
            claim_id: claim_id.to_string(),
            extraction_confidence: Some(confidence),
            dhabt_score: Some(dhabt),
            is_human_verified: false,
            verification_method: None,
        }
    }

    /// Mark the input as human verified.
    pub fn human_verified(mut self) -> Self {
        self.is_human_verified = true;
        self
    }

    /// Whether either verification signal bypasses the thresholds.
    pub fn has_human_verification(&self) -> bool {
        self.is_human_verified || self.verification_method.is_some_and(|m| m.is_human())
    }
}

impl From<&ClaimDraft> for GateInput {
    fn from(draft: &ClaimDraft) -> Self {
        Self {
            claim_id: draft.claim_id.to_string(),
            extraction_confidence: draft.extraction_confidence,
            dhabt_score: draft.dhabt_score,
            is_human_verified: draft.is_human_verified,
            verification_method: draft.verification_method,
        }
    }
}

/// Gate verdict. A single enum, so allowed and blocked can never disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GateVerdict {
    Allowed { bypassed_by_human_verification: bool },
    Blocked(BlockReason),
}

/// Decision for one claim draft.
///
/// Serialized with explicit `allowed`/`blocked` flags; deserializing a
/// record whose flags agree is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "DecisionRecord", try_from = "DecisionRecord")]
pub struct ExtractionGateDecision {
    claim_id: String,
    verdict: GateVerdict,
    confidence: Option<Decimal>,
    dhabt_score: Option<Decimal>,
}

impl ExtractionGateDecision {
    pub(crate) fn new(input: &GateInput, verdict: GateVerdict) -> Self {
        Self {
            claim_id: input.claim_id.clone(),
            verdict,
            confidence: input.extraction_confidence,
            dhabt_score: input.dhabt_score,
        }
    }

    pub fn claim_id(&self) -> &str {
        &self.claim_id
    }

    pub fn verdict(&self) -> GateVerdict {
        self.verdict
    }

    pub fn allowed(&self) -> bool {
        matches!(self.verdict, GateVerdict::Allowed { .. })
    }

    pub fn blocked(&self) -> bool {
        !self.allowed()
    }

    /// Block reason, `None` when allowed.
    pub fn reason(&self) -> Option<BlockReason> {
        match self.verdict {
            GateVerdict::Blocked(reason) => Some(reason),
            GateVerdict::Allowed { .. } => None,
        }
    }

    pub fn bypassed_by_human_verification(&self) -> bool {
        matches!(
            self.verdict,
            GateVerdict::Allowed {
                bypassed_by_human_verification: true
            }
        )
    }

    pub fn confidence(&self) -> Option<Decimal> {
        self.confidence
    }

    pub fn dhabt_score(&self) -> Option<Decimal> {
        self.dhabt_score
    }
}

impl std::fmt::Display for ExtractionGateDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.verdict {
            GateVerdict::Allowed {
                bypassed_by_human_verification: true,
            } => write!(f, "[ALLOW] {} (human verified)", self.claim_id),
            GateVerdict::Allowed { .. } => write!(f, "[ALLOW] {}", self.claim_id),
            GateVerdict::Blocked(reason) => write!(f, "[BLOCK] {}: {}", self.claim_id, reason),
        }
    }
}

/// Wire form of [`ExtractionGateDecision`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub allowed: bool,
    pub blocked: bool,
    pub reason: Option<BlockReason>,
    pub claim_id: String,
    pub confidence: Option<Decimal>,
    pub dhabt_score: Option<Decimal>,
    pub bypassed_by_human_verification: bool,
}

impl From<ExtractionGateDecision> for DecisionRecord {
    fn from(d: ExtractionGateDecision) -> Self {
        Self {
            allowed: d.allowed(),
            blocked: d.blocked(),
            reason: d.reason(),
            bypassed_by_human_verification: d.bypassed_by_human_verification(),
            claim_id: d.claim_id,
            confidence: d.confidence,
            dhabt_score: d.dhabt_score,
        }
    }
}

impl TryFrom<DecisionRecord> for ExtractionGateDecision {
    type Error = String;

    fn try_from(r: DecisionRecord) -> Result<Self, Self::Error> {
        if r.allowed == r.blocked {
            return Err(format!(
                "decision for {} has allowed={} and blocked={}",
                r.claim_id, r.allowed, r.blocked
            ));
        }
        let verdict = match (r.allowed, r.reason) {
            (true, None) => GateVerdict::Allowed {
                bypassed_by_human_verification: r.bypassed_by_human_verification,
            },
            (false, Some(reason)) => GateVerdict::Blocked(reason),
            (true, Some(reason)) => {
                return Err(format!("allowed decision carries block reason {}", reason))
            }
            (false, None) => return Err("blocked decision has no reason".to_string()),
        };
        Ok(Self {
            claim_id: r.claim_id,
            verdict,
            confidence: r.confidence,
            dhabt_score: r.dhabt_score,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_threshold_constants() {
        assert_eq!(MIN_EXTRACTION_CONFIDENCE, Decimal::from_str("0.95").unwrap());
        assert_eq!(MIN_DHABT_SCORE, Decimal::from_str("0.90").unwrap());
    }

    #[test]
    fn test_decision_serializes_both_flags() {
        let input = GateInput::scored("c-1", Decimal::ONE, Decimal::ONE);
        let d = ExtractionGateDecision::new(&input, GateVerdict::Blocked(BlockReason::LowDhabt));
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["allowed"], false);
        assert_eq!(json["blocked"], true);
        assert_eq!(json["reason"], "LOW_DHABT");
        assert_eq!(json["bypassed_by_human_verification"], false);
    }

    #[test]
    fn test_decision_rejects_contradictory_flags() {
        let json = serde_json::json!({
            "allowed": true,
            "blocked": true,
            "reason": null,
            "claim_id": "c-1",
            "confidence": null,
            "dhabt_score": null,
            "bypassed_by_human_verification": false
        });
        assert!(serde_json::from_value::<ExtractionGateDecision>(json).is_err());
    }

    #[test]
    fn test_decision_roundtrip_keeps_verdict() {
        let input = GateInput::scored("c-2", Decimal::ONE, Decimal::ONE).human_verified();
        let d = ExtractionGateDecision::new(
            &input,
            GateVerdict::Allowed {
                bypassed_by_human_verification: true,
            },
        );
        let json = serde_json::to_string(&d).unwrap();
        let parsed: ExtractionGateDecision = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, d);
        assert!(parsed.bypassed_by_human_verification());
    }

    #[test]
    fn test_verification_method_counts_as_human() {
        let mut input = GateInput::scored("c-3", Decimal::ZERO, Decimal::ZERO);
        assert!(!input.has_human_verification());
        input.verification_method = Some(VerificationMethod::DualVerified);
        assert!(input.has_human_verification());
        input.verification_method = Some(VerificationMethod::SystemExtracted);
        assert!(!input.has_human_verification());
    }

    #[test]
    fn test_block_reason_display() {
        assert_eq!(BlockReason::MissingConfidence.to_string(), "MISSING_CONFIDENCE");
        assert_eq!(BlockReason::LowConfidence.to_string(), "LOW_CONFIDENCE");
    }
}
