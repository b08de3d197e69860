//! Muhasabah self-accounting gate.
//!
//! Every agent output carries a [`MuhasabahRecord`]. The gate rejects
//! records that assert facts without support or claim high confidence
//! without naming any uncertainty.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::roles::DebateRole;

/// Default confidence above which uncertainties must be listed.
pub const DEFAULT_CONFIDENCE_CEILING: Decimal = Decimal::from_parts(80, 0, 0, false, 2);

/// An agent's self-assessment of one output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MuhasabahRecord {
    pub confidence: Decimal,
    #[serde(default)]
    pub supported_claim_ids: Vec<String>,
    #[serde(default)]
    pub supported_calc_ids: Vec<String>,
    #[serde(default)]
    pub uncertainties: Vec<String>,
    #[serde(default)]
    pub falsifiability_tests: Vec<String>,
    #[serde(default)]
    pub failure_modes: Vec<String>,
    /// Output is opinion rather than fact, so claim support is not required.
    #[serde(default)]
    pub is_subjective: bool,
}

impl MuhasabahRecord {
    /// A factual record with the given confidence and nothing else filled in.
    pub fn new(confidence: Decimal) -> Self {
        Self {
            confidence,
            supported_claim_ids: Vec::new(),
            supported_calc_ids: Vec::new(),
            uncertainties: Vec::new(),
            falsifiability_tests: Vec::new(),
            failure_modes: Vec::new(),
            is_subjective: false,
        }
    }

    pub fn supporting(mut self, claim_id: &str) -> Self {
        self.supported_claim_ids.push(claim_id.to_string());
        self
    }

    pub fn uncertain_about(mut self, uncertainty: &str) -> Self {
        self.uncertainties.push(uncertainty.to_string());
        self
    }

    pub fn subjective(mut self) -> Self {
        self.is_subjective = true;
        self
    }
}

/// A rule a Muhasabah record broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MuhasabahViolation {
    /// Confidence outside [0, 1].
    ConfidenceOutOfRange,
    /// Factual output citing no supported claim.
    NoSupportedClaims,
    /// Confidence above the ceiling with no uncertainty listed.
    OverconfidentWithoutUncertainty,
}

impl std::fmt::Display for MuhasabahViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConfidenceOutOfRange => write!(f, "CONFIDENCE_OUT_OF_RANGE"),
            Self::NoSupportedClaims => write!(f, "NO_SUPPORTED_CLAIMS"),
            Self::OverconfidentWithoutUncertainty => {
                write!(f, "OVERCONFIDENT_WITHOUT_UNCERTAINTY")
            }
        }
    }
}

/// Gate thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MuhasabahPolicy {
    /// Confidence strictly above this requires at least one uncertainty.
    pub confidence_ceiling: Decimal,
}

impl Default for MuhasabahPolicy {
    fn default() -> Self {
        Self {
            confidence_ceiling: DEFAULT_CONFIDENCE_CEILING,
        }
    }
}

impl MuhasabahPolicy {
    /// Every rule the record breaks; empty means it passes.
    pub fn check(&self, record: &MuhasabahRecord) -> Vec<MuhasabahViolation> {
        let mut violations = Vec::new();
        if record.confidence < Decimal::ZERO || record.confidence > Decimal::ONE {
            violations.push(MuhasabahViolation::ConfidenceOutOfRange);
        }
        if !record.is_subjective && record.supported_claim_ids.is_empty() {
            violations.push(MuhasabahViolation::NoSupportedClaims);
        }
        if record.confidence > self.confidence_ceiling && record.uncertainties.is_empty() {
            violations.push(MuhasabahViolation::OverconfidentWithoutUncertainty);
        }
        violations
    }

    pub fn passes(&self, record: &MuhasabahRecord) -> bool {
        self.check(record).is_empty()
    }
}

/// A recorded gate failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateFailure {
    pub round: u32,
    pub role: DebateRole,
    pub confidence: Decimal,
    pub violations: Vec<MuhasabahViolation>,
}

impl std::fmt::Display for GateFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<String> = self.violations.iter().map(|v| v.to_string()).collect();
        write!(
            f,
            "round {} {} (confidence {}): {}",
            self.round,
            self.role,
            self.confidence,
            names.join(", ")
        )
    }
}
