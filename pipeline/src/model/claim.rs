//! Claims and the raw drafts they are promoted from.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::grade::Grade;

/// How an extracted value was verified before reaching the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationMethod {
    /// Produced by the extraction pipeline with no human in the loop.
    SystemExtracted,
    /// A single reviewer confirmed the value.
    HumanVerified,
    /// Two independent reviewers confirmed the value.
    DualVerified,
}

impl VerificationMethod {
    /// Whether this method counts as human verification for the gate.
    pub fn is_human(self) -> bool {
        matches!(self, Self::HumanVerified | Self::DualVerified)
    }
}

impl std::fmt::Display for VerificationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SystemExtracted => write!(f, "SYSTEM_EXTRACTED"),
            Self::HumanVerified => write!(f, "HUMAN_VERIFIED"),
            Self::DualVerified => write!(f, "DUAL_VERIFIED"),
        }
    }
}

/// Verdict reached on a claim after grading and review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClaimVerdict {
    Verified,
    Inflated,
    Contradicted,
    Unverified,
    Subjective,
}

impl std::fmt::Display for ClaimVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Verified => write!(f, "VERIFIED"),
            Self::Inflated => write!(f, "INFLATED"),
            Self::Contradicted => write!(f, "CONTRADICTED"),
            Self::Unverified => write!(f, "UNVERIFIED"),
            Self::Subjective => write!(f, "SUBJECTIVE"),
        }
    }
}

/// Follow-up action required on a claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClaimAction {
    None,
    RequestData,
    Flag,
    RedFlag,
    HumanGate,
    PartnerOverrideRequired,
}

impl std::fmt::Display for ClaimAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "NONE"),
            Self::RequestData => write!(f, "REQUEST_DATA"),
            Self::Flag => write!(f, "FLAG"),
            Self::RedFlag => write!(f, "RED_FLAG"),
            Self::HumanGate => write!(f, "HUMAN_GATE"),
            Self::PartnerOverrideRequired => write!(f, "PARTNER_OVERRIDE_REQUIRED"),
        }
    }
}

/// A claim as produced by extraction, before it passes the gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimDraft {
    pub claim_id: Uuid,
    /// Raw extracted value (number, string, or structured figure).
    #[serde(default)]
    pub value: serde_json::Value,
    #[serde(default)]
    pub extraction_confidence: Option<Decimal>,
    #[serde(default)]
    pub dhabt_score: Option<Decimal>,
    #[serde(default)]
    pub is_human_verified: bool,
    #[serde(default)]
    pub verification_method: Option<VerificationMethod>,
}

/// A claim that passed the extraction gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    pub claim_id: Uuid,
    #[serde(default)]
    pub value: serde_json::Value,
    pub claim_grade: Grade,
    pub claim_verdict: ClaimVerdict,
    pub claim_action: ClaimAction,
    #[serde(default)]
    pub ic_bound: bool,
    /// Sanad backing this claim, once assembled.
    #[serde(default)]
    pub sanad_id: Option<Uuid>,
    /// Direct pointer into a source document span.
    #[serde(default)]
    pub primary_span_id: Option<String>,
}

/// Cross-field rule a claim may break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClaimRule {
    /// `ic_bound` with no sanad and no primary span.
    NoFreeFacts,
    /// Grade D with action NONE.
    GradeDRequiresAction,
    /// Verdict CONTRADICTED with action NONE.
    ContradictedRequiresAction,
}

impl ClaimRule {
    /// Check the cross-field rules against already-typed fields.
    pub fn check(
        grade: Grade,
        verdict: ClaimVerdict,
        action: ClaimAction,
        ic_bound: bool,
        has_evidence_ref: bool,
    ) -> Vec<ClaimRule> {
        let mut broken = Vec::new();
        if ic_bound && !has_evidence_ref {
            broken.push(Self::NoFreeFacts);
        }
        if grade == Grade::D && action == ClaimAction::None {
            broken.push(Self::GradeDRequiresAction);
        }
        if verdict == ClaimVerdict::Contradicted && action == ClaimAction::None {
            broken.push(Self::ContradictedRequiresAction);
        }
        broken
    }
}

impl Claim {
    /// Whether the claim carries a sanad or primary-span reference.
    pub fn has_evidence_ref(&self) -> bool {
        self.sanad_id.is_some()
            || self
                .primary_span_id
                .as_deref()
                .is_some_and(|s| !s.trim().is_empty())
    }

    /// Cross-field rules this claim currently breaks.
    pub fn rule_violations(&self) -> Vec<ClaimRule> {
        ClaimRule::check(
            self.claim_grade,
            self.claim_verdict,
            self.claim_action,
            self.ic_bound,
            self.has_evidence_ref(),
        )
    }

    /// Attach a graded sanad. Grade D escalates a NONE action to REQUEST_DATA.
    pub fn attach_sanad(&mut self, sanad_id: Uuid, grade: Grade) {
        self.sanad_id = Some(sanad_id);
        self.claim_grade = grade;
        if grade == Grade::D && self.claim_action == ClaimAction::None {
            self.claim_action = ClaimAction::RequestData;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claim(grade: Grade, verdict: ClaimVerdict, action: ClaimAction) -> Claim {
        Claim {
            claim_id: Uuid::new_v4(),
            value: serde_json::Value::Null,
            claim_grade: grade,
            claim_verdict: verdict,
            claim_action: action,
            ic_bound: false,
            sanad_id: None,
            primary_span_id: None,
        }
    }

    #[test]
    fn test_consistent_claim_has_no_violations() {
        let c = claim(Grade::B, ClaimVerdict::Verified, ClaimAction::None);
        assert!(c.rule_violations().is_empty());
    }

    #[test]
    fn test_grade_d_requires_action() {
        let c = claim(Grade::D, ClaimVerdict::Unverified, ClaimAction::None);
        assert_eq!(c.rule_violations(), vec![ClaimRule::GradeDRequiresAction]);
    }

    #[test]
    fn test_contradicted_requires_action() {
        let c = claim(Grade::A, ClaimVerdict::Contradicted, ClaimAction::None);
        assert_eq!(
            c.rule_violations(),
            vec![ClaimRule::ContradictedRequiresAction]
        );
    }

    #[test]
    fn test_ic_bound_needs_reference() {
        let mut c = claim(Grade::A, ClaimVerdict::Verified, ClaimAction::None);
        c.ic_bound = true;
        assert_eq!(c.rule_violations(), vec![ClaimRule::NoFreeFacts]);

        c.primary_span_id = Some("   ".to_string());
        assert_eq!(c.rule_violations(), vec![ClaimRule::NoFreeFacts]);

        c.primary_span_id = Some("doc-7#p3".to_string());
        assert!(c.rule_violations().is_empty());
    }

    #[test]
    fn test_attach_sanad_grade_d_escalates_action() {
        let mut c = claim(Grade::B, ClaimVerdict::Verified, ClaimAction::None);
        c.attach_sanad(Uuid::new_v4(), Grade::D);
        assert_eq!(c.claim_action, ClaimAction::RequestData);
        assert!(c.rule_violations().is_empty());
    }

    #[test]
    fn test_verification_method_is_human() {
        assert!(VerificationMethod::HumanVerified.is_human());
        assert!(VerificationMethod::DualVerified.is_human());
        assert!(!VerificationMethod::SystemExtracted.is_human());
    }

    #[test]
    fn test_action_wire_names() {
        let json = serde_json::to_string(&ClaimAction::PartnerOverrideRequired).unwrap();
        assert_eq!(json, "\"PARTNER_OVERRIDE_REQUIRED\"");
        assert_eq!(ClaimAction::RedFlag.to_string(), "RED_FLAG");
    }
}
