//! Corroboration counting.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{CorroborationStatus, Evidence, IndependenceCheck};

/// Why a corroborator did not count toward corroboration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Shares an origin with the primary or an already-counted corroborator.
    SharedOrigin,
    /// Below the high-tier cut.
    LowTier,
    /// Carries a conflict of interest above LOW (or of unknown severity).
    Conflicted,
}

/// Result of counting corroborators for one sanad.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorroborationAssessment {
    pub status: CorroborationStatus,
    /// Evidence ids counted as independent, high-tier, COI-clean.
    pub counted: Vec<Uuid>,
    pub skipped: Vec<(Uuid, SkipReason)>,
    /// Whether a verified independence check promoted AHAD_2 to MUTAWATIR.
    pub promoted_by_independence_check: bool,
}

impl CorroborationAssessment {
    /// Number of independent high-tier COI-clean corroborators.
    pub fn independent_high_tier(&self) -> usize {
        self.counted.len()
    }
}

/// Count corroborators beyond the primary and derive the status.
///
/// Corroborators are considered in order; each counted one claims its
/// origin, so a later corroborator from the same origin is skipped.
pub fn assess_corroboration(
    primary: Option<&Evidence>,
    corroborators: &[Evidence],
    independence_check: Option<&IndependenceCheck>,
) -> CorroborationAssessment {
    let Some(primary) = primary else {
        return CorroborationAssessment {
            status: CorroborationStatus::None,
            counted: Vec::new(),
            skipped: Vec::new(),
            promoted_by_independence_check: false,
        };
    };

    let mut origins: HashSet<&str> = HashSet::new();
    origins.insert(primary.origin_id.as_str());

    let mut counted = Vec::new();
    let mut skipped = Vec::new();
    for evidence in corroborators {
        let reason = if !evidence.source_tier.is_high_tier() {
            Some(SkipReason::LowTier)
        } else if !evidence.is_coi_clean() {
            Some(SkipReason::Conflicted)
        } else if origins.contains(evidence.origin_id.as_str()) {
            Some(SkipReason::SharedOrigin)
        } else {
            None
        };
        match reason {
            Some(reason) => skipped.push((evidence.evidence_id, reason)),
            None => {
                origins.insert(evidence.origin_id.as_str());
                counted.push(evidence.evidence_id);
            }
        }
    }

    let confirmed = independence_check.is_some_and(IndependenceCheck::confirms);
    let (status, promoted) = match counted.len() {
        0 => (CorroborationStatus::Ahad1, false),
        1 if confirmed => (CorroborationStatus::Mutawatir, true),
        1 => (CorroborationStatus::Ahad2, false),
        _ => (CorroborationStatus::Mutawatir, false),
    };

    CorroborationAssessment {
        status,
        counted,
        skipped,
        promoted_by_independence_check: promoted,
    }
}
