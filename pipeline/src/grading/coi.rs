//! Conflict-of-interest cure evaluation.
//!
//! Each source is judged on its own against a fixed cure table. Evaluation
//! fails closed: anything not explicitly cured yields a cap or a defect.
//!
//! | COI state              | Outcome                                              |
//! |------------------------|------------------------------------------------------|
//! | absent                 | cured                                                |
//! | severity unspecified   | not cured, cap C                                     |
//! | LOW                    | cured                                                |
//! | MEDIUM                 | cured; undisclosed adds a warning                    |
//! | HIGH, undisclosed      | cured with 1+ independent corroborator and no veto   |
//! | HIGH, disclosed        | cured when MUTAWATIR or 2+ independent corroborators |

use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::model::{
    CoiSeverity, CorroborationStatus, CureProtocol, Defect, DefectSeverity, DefectType, Evidence,
    Grade, IndependenceCheck,
};

/// Corroboration facts the cure table needs.
#[derive(Debug, Clone, Copy)]
pub struct CoiContext<'a> {
    pub corroboration_status: CorroborationStatus,
    /// Independent, high-tier, COI-clean corroborators.
    pub independent_high_tier: usize,
    pub independence_check: Option<&'a IndependenceCheck>,
}

/// Outcome of evaluating one source's conflict of interest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoiEvaluationResult {
    pub evidence_id: Uuid,
    pub cured: bool,
    /// Ceiling this source imposes on the sanad grade.
    pub grade_cap: Option<Grade>,
    /// Defect to record when the conflict stays uncured.
    pub defect: Option<Defect>,
    pub requires_additional_corroboration: bool,
    pub warnings: Vec<String>,
    pub explanation: String,
}

impl CoiEvaluationResult {
    fn cured(evidence_id: Uuid, explanation: String) -> Self {
        Self {
            evidence_id,
            cured: true,
            grade_cap: None,
            defect: None,
            requires_additional_corroboration: false,
            warnings: Vec::new(),
            explanation,
        }
    }

    fn uncured(evidence_id: Uuid, explanation: String) -> Self {
        Self {
            cured: false,
            ..Self::cured(evidence_id, explanation)
        }
    }
}

/// Evaluate a single source against the cure table.
pub fn evaluate_coi(source: &Evidence, ctx: &CoiContext<'_>) -> CoiEvaluationResult {
    let id = source.evidence_id;
    let coi = match &source.coi_metadata {
        Some(coi) if coi.present => coi,
        _ => return CoiEvaluationResult::cured(id, "no conflict of interest".to_string()),
    };

    let result = match coi.severity {
        None => CoiEvaluationResult {
            grade_cap: Some(Grade::C),
            ..CoiEvaluationResult::uncured(
                id,
                "conflict present with unspecified severity; capped at C".to_string(),
            )
        },
        Some(CoiSeverity::Low) => {
            CoiEvaluationResult::cured(id, "LOW conflict carries no penalty".to_string())
        }
        Some(CoiSeverity::Medium) => {
            let mut result =
                CoiEvaluationResult::cured(id, "MEDIUM conflict accepted".to_string());
            if !coi.disclosed {
                result
                    .warnings
                    .push(format!("source {} has an undisclosed MEDIUM conflict", id));
            }
            result
        }
        Some(CoiSeverity::High) if !coi.disclosed => high_undisclosed(id, ctx),
        Some(CoiSeverity::High) => high_disclosed(id, ctx),
    };

    if !result.cured {
        warn!(
            evidence_id = %id,
            severity = ?coi.severity,
            disclosed = coi.disclosed,
            cap = ?result.grade_cap,
            "conflict of interest not cured"
        );
    }
    result
}

fn high_undisclosed(id: Uuid, ctx: &CoiContext<'_>) -> CoiEvaluationResult {
    let vetoed = ctx
        .independence_check
        .is_some_and(IndependenceCheck::contradicts);
    if ctx.independent_high_tier >= 1 && !vetoed {
        return CoiEvaluationResult::cured(
            id,
            format!(
                "undisclosed HIGH conflict cured by {} independent high-tier corroborator(s)",
                ctx.independent_high_tier
            ),
        );
    }

    let why = if vetoed {
        "independence check contradicts the corroboration"
    } else {
        "no independent high-tier corroborator"
    };
    CoiEvaluationResult {
        grade_cap: Some(Grade::C),
        defect: Some(Defect::open(
            DefectType::CoiHighUndisclosed,
            DefectSeverity::Major,
            CureProtocol::RequireIndependentCorroboration,
            &format!("source {} has an undisclosed HIGH conflict; {}", id, why),
        )),
        requires_additional_corroboration: true,
        ..CoiEvaluationResult::uncured(
            id,
            format!("undisclosed HIGH conflict not cured ({}); capped at C", why),
        )
    }
}

fn high_disclosed(id: Uuid, ctx: &CoiContext<'_>) -> CoiEvaluationResult {
    if ctx.corroboration_status == CorroborationStatus::Mutawatir || ctx.independent_high_tier >= 2
    {
        return CoiEvaluationResult::cured(
            id,
            format!(
                "disclosed HIGH conflict cured by {} corroboration",
                ctx.corroboration_status
            ),
        );
    }

    CoiEvaluationResult {
        defect: Some(Defect::open(
            DefectType::CoiHighUncured,
            DefectSeverity::Major,
            CureProtocol::RequireMutawatirCorroboration,
            &format!(
                "source {} has a disclosed HIGH conflict without MUTAWATIR corroboration",
                id
            ),
        )),
        requires_additional_corroboration: true,
        ..CoiEvaluationResult::uncured(
            id,
            format!(
                "disclosed HIGH conflict needs MUTAWATIR corroboration, have {}",
                ctx.corroboration_status
            ),
        )
    }
}
