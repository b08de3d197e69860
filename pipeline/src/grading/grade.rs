//! Sanad grade computation.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::coi::{evaluate_coi, CoiContext, CoiEvaluationResult};
use super::corroboration::assess_corroboration;
use crate::model::{strictest_cap, CorroborationStatus, Defect, Evidence, Grade, Sanad};

/// Result of grading one sanad.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeResult {
    pub grade: Grade,
    /// Primary evidence grade before any adjustment.
    pub base_grade: Grade,
    pub corroboration_status: CorroborationStatus,
    pub coi_results: Vec<CoiEvaluationResult>,
    /// Strictest COI cap across all sources.
    pub cap: Option<Grade>,
    /// New OPEN defects raised by COI evaluation.
    pub added_defects: Vec<Defect>,
    pub warnings: Vec<String>,
    /// Human-readable trace of each adjustment, in order.
    pub explanation: Vec<String>,
}

impl GradeResult {
    /// Write the grade, status, and generated defects back onto the sanad.
    ///
    /// Open COI defects from an earlier run are replaced, not duplicated.
    pub fn apply_to(&self, sanad: &mut Sanad) {
        sanad.sanad_grade = self.grade;
        sanad.corroboration_status = self.corroboration_status;
        sanad
            .defects
            .retain(|d| !(d.defect_type.is_coi_derived() && d.is_open()));
        sanad.defects.extend(self.added_defects.iter().cloned());
    }
}

/// Grade a sanad from its resolved evidence.
///
/// Steps, in order:
/// 1. base grade is the primary's `source_grade`;
/// 2. MUTAWATIR upgrades one step;
/// 3. each OPEN MAJOR defect (existing or generated) downgrades one step;
///    existing COI defects are skipped since evaluation re-derives them;
/// 4. any OPEN FATAL defect forces D;
/// 5. the strictest COI cap applies, only ever tightening.
///
/// Without a primary the status is NONE and the grade is D.
pub fn compute_sanad_grade(
    sanad: &Sanad,
    primary: Option<&Evidence>,
    corroborators: &[Evidence],
) -> GradeResult {
    let check = sanad.independence_check.as_ref();
    let assessment = assess_corroboration(primary, corroborators, check);
    let status = assessment.status;
    let mut explanation = Vec::new();

    let Some(primary) = primary else {
        explanation.push("no primary evidence; grade D".to_string());
        return GradeResult {
            grade: Grade::D,
            base_grade: Grade::D,
            corroboration_status: status,
            coi_results: Vec::new(),
            cap: None,
            added_defects: Vec::new(),
            warnings: Vec::new(),
            explanation,
        };
    };

    let ctx = CoiContext {
        corroboration_status: status,
        independent_high_tier: assessment.independent_high_tier(),
        independence_check: check,
    };
    let coi_results: Vec<CoiEvaluationResult> = std::iter::once(primary)
        .chain(corroborators.iter())
        .map(|source| evaluate_coi(source, &ctx))
        .collect();
    let added_defects: Vec<Defect> = coi_results.iter().filter_map(|r| r.defect.clone()).collect();
    let warnings: Vec<String> = coi_results
        .iter()
        .flat_map(|r| r.warnings.iter().cloned())
        .collect();
    let cap = strictest_cap(coi_results.iter().map(|r| r.grade_cap));

    let base_grade = primary.source_grade;
    let mut grade = base_grade;
    explanation.push(format!("base grade {} from primary evidence", base_grade));

    if status == CorroborationStatus::Mutawatir {
        grade = grade.upgraded();
        explanation.push(format!("MUTAWATIR corroboration: upgraded to {}", grade));
    } else {
        explanation.push(format!("{} corroboration: no upgrade", status));
    }

    let existing = sanad
        .defects
        .iter()
        .filter(|d| !d.defect_type.is_coi_derived());
    for defect in existing.chain(added_defects.iter()) {
        if defect.is_open_major() {
            grade = grade.downgraded();
            explanation.push(format!(
                "open MAJOR {}: downgraded to {}",
                defect.defect_type, grade
            ));
        }
    }

    if let Some(fatal) = sanad.defects.iter().find(|d| d.is_open_fatal()) {
        grade = Grade::D;
        explanation.push(format!("open FATAL {}: forced to D", fatal.defect_type));
    }

    if let Some(cap) = cap {
        let capped = grade.capped_by(Some(cap));
        if capped != grade {
            explanation.push(format!("COI cap {}: {} -> {}", cap, grade, capped));
        }
        grade = capped;
    }

    debug!(
        sanad_id = %sanad.sanad_id,
        %base_grade,
        %grade,
        corroboration = %status,
        added_defects = added_defects.len(),
        "sanad graded"
    );

    GradeResult {
        grade,
        base_grade,
        corroboration_status: status,
        coi_results,
        cap,
        added_defects,
        warnings,
        explanation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        CoiMetadata, CoiSeverity, CureProtocol, DefectSeverity, DefectStatus, DefectType,
        IndependenceCheck, SourceTier,
    };
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn sanad(primary: &Evidence, corroborators: &[Evidence]) -> Sanad {
        Sanad {
            sanad_id: Uuid::new_v4(),
            claim_id: Uuid::new_v4(),
            primary_evidence_id: primary.evidence_id,
            corroborating_evidence_ids: corroborators.iter().map(|e| e.evidence_id).collect(),
            extraction_confidence: Decimal::ONE,
            transmission_chain: Vec::new(),
            defects: Vec::new(),
            sanad_grade: Grade::B,
            corroboration_status: CorroborationStatus::Ahad1,
            independence_check: None,
        }
    }

    fn ev(origin: &str, grade: Grade, tier: SourceTier) -> Evidence {
        Evidence::new(origin, grade, tier)
    }

    #[test]
    fn test_single_source_keeps_base_grade() {
        let p = ev("company", Grade::B, SourceTier::Thiqah);
        let r = compute_sanad_grade(&sanad(&p, &[]), Some(&p), &[]);
        assert_eq!(r.grade, Grade::B);
        assert_eq!(r.corroboration_status, CorroborationStatus::Ahad1);
        assert_eq!(r.coi_results.len(), 1);
    }

    #[test]
    fn test_mutawatir_upgrades_one_step() {
        let p = ev("company", Grade::C, SourceTier::Thiqah);
        let c = [
            ev("auditor", Grade::A, SourceTier::AthbatAlNas),
            ev("bank", Grade::A, SourceTier::ThiqahThabit),
        ];
        let r = compute_sanad_grade(&sanad(&p, &c), Some(&p), &c);
        assert_eq!(r.corroboration_status, CorroborationStatus::Mutawatir);
        assert_eq!(r.grade, Grade::B);
    }

    #[test]
    fn test_verified_independence_upgrade() {
        let p = ev("company", Grade::C, SourceTier::Saduq);
        let c = [ev("auditor", Grade::A, SourceTier::AthbatAlNas)];
        let mut s = sanad(&p, &c);
        s.independence_check = Some(IndependenceCheck {
            verified: true,
            independent: true,
        });
        let r = compute_sanad_grade(&s, Some(&p), &c);
        assert_eq!(r.corroboration_status, CorroborationStatus::Mutawatir);
        assert_eq!(r.grade, Grade::B);
    }

    #[test]
    fn test_open_major_downgrades_and_fatal_forces_d() {
        let p = ev("company", Grade::A, SourceTier::AthbatAlNas);
        let mut s = sanad(&p, &[]);
        s.defects.push(Defect::open(
            DefectType::Staleness,
            DefectSeverity::Major,
            CureProtocol::RequestSource,
            "figures are 14 months old",
        ));
        let mut cured = Defect::open(
            DefectType::UnitMismatch,
            DefectSeverity::Major,
            CureProtocol::RequireReaudit,
            "thousands vs units",
        );
        cured.status = DefectStatus::Cured;
        s.defects.push(cured);
        assert_eq!(compute_sanad_grade(&s, Some(&p), &[]).grade, Grade::B);

        s.defects.push(Defect::open(
            DefectType::BrokenChain,
            DefectSeverity::Fatal,
            CureProtocol::ReconstructChain,
            "missing extract step",
        ));
        assert_eq!(compute_sanad_grade(&s, Some(&p), &[]).grade, Grade::D);
    }

    #[test]
    fn test_high_undisclosed_coi_caps_and_adds_defect() {
        let p = ev("company", Grade::A, SourceTier::AthbatAlNas)
            .with_coi(CoiMetadata::conflict(CoiSeverity::High, false));
        let s = sanad(&p, &[]);
        let r = compute_sanad_grade(&s, Some(&p), &[]);
        // A, downgraded once by the generated MAJOR defect, then capped at C.
        assert_eq!(r.cap, Some(Grade::C));
        assert_eq!(r.grade, Grade::C);
        assert_eq!(r.added_defects.len(), 1);
        assert_eq!(r.added_defects[0].defect_type, DefectType::CoiHighUndisclosed);
    }

    #[test]
    fn test_cap_is_strictest_across_sources() {
        let p = ev("company", Grade::A, SourceTier::AthbatAlNas);
        let unassessed = CoiMetadata {
            present: true,
            ..Default::default()
        };
        let c = [ev("advisor", Grade::A, SourceTier::Thiqah).with_coi(unassessed)];
        let r = compute_sanad_grade(&sanad(&p, &c), Some(&p), &c);
        assert_eq!(r.cap, Some(Grade::C));
        assert_eq!(r.grade, Grade::C);
    }

    #[test]
    fn test_cap_never_loosens() {
        let p = ev("company", Grade::D, SourceTier::Maqbul).with_coi(CoiMetadata {
            present: true,
            ..Default::default()
        });
        let r = compute_sanad_grade(&sanad(&p, &[]), Some(&p), &[]);
        assert_eq!(r.grade, Grade::D);
    }

    #[test]
    fn test_no_primary() {
        let p = ev("company", Grade::A, SourceTier::AthbatAlNas);
        let r = compute_sanad_grade(&sanad(&p, &[]), None, &[]);
        assert_eq!(r.corroboration_status, CorroborationStatus::None);
        assert_eq!(r.grade, Grade::D);
    }

    #[test]
    fn test_apply_to_sanad() {
        let p = ev("company", Grade::A, SourceTier::AthbatAlNas)
            .with_coi(CoiMetadata::conflict(CoiSeverity::High, true));
        let mut s = sanad(&p, &[]);
        let r = compute_sanad_grade(&s, Some(&p), &[]);
        r.apply_to(&mut s);
        assert_eq!(s.sanad_grade, Grade::B);
        assert_eq!(s.defects.len(), 1);
        assert_eq!(s.defects[0].defect_type, DefectType::CoiHighUncured);
    }

    #[test]
    fn test_regrading_after_apply_is_stable() {
        let p = ev("company", Grade::A, SourceTier::AthbatAlNas)
            .with_coi(CoiMetadata::conflict(CoiSeverity::High, true));
        let mut s = sanad(&p, &[]);
        let first = compute_sanad_grade(&s, Some(&p), &[]);
        first.apply_to(&mut s);
        let second = compute_sanad_grade(&s, Some(&p), &[]);
        second.apply_to(&mut s);

        assert_eq!(first.grade, Grade::B);
        assert_eq!(second.grade, first.grade);
        assert_eq!(s.defects.len(), 1);
    }

    #[test]
    fn test_stale_coi_defect_cleared_once_cured() {
        let p = ev("company", Grade::A, SourceTier::AthbatAlNas)
            .with_coi(CoiMetadata::conflict(CoiSeverity::High, false));
        let mut s = sanad(&p, &[]);
        compute_sanad_grade(&s, Some(&p), &[]).apply_to(&mut s);
        assert_eq!(s.defects[0].defect_type, DefectType::CoiHighUndisclosed);

        let c = [ev("bank", Grade::A, SourceTier::AthbatAlNas)];
        s.corroborating_evidence_ids = vec![c[0].evidence_id];
        let r = compute_sanad_grade(&s, Some(&p), &c);
        assert_eq!(r.cap, None);
        assert_eq!(r.grade, Grade::A);
        r.apply_to(&mut s);
        assert!(s.defects.is_empty());
    }

    #[test]
    fn test_non_coi_defects_survive_apply() {
        let p = ev("company", Grade::A, SourceTier::AthbatAlNas);
        let mut s = sanad(&p, &[]);
        s.defects.push(Defect::open(
            DefectType::Staleness,
            DefectSeverity::Major,
            CureProtocol::RequestSource,
            "figures are 14 months old",
        ));
        compute_sanad_grade(&s, Some(&p), &[]).apply_to(&mut s);
        assert_eq!(s.defects.len(), 1);
        assert_eq!(compute_sanad_grade(&s, Some(&p), &[]).grade, Grade::B);
    }
}
