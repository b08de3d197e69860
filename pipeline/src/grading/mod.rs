//! Corroboration, conflict-of-interest cures, and sanad grading.
//!
//! All functions here are pure over their inputs. Evidence is resolved by
//! an injected [`EvidenceRepository`]; nothing is cached between calls.

pub mod coi;
pub mod corroboration;
pub mod grade;
pub mod repository;

pub use coi::{evaluate_coi, CoiContext, CoiEvaluationResult};
pub use corroboration::{assess_corroboration, CorroborationAssessment, SkipReason};
pub use grade::{compute_sanad_grade, GradeResult};
pub use repository::{EvidenceRepository, GradingError, InMemoryEvidenceStore, SanadGrader};
