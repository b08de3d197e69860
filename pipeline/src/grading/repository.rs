//! Evidence lookup and the grading service built on it.

use std::collections::HashMap;

use uuid::Uuid;

use super::grade::{compute_sanad_grade, GradeResult};
use crate::model::{Evidence, Sanad};

/// Grading failed before any grade could be computed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GradingError {
    #[error("evidence {evidence_id} referenced by sanad {sanad_id} not found")]
    EvidenceNotFound { sanad_id: Uuid, evidence_id: Uuid },
}

/// Read access to evidence records.
pub trait EvidenceRepository {
    /// Look up a single evidence item.
    fn get(&self, evidence_id: &Uuid) -> Option<Evidence>;
}

/// In-memory implementation of EvidenceRepository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEvidenceStore {
    items: HashMap<Uuid, Evidence>,
}

impl InMemoryEvidenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an evidence item, returning its id.
    pub fn insert(&mut self, evidence: Evidence) -> Uuid {
        let id = evidence.evidence_id;
        self.items.insert(id, evidence);
        id
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FromIterator<Evidence> for InMemoryEvidenceStore {
    fn from_iter<I: IntoIterator<Item = Evidence>>(iter: I) -> Self {
        let mut store = Self::new();
        for evidence in iter {
            store.insert(evidence);
        }
        store
    }
}

impl EvidenceRepository for InMemoryEvidenceStore {
    fn get(&self, evidence_id: &Uuid) -> Option<Evidence> {
        self.items.get(evidence_id).cloned()
    }
}

/// Resolves a sanad's evidence through a repository and grades it.
pub struct SanadGrader<R> {
    repository: R,
}

impl<R: EvidenceRepository> SanadGrader<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Grade a sanad. Every referenced evidence id must resolve.
    pub fn grade(&self, sanad: &Sanad) -> Result<GradeResult, GradingError> {
        let primary = self.resolve(sanad, &sanad.primary_evidence_id)?;
        let corroborators = sanad
            .corroborating_evidence_ids
            .iter()
            .map(|id| self.resolve(sanad, id))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(compute_sanad_grade(sanad, Some(&primary), &corroborators))
    }

    fn resolve(&self, sanad: &Sanad, evidence_id: &Uuid) -> Result<Evidence, GradingError> {
        self.repository
            .get(evidence_id)
            .ok_or(GradingError::EvidenceNotFound {
                sanad_id: sanad.sanad_id,
                evidence_id: *evidence_id,
            })
    }
}
