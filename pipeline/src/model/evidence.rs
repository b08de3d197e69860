//! Evidence items, their source reliability tier, and conflict-of-interest metadata.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::grade::Grade;

/// Reliability tier of a source, strongest first.
///
/// Totally ordered: `Ord` ranks the strongest tier as the *least* value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceTier {
    /// Audited, regulator-filed or otherwise beyond reproach.
    AthbatAlNas,
    /// Independently verified and consistently precise.
    ThiqahThabit,
    /// Trustworthy.
    Thiqah,
    /// Truthful but with occasional imprecision.
    Saduq,
    /// Acceptable only with support.
    Shaykh,
    /// Weakest admissible source.
    Maqbul,
}

impl SourceTier {
    /// Number of tiers counted as high-tier.
    pub const HIGH_TIER_COUNT: usize = 2;

    /// Zero-based rank, 0 being strongest.
    pub fn rank(self) -> usize {
        match self {
            Self::AthbatAlNas => 0,
            Self::ThiqahThabit => 1,
            Self::Thiqah => 2,
            Self::Saduq => 3,
            Self::Shaykh => 4,
            Self::Maqbul => 5,
        }
    }

    /// Whether this tier is one of the top two.
    pub fn is_high_tier(self) -> bool {
        self.rank() < Self::HIGH_TIER_COUNT
    }
}

impl std::fmt::Display for SourceTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AthbatAlNas => write!(f, "ATHBAT_AL_NAS"),
            Self::ThiqahThabit => write!(f, "THIQAH_THABIT"),
            Self::Thiqah => write!(f, "THIQAH"),
            Self::Saduq => write!(f, "SADUQ"),
            Self::Shaykh => write!(f, "SHAYKH"),
            Self::Maqbul => write!(f, "MAQBUL"),
        }
    }
}

/// Severity of a conflict of interest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CoiSeverity {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for CoiSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::High => write!(f, "HIGH"),
        }
    }
}

/// Conflict-of-interest metadata attached to a source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoiMetadata {
    #[serde(default)]
    pub present: bool,
    /// `None` while present means the severity was never assessed.
    #[serde(default)]
    pub severity: Option<CoiSeverity>,
    #[serde(default)]
    pub disclosed: bool,
    #[serde(default, rename = "type")]
    pub coi_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl CoiMetadata {
    /// Metadata for a source with a conflict of the given severity.
    pub fn conflict(severity: CoiSeverity, disclosed: bool) -> Self {
        Self {
            present: true,
            severity: Some(severity),
            disclosed,
            coi_type: None,
            description: None,
        }
    }
}

/// A single piece of evidence backing (or corroborating) a claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
    pub evidence_id: Uuid,
    /// Identity of the upstream origin. Evidence sharing an origin is not independent.
    pub origin_id: String,
    pub source_grade: Grade,
    pub source_tier: SourceTier,
    #[serde(default)]
    pub coi_metadata: Option<CoiMetadata>,
}

impl Evidence {
    /// Create evidence with no conflict of interest.
    pub fn new(origin_id: &str, source_grade: Grade, source_tier: SourceTier) -> Self {
        Self {
            evidence_id: Uuid::new_v4(),
            origin_id: origin_id.to_string(),
            source_grade,
            source_tier,
            coi_metadata: None,
        }
    }

    /// Attach conflict-of-interest metadata.
    pub fn with_coi(mut self, coi: CoiMetadata) -> Self {
        self.coi_metadata = Some(coi);
        self
    }

    /// Whether a conflict of interest is declared on this source.
    pub fn has_coi(&self) -> bool {
        self.coi_metadata.as_ref().is_some_and(|c| c.present)
    }

    /// No conflict, or a LOW-severity one.
    pub fn is_coi_clean(&self) -> bool {
        match &self.coi_metadata {
            Some(coi) if coi.present => coi.severity == Some(CoiSeverity::Low),
            _ => true,
        }
    }
}
