//! Sanad documents: the evidence chain backing a claim.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::grade::Grade;

/// Corroboration tier of a sanad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CorroborationStatus {
    /// No primary evidence could be resolved.
    None,
    /// Single source.
    #[serde(rename = "AHAD_1")]
    Ahad1,
    /// Primary plus one independent corroborator.
    #[serde(rename = "AHAD_2")]
    Ahad2,
    /// Multiple independent high-tier sources agree.
    Mutawatir,
}

impl std::fmt::Display for CorroborationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "NONE"),
            Self::Ahad1 => write!(f, "AHAD_1"),
            Self::Ahad2 => write!(f, "AHAD_2"),
            Self::Mutawatir => write!(f, "MUTAWATIR"),
        }
    }
}

/// Processing step a transmission-chain node records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeType {
    Ingest,
    Extract,
    Normalize,
    Reconcile,
    Calculate,
    Infer,
    HumanVerify,
    Export,
}

/// Who performed a transmission step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActorType {
    Agent,
    Human,
    System,
}

/// One element of a transmission chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransmissionNode {
    pub node_id: Uuid,
    pub node_type: NodeType,
    pub actor_type: ActorType,
    pub actor_id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub confidence: Option<Decimal>,
    #[serde(default)]
    pub prev_node_id: Option<Uuid>,
    #[serde(default)]
    pub parent_id: Option<Uuid>,
}

impl TransmissionNode {
    /// The node this one descends from. `prev_node_id` wins over `parent_id`.
    pub fn parent(&self) -> Option<Uuid> {
        self.prev_node_id.or(self.parent_id)
    }
}

/// Closed set of sanad defects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DefectType {
    BrokenChain,
    MissingLink,
    UnknownSource,
    Concealment,
    Inconsistency,
    AnomalyVsStrongerSources,
    ChronoImpossible,
    ChainGrafting,
    Circularity,
    Staleness,
    UnitMismatch,
    TimeWindowMismatch,
    ScopeDrift,
    Implausibility,
    CoiHighUndisclosed,
    CoiHighUncured,
}

impl DefectType {
    /// Wire name of the defect type.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BrokenChain => "BROKEN_CHAIN",
            Self::MissingLink => "MISSING_LINK",
            Self::UnknownSource => "UNKNOWN_SOURCE",
            Self::Concealment => "CONCEALMENT",
            Self::Inconsistency => "INCONSISTENCY",
            Self::AnomalyVsStrongerSources => "ANOMALY_VS_STRONGER_SOURCES",
            Self::ChronoImpossible => "CHRONO_IMPOSSIBLE",
            Self::ChainGrafting => "CHAIN_GRAFTING",
            Self::Circularity => "CIRCULARITY",
            Self::Staleness => "STALENESS",
            Self::UnitMismatch => "UNIT_MISMATCH",
            Self::TimeWindowMismatch => "TIME_WINDOW_MISMATCH",
            Self::ScopeDrift => "SCOPE_DRIFT",
            Self::Implausibility => "IMPLAUSIBILITY",
            Self::CoiHighUndisclosed => "COI_HIGH_UNDISCLOSED",
            Self::CoiHighUncured => "COI_HIGH_UNCURED",
        }
    }

    /// Raised by COI evaluation, which re-derives it on every grading run.
    pub fn is_coi_derived(self) -> bool {
        matches!(self, Self::CoiHighUndisclosed | Self::CoiHighUncured)
    }
}

impl std::fmt::Display for DefectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How serious a defect is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DefectSeverity {
    /// Forces the sanad to grade D while open.
    Fatal,
    /// Downgrades the sanad one step while open.
    Major,
    /// Recorded, no grade effect.
    Minor,
}

impl std::fmt::Display for DefectSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fatal => write!(f, "FATAL"),
            Self::Major => write!(f, "MAJOR"),
            Self::Minor => write!(f, "MINOR"),
        }
    }
}

/// Protocol that cures a defect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CureProtocol {
    RequestSource,
    RequireReaudit,
    HumanArbitration,
    ReconstructChain,
    DiscardClaim,
    RequireIndependentCorroboration,
    RequireMutawatirCorroboration,
}

/// Lifecycle of a defect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DefectStatus {
    #[default]
    Open,
    Cured,
    Waived,
}

/// A recorded weakness in a sanad.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Defect {
    pub defect_type: DefectType,
    pub severity: DefectSeverity,
    pub cure_protocol: CureProtocol,
    /// Absent on the wire means OPEN.
    #[serde(default)]
    pub status: DefectStatus,
    pub description: String,
}

impl Defect {
    /// Create an open defect.
    pub fn open(
        defect_type: DefectType,
        severity: DefectSeverity,
        cure_protocol: CureProtocol,
        description: &str,
    ) -> Self {
        Self {
            defect_type,
            severity,
            cure_protocol,
            status: DefectStatus::Open,
            description: description.to_string(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == DefectStatus::Open
    }

    /// Open and fatal.
    pub fn is_open_fatal(&self) -> bool {
        self.is_open() && self.severity == DefectSeverity::Fatal
    }

    /// Open and major.
    pub fn is_open_major(&self) -> bool {
        self.is_open() && self.severity == DefectSeverity::Major
    }
}

/// Formal assessment of whether a sanad's corroborators are independent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndependenceCheck {
    /// Whether the assessment was carried out (not merely asserted).
    pub verified: bool,
    /// Outcome: `false` contradicts any claimed independence.
    pub independent: bool,
}

impl IndependenceCheck {
    /// Verified and affirming independence.
    pub fn confirms(&self) -> bool {
        self.verified && self.independent
    }

    /// Verified and denying independence.
    pub fn contradicts(&self) -> bool {
        self.verified && !self.independent
    }
}

/// The evidentiary dossier backing a claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sanad {
    pub sanad_id: Uuid,
    pub claim_id: Uuid,
    pub primary_evidence_id: Uuid,
    #[serde(default)]
    pub corroborating_evidence_ids: Vec<Uuid>,
    pub extraction_confidence: Decimal,
    pub transmission_chain: Vec<TransmissionNode>,
    #[serde(default)]
    pub defects: Vec<Defect>,
    pub sanad_grade: Grade,
    pub corroboration_status: CorroborationStatus,
    #[serde(default)]
    pub independence_check: Option<IndependenceCheck>,
}

impl Sanad {
    /// Whether any open fatal defect is recorded.
    pub fn has_open_fatal(&self) -> bool {
        self.defects.iter().any(Defect::is_open_fatal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corroboration_wire_names() {
        assert_eq!(
            serde_json::to_string(&CorroborationStatus::Ahad1).unwrap(),
            "\"AHAD_1\""
        );
        let parsed: CorroborationStatus = serde_json::from_str("\"MUTAWATIR\"").unwrap();
        assert_eq!(parsed, CorroborationStatus::Mutawatir);
        assert!(serde_json::from_str::<CorroborationStatus>("\"AHAD_3\"").is_err());
    }

    #[test]
    fn test_defect_type_display_matches_wire() {
        assert_eq!(DefectType::CoiHighUndisclosed.to_string(), "COI_HIGH_UNDISCLOSED");
        assert_eq!(
            DefectType::AnomalyVsStrongerSources.to_string(),
            "ANOMALY_VS_STRONGER_SOURCES"
        );
    }

    #[test]
    fn test_node_parent_prefers_prev() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let node = TransmissionNode {
            node_id: Uuid::new_v4(),
            node_type: NodeType::Extract,
            actor_type: ActorType::Agent,
            actor_id: "extractor".to_string(),
            timestamp: Utc::now(),
            confidence: None,
            prev_node_id: Some(a),
            parent_id: Some(b),
        };
        assert_eq!(node.parent(), Some(a));
    }

    #[test]
    fn test_independence_check() {
        let unverified = IndependenceCheck {
            verified: false,
            independent: false,
        };
        assert!(!unverified.contradicts());
        assert!(!unverified.confirms());

        let veto = IndependenceCheck {
            verified: true,
            independent: false,
        };
        assert!(veto.contradicts());
    }

    #[test]
    fn test_open_fatal() {
        let mut d = Defect::open(
            DefectType::BrokenChain,
            DefectSeverity::Fatal,
            CureProtocol::ReconstructChain,
            "chain gap between ingest and extract",
        );
        assert!(d.is_open_fatal());
        d.status = DefectStatus::Cured;
        assert!(!d.is_open_fatal());
    }
}
